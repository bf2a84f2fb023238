//! User directory record and request-scoped actor identity.
//!
//! # Responsibility
//! - Define the persisted user shape shared by all account roles.
//! - Define the actor value handed to the access layer for one request.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another user.
//! - An actor is created at authentication and discarded at session end;
//!   it is never mutated mid-request.

use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for user accounts.
pub type UserId = Uuid;

/// Persisted directory record for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable global id used for scoping, messaging, and auditing.
    pub uuid: UserId,
    /// Display name. Also the comparison key for distribution redaction.
    pub name: String,
    pub role: Role,
    /// Soft delete tombstone; deactivated accounts keep their history.
    pub is_deleted: bool,
}

impl User {
    /// Creates a new user with a generated stable id.
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self::with_id(Uuid::new_v4(), name, role)
    }

    /// Creates a user with a caller-provided stable id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(uuid: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            uuid,
            name: name.into(),
            role,
            is_deleted: false,
        }
    }

    /// Validates record-local invariants.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.name.trim().is_empty() {
            return Err(UserValidationError::BlankName);
        }
        Ok(())
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    pub fn restore(&mut self) {
        self.is_deleted = false;
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Authenticated identity making one request.
///
/// Immutable for the request duration. The `name` field participates in
/// distribution-note redaction, so it must match the persisted display
/// name of the same account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }

    /// Builds the actor for an authenticated active user.
    ///
    /// Returns `None` for soft-deleted accounts; a tombstoned user must
    /// not act.
    pub fn from_user(user: &User) -> Option<Self> {
        if user.is_deleted {
            return None;
        }
        Some(Self::new(user.uuid, user.name.clone(), user.role))
    }
}

/// User record validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    BlankName,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "user name must not be blank"),
        }
    }
}

impl Error for UserValidationError {}
