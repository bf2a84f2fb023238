//! Estate record: the owning entity for a set of items.
//!
//! # Responsibility
//! - Define the estate shape the relationship index is derived from.
//! - Validate estate-local invariants before persistence.
//!
//! # Invariants
//! - `beneficiary_uuids` contains no duplicates.
//! - `executor_uuid`, when set, must refer to a user whose role is
//!   Executor. That cross-record rule is enforced at the estate service
//!   write path; the resolver never re-validates it.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for estates.
pub type EstateId = Uuid;

/// Persisted estate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estate {
    /// Stable global id referenced by every item of this estate.
    pub uuid: EstateId,
    /// Human-facing estate title, e.g. the client's full name.
    pub display_name: String,
    /// Managing executor. `None` while no executor has been assigned.
    pub executor_uuid: Option<UserId>,
    /// Beneficiaries of this estate. Order is irrelevant; duplicates are
    /// invalid.
    pub beneficiary_uuids: Vec<UserId>,
}

impl Estate {
    /// Creates a new estate with a generated stable id and no
    /// associations.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), display_name)
    }

    /// Creates an estate with a caller-provided stable id.
    pub fn with_id(uuid: EstateId, display_name: impl Into<String>) -> Self {
        Self {
            uuid,
            display_name: display_name.into(),
            executor_uuid: None,
            beneficiary_uuids: Vec::new(),
        }
    }

    /// Validates record-local invariants.
    pub fn validate(&self) -> Result<(), EstateValidationError> {
        if self.display_name.trim().is_empty() {
            return Err(EstateValidationError::BlankDisplayName);
        }

        let mut seen = HashSet::with_capacity(self.beneficiary_uuids.len());
        for beneficiary in &self.beneficiary_uuids {
            if !seen.insert(*beneficiary) {
                return Err(EstateValidationError::DuplicateBeneficiary(*beneficiary));
            }
        }

        Ok(())
    }

    /// Returns whether the given user is a beneficiary of this estate.
    pub fn has_beneficiary(&self, user: UserId) -> bool {
        self.beneficiary_uuids.contains(&user)
    }
}

/// Estate record validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstateValidationError {
    BlankDisplayName,
    DuplicateBeneficiary(UserId),
}

impl Display for EstateValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankDisplayName => write!(f, "estate display name must not be blank"),
            Self::DuplicateBeneficiary(id) => {
                write!(f, "estate lists beneficiary more than once: {id}")
            }
        }
    }
}

impl Error for EstateValidationError {}
