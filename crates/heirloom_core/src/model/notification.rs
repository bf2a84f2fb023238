//! In-app notification record.
//!
//! # Responsibility
//! - Define the notification shape delivered as a message side effect.
//!
//! # Invariants
//! - A notification belongs to exactly one account; only the owner may
//!   read or mark it.
//! - After creation, the only legal mutation is flipping `is_read`.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for notifications.
pub type NotificationId = Uuid;

/// Persisted notification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub uuid: NotificationId,
    /// Owning account.
    pub user_uuid: UserId,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    /// Source record this notification points at, e.g. the delivered
    /// message.
    pub related_uuid: Option<Uuid>,
    /// Creation timestamp in epoch milliseconds.
    pub created_at_epoch_ms: i64,
}

impl Notification {
    /// Creates a new unread notification with a generated stable id.
    pub fn new(
        user_uuid: UserId,
        title: impl Into<String>,
        body: impl Into<String>,
        created_at_epoch_ms: i64,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            user_uuid,
            title: title.into(),
            body: body.into(),
            is_read: false,
            related_uuid: None,
            created_at_epoch_ms,
        }
    }

    /// Validates record-local invariants.
    pub fn validate(&self) -> Result<(), NotificationValidationError> {
        if self.title.trim().is_empty() {
            return Err(NotificationValidationError::BlankTitle);
        }
        Ok(())
    }
}

/// Notification record validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationValidationError {
    BlankTitle,
}

impl Display for NotificationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "notification title must not be blank"),
        }
    }
}

impl Error for NotificationValidationError {}
