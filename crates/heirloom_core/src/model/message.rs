//! Item-scoped direct message between two accounts.
//!
//! # Responsibility
//! - Define the persisted message shape and its lifecycle invariants.
//!
//! # Invariants
//! - Sender and receiver are distinct accounts.
//! - A message is never reassigned to a different sender or receiver.
//! - After creation, the only legal mutation is flipping `is_read`.

use crate::model::item::ItemId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for messages.
pub type MessageId = Uuid;

/// Persisted message record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub uuid: MessageId,
    pub sender_uuid: UserId,
    pub receiver_uuid: UserId,
    /// Optional item this thread is about. Must reference an existing
    /// item; checked at the send path.
    pub item_uuid: Option<ItemId>,
    pub content: String,
    /// Read flag owned by the receiver.
    pub is_read: bool,
    /// Send timestamp in epoch milliseconds.
    pub sent_at_epoch_ms: i64,
}

impl Message {
    /// Creates a new unread message with a generated stable id.
    pub fn new(
        sender_uuid: UserId,
        receiver_uuid: UserId,
        content: impl Into<String>,
        sent_at_epoch_ms: i64,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            sender_uuid,
            receiver_uuid,
            item_uuid: None,
            content: content.into(),
            is_read: false,
            sent_at_epoch_ms,
        }
    }

    /// Validates record-local invariants.
    pub fn validate(&self) -> Result<(), MessageValidationError> {
        if self.sender_uuid == self.receiver_uuid {
            return Err(MessageValidationError::SelfAddressed(self.sender_uuid));
        }
        if self.content.trim().is_empty() {
            return Err(MessageValidationError::BlankContent);
        }
        Ok(())
    }

    /// Returns whether the given account is a party to this message.
    pub fn is_party(&self, user: UserId) -> bool {
        self.sender_uuid == user || self.receiver_uuid == user
    }
}

/// Message record validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageValidationError {
    SelfAddressed(UserId),
    BlankContent,
}

impl Display for MessageValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfAddressed(id) => {
                write!(f, "message sender and receiver must differ: {id}")
            }
            Self::BlankContent => write!(f, "message content must not be blank"),
        }
    }
}

impl Error for MessageValidationError {}
