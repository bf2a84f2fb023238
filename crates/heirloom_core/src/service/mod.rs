//! Actor-aware use-case services.
//!
//! # Responsibility
//! - Orchestrate snapshot loading, access decisions, and repository
//!   writes into use-case level APIs.
//! - Keep callers decoupled from storage details and from the access
//!   layer's internals.
//!
//! # Invariants
//! - Every write consults the access layer before touching a
//!   repository.
//! - A denied action is a typed `AccessDenied` outcome, never a silent
//!   no-op.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod estate_service;
pub mod item_service;
pub mod message_service;

/// Current wall-clock time in epoch milliseconds.
///
/// Services stamp outgoing messages/notifications with this; the access
/// layer itself never reads a clock.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
