//! Core domain logic for Heirloom estate management.
//! This crate is the single source of truth for access-control
//! invariants.

pub mod access;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::messaging::{eligible_receivers, may_open_thread};
pub use access::mutation::{
    authorize_item, authorize_message, authorize_user, DenyReason, ItemField, MessageField,
    MutationDecision, Operation, UserField,
};
pub use access::relationship::{
    DataIntegrityError, IndexDiagnostic, RelationshipIndex,
};
pub use access::visibility::{
    item_access, message_visible, notification_visible, resolve_items, resolve_messages,
    ItemAccess, DISTRIBUTION_PLACEHOLDER,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::estate::{Estate, EstateId, EstateValidationError};
pub use model::item::{Item, ItemAction, ItemId, ItemValidationError};
pub use model::message::{Message, MessageId, MessageValidationError};
pub use model::notification::{Notification, NotificationId};
pub use model::role::{parse_role, supported_role_strings, Role, RoleCapabilities, UnknownRoleError};
pub use model::user::{Actor, User, UserId};
pub use repo::estate_repo::{EstateRepoError, EstateRepository, SqliteEstateRepository};
pub use repo::item_repo::{
    ItemListQuery, ItemRepoError, ItemRepository, SqliteItemRepository,
};
pub use repo::message_repo::{
    MessageRepoError, MessageRepository, NotificationRepository, SqliteMessageRepository,
};
pub use repo::user_repo::{
    SqliteUserRepository, UserListQuery, UserRepoError, UserRepository,
};
pub use service::estate_service::{EstateService, EstateServiceError};
pub use service::item_service::{ItemService, ItemServiceError};
pub use service::message_service::{MessageService, MessageServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
