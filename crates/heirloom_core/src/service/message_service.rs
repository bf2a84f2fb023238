//! Messaging use-case service.
//!
//! # Responsibility
//! - Open threads only between eligibility-resolved role pairs.
//! - Deliver a notification to the receiver as a message side effect.
//! - Serve party-scoped inboxes and ownership-scoped notifications.
//!
//! # Invariants
//! - Eligibility is checked against a fresh relationship index on every
//!   send.
//! - An item-scoped message must reference an existing active item.
//! - Read flags are flipped only by the record's owner (message
//!   receiver, notification owner).

use crate::access::messaging::may_open_thread;
use crate::access::mutation::{authorize_message, DenyReason, MessageField, Operation};
use crate::access::relationship::{DataIntegrityError, RelationshipIndex};
use crate::access::visibility::{notification_visible, resolve_messages};
use crate::model::item::ItemId;
use crate::model::message::{Message, MessageId};
use crate::model::notification::{Notification, NotificationId};
use crate::model::user::{Actor, UserId};
use crate::repo::estate_repo::{EstateRepoError, EstateRepository};
use crate::repo::item_repo::{ItemRepoError, ItemRepository};
use crate::repo::message_repo::{
    MessageRepoError, MessageRepository, NotificationRepository,
};
use crate::repo::user_repo::{UserRepoError, UserRepository};
use crate::service::now_epoch_ms;
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const MESSAGE_NOTIFICATION_TITLE: &str = "New message";

/// Errors from messaging use-case operations.
#[derive(Debug)]
pub enum MessageServiceError {
    /// The role-pair matrix forbids this sender/receiver combination.
    MessagingNotAllowed { sender: UserId, receiver: UserId },
    /// The actor may not perform this operation on this record.
    AccessDenied(DenyReason),
    ReceiverNotFound(UserId),
    ItemNotFound(ItemId),
    MessageNotFound(MessageId),
    NotificationNotFound(NotificationId),
    /// The estate snapshot failed integrity checks.
    Integrity(DataIntegrityError),
    Repo(MessageRepoError),
    UserRepo(UserRepoError),
    ItemRepo(ItemRepoError),
    EstateRepo(EstateRepoError),
}

impl Display for MessageServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MessagingNotAllowed { sender, receiver } => {
                write!(f, "messaging not allowed from {sender} to {receiver}")
            }
            Self::AccessDenied(reason) => write!(f, "access denied: {reason}"),
            Self::ReceiverNotFound(id) => write!(f, "receiver not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::MessageNotFound(id) => write!(f, "message not found: {id}"),
            Self::NotificationNotFound(id) => write!(f, "notification not found: {id}"),
            Self::Integrity(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::UserRepo(err) => write!(f, "{err}"),
            Self::ItemRepo(err) => write!(f, "{err}"),
            Self::EstateRepo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MessageServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Integrity(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::UserRepo(err) => Some(err),
            Self::ItemRepo(err) => Some(err),
            Self::EstateRepo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MessageRepoError> for MessageServiceError {
    fn from(value: MessageRepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<UserRepoError> for MessageServiceError {
    fn from(value: UserRepoError) -> Self {
        Self::UserRepo(value)
    }
}

impl From<ItemRepoError> for MessageServiceError {
    fn from(value: ItemRepoError) -> Self {
        Self::ItemRepo(value)
    }
}

impl From<EstateRepoError> for MessageServiceError {
    fn from(value: EstateRepoError) -> Self {
        Self::EstateRepo(value)
    }
}

impl From<DataIntegrityError> for MessageServiceError {
    fn from(value: DataIntegrityError) -> Self {
        Self::Integrity(value)
    }
}

/// Use-case service for messaging and notifications.
pub struct MessageService<M, U, I, E>
where
    M: MessageRepository + NotificationRepository,
    U: UserRepository,
    I: ItemRepository,
    E: EstateRepository,
{
    messages: M,
    users: U,
    items: I,
    estates: E,
}

impl<M, U, I, E> MessageService<M, U, I, E>
where
    M: MessageRepository + NotificationRepository,
    U: UserRepository,
    I: ItemRepository,
    E: EstateRepository,
{
    pub fn new(messages: M, users: U, items: I, estates: E) -> Self {
        Self {
            messages,
            users,
            items,
            estates,
        }
    }

    /// Sends a message and delivers the receiver's notification.
    ///
    /// The role-pair matrix is consulted against a fresh relationship
    /// index; an item reference must point at an existing active item.
    pub fn send_message(
        &self,
        actor: &Actor,
        receiver: UserId,
        item: Option<ItemId>,
        content: impl Into<String>,
    ) -> Result<Message, MessageServiceError> {
        let receiver_user = self
            .users
            .get_user(receiver, false)?
            .ok_or(MessageServiceError::ReceiverNotFound(receiver))?;

        let snapshot = self.estates.load_snapshot()?;
        let index = RelationshipIndex::build(&snapshot)?;
        if !may_open_thread(actor, &receiver_user, &index) {
            warn!(
                "event=message_rejected module=service sender_role={} receiver_role={} reason=pair_not_eligible",
                actor.role, receiver_user.role
            );
            return Err(MessageServiceError::MessagingNotAllowed {
                sender: actor.id,
                receiver,
            });
        }

        if let Some(item_id) = item {
            if self.items.get_item(item_id, false)?.is_none() {
                return Err(MessageServiceError::ItemNotFound(item_id));
            }
        }

        let mut message = Message::new(actor.id, receiver, content, now_epoch_ms());
        message.item_uuid = item;
        self.messages.create_message(&message)?;

        let mut notification = Notification::new(
            receiver,
            MESSAGE_NOTIFICATION_TITLE,
            format!("{} sent you a message", actor.name),
            message.sent_at_epoch_ms,
        );
        notification.related_uuid = Some(message.uuid);
        self.messages.create_notification(&notification)?;

        info!(
            "event=message_sent module=service status=ok message={} sender_role={}",
            message.uuid, actor.role
        );
        Ok(message)
    }

    /// Lists every message the actor is a party to, newest first.
    pub fn inbox_for(&self, actor: &Actor) -> Result<Vec<Message>, MessageServiceError> {
        let messages = self.messages.list_messages_for(actor.id)?;
        // Party-scoped already by the query; re-resolving keeps the
        // visibility rule authoritative if the query widens later.
        Ok(resolve_messages(actor, &messages))
    }

    /// Marks one message read. Receiver-only via the mutation
    /// authorizer.
    pub fn mark_message_read(
        &self,
        actor: &Actor,
        id: MessageId,
    ) -> Result<(), MessageServiceError> {
        let message = self
            .messages
            .get_message(id)?
            .ok_or(MessageServiceError::MessageNotFound(id))?;

        let requested = BTreeSet::from([MessageField::IsRead]);
        let decision = authorize_message(actor, &message, Operation::Update, &requested);
        if !decision.allowed {
            return Err(deny(actor, "message_mark_read", decision.reason));
        }

        self.messages.mark_message_read(id)?;
        Ok(())
    }

    /// Deletes one message. Admin-only via the mutation authorizer.
    pub fn delete_message(&self, actor: &Actor, id: MessageId) -> Result<(), MessageServiceError> {
        let message = self
            .messages
            .get_message(id)?
            .ok_or(MessageServiceError::MessageNotFound(id))?;

        let decision = authorize_message(actor, &message, Operation::Delete, &BTreeSet::new());
        if !decision.allowed {
            return Err(deny(actor, "message_delete", decision.reason));
        }

        self.messages.delete_message(id)?;
        Ok(())
    }

    /// Lists the actor's own notifications, newest first.
    pub fn notifications_for(
        &self,
        actor: &Actor,
    ) -> Result<Vec<Notification>, MessageServiceError> {
        Ok(self.messages.list_notifications_for(actor.id)?)
    }

    /// Marks one notification read. Owner-only.
    pub fn mark_notification_read(
        &self,
        actor: &Actor,
        id: NotificationId,
    ) -> Result<(), MessageServiceError> {
        let notification = self
            .messages
            .get_notification(id)?
            .ok_or(MessageServiceError::NotificationNotFound(id))?;

        if !notification_visible(actor, &notification) {
            return Err(deny(actor, "notification_mark_read", Some(DenyReason::NotOwner)));
        }

        self.messages.mark_notification_read(id)?;
        Ok(())
    }
}

fn deny(actor: &Actor, operation: &str, reason: Option<DenyReason>) -> MessageServiceError {
    let reason = reason.unwrap_or(DenyReason::RoleForbidden);
    warn!(
        "event=access_denied module=service operation={operation} actor_role={} reason={reason}",
        actor.role
    );
    MessageServiceError::AccessDenied(reason)
}
