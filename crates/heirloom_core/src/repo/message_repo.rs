//! Messaging repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for messages and their delivery
//!   notifications.
//!
//! # Invariants
//! - Messages are immutable after creation except for the read flag.
//! - Message deletion is a hard delete; the service layer gates it to
//!   admins.
//! - Notifications are scoped to one owning account.

use crate::db::DbError;
use crate::model::message::{Message, MessageId, MessageValidationError};
use crate::model::notification::{Notification, NotificationId, NotificationValidationError};
use crate::model::user::UserId;
use crate::repo::{bool_to_int, ensure_connection_ready, int_to_bool, SchemaGuard};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const MESSAGE_SELECT_SQL: &str = "SELECT
    uuid,
    sender_uuid,
    receiver_uuid,
    item_uuid,
    content,
    is_read,
    sent_at
FROM messages";

const NOTIFICATION_SELECT_SQL: &str = "SELECT
    uuid,
    user_uuid,
    title,
    body,
    is_read,
    related_uuid,
    created_at
FROM notifications";

pub type MessageRepoResult<T> = Result<T, MessageRepoError>;

/// Errors from messaging persistence operations.
#[derive(Debug)]
pub enum MessageRepoError {
    MessageValidation(MessageValidationError),
    NotificationValidation(NotificationValidationError),
    Db(DbError),
    MessageNotFound(MessageId),
    NotificationNotFound(NotificationId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for MessageRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MessageValidation(err) => write!(f, "{err}"),
            Self::NotificationValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MessageNotFound(id) => write!(f, "message not found: {id}"),
            Self::NotificationNotFound(id) => write!(f, "notification not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted messaging data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "messaging repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "messaging repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "messaging repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for MessageRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MessageValidation(err) => Some(err),
            Self::NotificationValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MessageValidationError> for MessageRepoError {
    fn from(value: MessageValidationError) -> Self {
        Self::MessageValidation(value)
    }
}

impl From<NotificationValidationError> for MessageRepoError {
    fn from(value: NotificationValidationError) -> Self {
        Self::NotificationValidation(value)
    }
}

impl From<DbError> for MessageRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for MessageRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SchemaGuard> for MessageRepoError {
    fn from(value: SchemaGuard) -> Self {
        match value {
            SchemaGuard::Uninitialized {
                expected_version,
                actual_version,
            } => Self::UninitializedConnection {
                expected_version,
                actual_version,
            },
            SchemaGuard::MissingTable(table) => Self::MissingRequiredTable(table),
            SchemaGuard::MissingColumn { table, column } => {
                Self::MissingRequiredColumn { table, column }
            }
        }
    }
}

/// Repository interface for message operations.
pub trait MessageRepository {
    fn create_message(&self, message: &Message) -> MessageRepoResult<MessageId>;
    fn get_message(&self, id: MessageId) -> MessageRepoResult<Option<Message>>;
    /// Lists every message the given account is a party to, newest
    /// first.
    fn list_messages_for(&self, user: UserId) -> MessageRepoResult<Vec<Message>>;
    fn mark_message_read(&self, id: MessageId) -> MessageRepoResult<()>;
    fn delete_message(&self, id: MessageId) -> MessageRepoResult<()>;
}

/// Repository interface for notification operations.
pub trait NotificationRepository {
    fn create_notification(&self, notification: &Notification) -> MessageRepoResult<NotificationId>;
    fn get_notification(&self, id: NotificationId) -> MessageRepoResult<Option<Notification>>;
    /// Lists notifications owned by the given account, newest first.
    fn list_notifications_for(&self, user: UserId) -> MessageRepoResult<Vec<Notification>>;
    fn mark_notification_read(&self, id: NotificationId) -> MessageRepoResult<()>;
}

/// SQLite-backed messaging repository.
pub struct SqliteMessageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMessageRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> MessageRepoResult<Self> {
        ensure_connection_ready(
            conn,
            "messages",
            &[
                "uuid",
                "sender_uuid",
                "receiver_uuid",
                "item_uuid",
                "content",
                "is_read",
                "sent_at",
            ],
        )?;
        ensure_connection_ready(
            conn,
            "notifications",
            &["uuid", "user_uuid", "title", "body", "is_read", "related_uuid"],
        )?;
        Ok(Self { conn })
    }
}

impl MessageRepository for SqliteMessageRepository<'_> {
    fn create_message(&self, message: &Message) -> MessageRepoResult<MessageId> {
        message.validate()?;

        self.conn.execute(
            "INSERT INTO messages (
                uuid,
                sender_uuid,
                receiver_uuid,
                item_uuid,
                content,
                is_read,
                sent_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                message.uuid.to_string(),
                message.sender_uuid.to_string(),
                message.receiver_uuid.to_string(),
                message.item_uuid.map(|id| id.to_string()),
                message.content.as_str(),
                bool_to_int(message.is_read),
                message.sent_at_epoch_ms,
            ],
        )?;

        Ok(message.uuid)
    }

    fn get_message(&self, id: MessageId) -> MessageRepoResult<Option<Message>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MESSAGE_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_message_row(row)?));
        }

        Ok(None)
    }

    fn list_messages_for(&self, user: UserId) -> MessageRepoResult<Vec<Message>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MESSAGE_SELECT_SQL}
             WHERE sender_uuid = ?1 OR receiver_uuid = ?1
             ORDER BY sent_at DESC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([user.to_string()])?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(parse_message_row(row)?);
        }

        Ok(messages)
    }

    fn mark_message_read(&self, id: MessageId) -> MessageRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE messages SET is_read = 1 WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(MessageRepoError::MessageNotFound(id));
        }

        Ok(())
    }

    fn delete_message(&self, id: MessageId) -> MessageRepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM messages WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(MessageRepoError::MessageNotFound(id));
        }

        Ok(())
    }
}

impl NotificationRepository for SqliteMessageRepository<'_> {
    fn create_notification(
        &self,
        notification: &Notification,
    ) -> MessageRepoResult<NotificationId> {
        notification.validate()?;

        self.conn.execute(
            "INSERT INTO notifications (
                uuid,
                user_uuid,
                title,
                body,
                is_read,
                related_uuid,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                notification.uuid.to_string(),
                notification.user_uuid.to_string(),
                notification.title.as_str(),
                notification.body.as_str(),
                bool_to_int(notification.is_read),
                notification.related_uuid.map(|id| id.to_string()),
                notification.created_at_epoch_ms,
            ],
        )?;

        Ok(notification.uuid)
    }

    fn get_notification(&self, id: NotificationId) -> MessageRepoResult<Option<Notification>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTIFICATION_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_notification_row(row)?));
        }

        Ok(None)
    }

    fn list_notifications_for(&self, user: UserId) -> MessageRepoResult<Vec<Notification>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTIFICATION_SELECT_SQL}
             WHERE user_uuid = ?1
             ORDER BY created_at DESC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([user.to_string()])?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next()? {
            notifications.push(parse_notification_row(row)?);
        }

        Ok(notifications)
    }

    fn mark_notification_read(&self, id: NotificationId) -> MessageRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(MessageRepoError::NotificationNotFound(id));
        }

        Ok(())
    }
}

fn parse_message_row(row: &Row<'_>) -> MessageRepoResult<Message> {
    let uuid = parse_uuid_column(row, "uuid", "messages.uuid")?;
    let sender_uuid = parse_uuid_column(row, "sender_uuid", "messages.sender_uuid")?;
    let receiver_uuid = parse_uuid_column(row, "receiver_uuid", "messages.receiver_uuid")?;

    let item_uuid = match row.get::<_, Option<String>>("item_uuid")? {
        Some(value) => Some(Uuid::parse_str(&value).map_err(|_| {
            MessageRepoError::InvalidData(format!(
                "invalid uuid value `{value}` in messages.item_uuid"
            ))
        })?),
        None => None,
    };

    let is_read = int_to_bool(row.get("is_read")?, "messages", "is_read")
        .map_err(MessageRepoError::InvalidData)?;

    let message = Message {
        uuid,
        sender_uuid,
        receiver_uuid,
        item_uuid,
        content: row.get("content")?,
        is_read,
        sent_at_epoch_ms: row.get("sent_at")?,
    };
    message.validate()?;
    Ok(message)
}

fn parse_notification_row(row: &Row<'_>) -> MessageRepoResult<Notification> {
    let uuid = parse_uuid_column(row, "uuid", "notifications.uuid")?;
    let user_uuid = parse_uuid_column(row, "user_uuid", "notifications.user_uuid")?;

    let related_uuid = match row.get::<_, Option<String>>("related_uuid")? {
        Some(value) => Some(Uuid::parse_str(&value).map_err(|_| {
            MessageRepoError::InvalidData(format!(
                "invalid uuid value `{value}` in notifications.related_uuid"
            ))
        })?),
        None => None,
    };

    let is_read = int_to_bool(row.get("is_read")?, "notifications", "is_read")
        .map_err(MessageRepoError::InvalidData)?;

    let notification = Notification {
        uuid,
        user_uuid,
        title: row.get("title")?,
        body: row.get("body")?,
        is_read,
        related_uuid,
        created_at_epoch_ms: row.get("created_at")?,
    };
    notification.validate()?;
    Ok(notification)
}

fn parse_uuid_column(row: &Row<'_>, column: &str, qualified: &str) -> MessageRepoResult<Uuid> {
    let value: String = row.get(column)?;
    Uuid::parse_str(&value).map_err(|_| {
        MessageRepoError::InvalidData(format!("invalid uuid value `{value}` in {qualified}"))
    })
}
