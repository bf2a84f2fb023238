//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `items` table.
//! - Own barcode lookup and surface barcode uniqueness violations as a
//!   distinct error.
//!
//! # Invariants
//! - Write paths call `Item::validate()` before SQL mutations.
//! - Barcode uniqueness is enforced by the store, not the resolver; a
//!   collision is reported as `BarcodeInUse`, never masked.

use crate::db::DbError;
use crate::model::estate::EstateId;
use crate::model::item::{parse_item_action, Item, ItemId, ItemValidationError};
use crate::repo::{bool_to_int, ensure_connection_ready, int_to_bool, SchemaGuard};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    estate_uuid,
    name,
    description,
    barcode,
    is_locked,
    action,
    action_note,
    is_deleted
FROM items";

pub type ItemRepoResult<T> = Result<T, ItemRepoError>;

/// Errors from item persistence and query operations.
#[derive(Debug)]
pub enum ItemRepoError {
    Validation(ItemValidationError),
    Db(DbError),
    NotFound(ItemId),
    /// Another item already carries this barcode.
    BarcodeInUse(String),
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

impl Display for ItemRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::BarcodeInUse(barcode) => {
                write!(f, "item barcode is already in use: {barcode}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "item repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "item repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "item repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for ItemRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ItemValidationError> for ItemRepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for ItemRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ItemRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SchemaGuard> for ItemRepoError {
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

/// Query options for listing items.
#[derive(Debug, Clone, Default)]
pub struct ItemListQuery {
    pub estate: Option<EstateId>,
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for item CRUD and lookup operations.
pub trait ItemRepository {
    fn create_item(&self, item: &Item) -> ItemRepoResult<ItemId>;
    fn update_item(&self, item: &Item) -> ItemRepoResult<()>;
    fn get_item(&self, id: ItemId, include_deleted: bool) -> ItemRepoResult<Option<Item>>;
    fn list_items(&self, query: &ItemListQuery) -> ItemRepoResult<Vec<Item>>;
    /// Scan-based lookup by printed tag code. Active items only.
    fn find_by_barcode(&self, barcode: &str) -> ItemRepoResult<Option<Item>>;
    fn soft_delete_item(&self, id: ItemId) -> ItemRepoResult<()>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> ItemRepoResult<Self> {
        ensure_connection_ready(
            conn,
            "items",
            &[
                "uuid",
                "estate_uuid",
                "name",
                "barcode",
                "is_locked",
                "action",
                "action_note",
                "is_deleted",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, item: &Item) -> ItemRepoResult<ItemId> {
        item.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO items (
                uuid,
                estate_uuid,
                name,
                description,
                barcode,
                is_locked,
                action,
                action_note,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                item.uuid.to_string(),
                item.estate_uuid.to_string(),
                item.name.as_str(),
                item.description.as_deref(),
                item.barcode.as_deref(),
                bool_to_int(item.is_locked),
                item.action.map(|action| action.as_str()),
                item.action_note.as_deref(),
                bool_to_int(item.is_deleted),
            ],
        );

        match inserted {
            Ok(_) => Ok(item.uuid),
            Err(err) => Err(map_barcode_conflict(err, item.barcode.as_deref())),
        }
    }

    fn update_item(&self, item: &Item) -> ItemRepoResult<()> {
        item.validate()?;

        let changed = self.conn.execute(
            "UPDATE items
             SET
                name = ?1,
                description = ?2,
                barcode = ?3,
                is_locked = ?4,
                action = ?5,
                action_note = ?6,
                is_deleted = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?8;",
            params![
                item.name.as_str(),
                item.description.as_deref(),
                item.barcode.as_deref(),
                bool_to_int(item.is_locked),
                item.action.map(|action| action.as_str()),
                item.action_note.as_deref(),
                bool_to_int(item.is_deleted),
                item.uuid.to_string(),
            ],
        );

        match changed {
            Ok(0) => Err(ItemRepoError::NotFound(item.uuid)),
            Ok(_) => Ok(()),
            Err(err) => Err(map_barcode_conflict(err, item.barcode.as_deref())),
        }
    }

    fn get_item(&self, id: ItemId, include_deleted: bool) -> ItemRepoResult<Option<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }

        Ok(None)
    }

    fn list_items(&self, query: &ItemListQuery) -> ItemRepoResult<Vec<Item>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }

        if let Some(estate) = query.estate {
            sql.push_str(" AND estate_uuid = ?");
            bind_values.push(Value::Text(estate.to_string()));
        }

        sql.push_str(" ORDER BY updated_at DESC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }

    fn find_by_barcode(&self, barcode: &str) -> ItemRepoResult<Option<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE barcode = ?1
               AND is_deleted = 0;"
        ))?;

        let mut rows = stmt.query([barcode])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }

        Ok(None)
    }

    fn soft_delete_item(&self, id: ItemId) -> ItemRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE items
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(ItemRepoError::NotFound(id));
        }

        Ok(())
    }
}

/// Translates the unique-index violation on `items.barcode` into the
/// semantic error. Other SQLite errors pass through untouched.
fn map_barcode_conflict(err: rusqlite::Error, barcode: Option<&str>) -> ItemRepoError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation
            && message.contains("items.barcode")
        {
            return ItemRepoError::BarcodeInUse(barcode.unwrap_or_default().to_string());
        }
    }
    ItemRepoError::from(err)
}

fn parse_item_row(row: &Row<'_>) -> ItemRepoResult<Item> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        ItemRepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in items.uuid"))
    })?;

    let estate_text: String = row.get("estate_uuid")?;
    let estate_uuid = Uuid::parse_str(&estate_text).map_err(|_| {
        ItemRepoError::InvalidData(format!(
            "invalid uuid value `{estate_text}` in items.estate_uuid"
        ))
    })?;

    let action = match row.get::<_, Option<String>>("action")? {
        Some(value) => Some(parse_item_action(&value).ok_or_else(|| {
            ItemRepoError::InvalidData(format!("invalid item action `{value}` in items.action"))
        })?),
        None => None,
    };

    let is_locked = int_to_bool(row.get("is_locked")?, "items", "is_locked")
        .map_err(ItemRepoError::InvalidData)?;
    let is_deleted = int_to_bool(row.get("is_deleted")?, "items", "is_deleted")
        .map_err(ItemRepoError::InvalidData)?;

    let item = Item {
        uuid,
        estate_uuid,
        name: row.get("name")?,
        description: row.get("description")?,
        barcode: row.get("barcode")?,
        is_locked,
        action,
        action_note: row.get("action_note")?,
        is_deleted,
    };
    item.validate()?;
    Ok(item)
}
