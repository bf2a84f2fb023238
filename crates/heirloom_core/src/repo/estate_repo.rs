//! Estate repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for estates and their beneficiary links.
//! - Load the estate snapshot the relationship index is built from.
//!
//! # Invariants
//! - `set_beneficiaries` replaces the whole link set in one transaction.
//! - Snapshot loads aggregate beneficiary links per estate; link order
//!   is deterministic (`user_uuid ASC`).

use crate::db::DbError;
use crate::model::estate::{Estate, EstateId, EstateValidationError};
use crate::model::user::UserId;
use crate::repo::{ensure_connection_ready, SchemaGuard};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ESTATE_SELECT_SQL: &str = "SELECT uuid, display_name, executor_uuid FROM estates";

pub type EstateRepoResult<T> = Result<T, EstateRepoError>;

/// Errors from estate persistence operations.
#[derive(Debug)]
pub enum EstateRepoError {
    Validation(EstateValidationError),
    Db(DbError),
    NotFound(EstateId),
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

impl Display for EstateRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "estate not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted estate data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "estate repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "estate repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "estate repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for EstateRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EstateValidationError> for EstateRepoError {
    fn from(value: EstateValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for EstateRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for EstateRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SchemaGuard> for EstateRepoError {
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

/// Repository interface for estate operations.
pub trait EstateRepository {
    fn create_estate(&self, estate: &Estate) -> EstateRepoResult<EstateId>;
    /// Updates display name and executor assignment.
    fn update_estate(&self, estate: &Estate) -> EstateRepoResult<()>;
    fn get_estate(&self, id: EstateId) -> EstateRepoResult<Option<Estate>>;
    /// Loads the full estate snapshot for relationship index builds.
    fn load_snapshot(&self) -> EstateRepoResult<Vec<Estate>>;
    /// Replaces all beneficiary links of one estate in one transaction.
    fn set_beneficiaries(&self, estate: EstateId, beneficiaries: &[UserId])
        -> EstateRepoResult<()>;
}

/// SQLite-backed estate repository.
pub struct SqliteEstateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEstateRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> EstateRepoResult<Self> {
        ensure_connection_ready(conn, "estates", &["uuid", "display_name", "executor_uuid"])?;
        ensure_connection_ready(conn, "estate_beneficiaries", &["estate_uuid", "user_uuid"])?;
        Ok(Self { conn })
    }
}

impl EstateRepository for SqliteEstateRepository<'_> {
    fn create_estate(&self, estate: &Estate) -> EstateRepoResult<EstateId> {
        estate.validate()?;

        self.conn.execute(
            "INSERT INTO estates (uuid, display_name, executor_uuid)
             VALUES (?1, ?2, ?3);",
            params![
                estate.uuid.to_string(),
                estate.display_name.as_str(),
                estate.executor_uuid.map(|id| id.to_string()),
            ],
        )?;

        for beneficiary in &estate.beneficiary_uuids {
            self.conn.execute(
                "INSERT INTO estate_beneficiaries (estate_uuid, user_uuid)
                 VALUES (?1, ?2);",
                params![estate.uuid.to_string(), beneficiary.to_string()],
            )?;
        }

        Ok(estate.uuid)
    }

    fn update_estate(&self, estate: &Estate) -> EstateRepoResult<()> {
        estate.validate()?;

        let changed = self.conn.execute(
            "UPDATE estates
             SET
                display_name = ?1,
                executor_uuid = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?3;",
            params![
                estate.display_name.as_str(),
                estate.executor_uuid.map(|id| id.to_string()),
                estate.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(EstateRepoError::NotFound(estate.uuid));
        }

        Ok(())
    }

    fn get_estate(&self, id: EstateId) -> EstateRepoResult<Option<Estate>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ESTATE_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut estate = parse_estate_row(row)?;
            estate.beneficiary_uuids = load_beneficiaries(self.conn, estate.uuid)?;
            return Ok(Some(estate));
        }

        Ok(None)
    }

    fn load_snapshot(&self) -> EstateRepoResult<Vec<Estate>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ESTATE_SELECT_SQL} ORDER BY uuid ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut estates = Vec::new();
        while let Some(row) = rows.next()? {
            estates.push(parse_estate_row(row)?);
        }

        for estate in &mut estates {
            estate.beneficiary_uuids = load_beneficiaries(self.conn, estate.uuid)?;
        }

        Ok(estates)
    }

    fn set_beneficiaries(
        &self,
        estate: EstateId,
        beneficiaries: &[UserId],
    ) -> EstateRepoResult<()> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM estates WHERE uuid = ?1);",
            [estate.to_string()],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(EstateRepoError::NotFound(estate));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM estate_beneficiaries WHERE estate_uuid = ?1;",
            [estate.to_string()],
        )?;
        for beneficiary in beneficiaries {
            tx.execute(
                "INSERT INTO estate_beneficiaries (estate_uuid, user_uuid)
                 VALUES (?1, ?2);",
                params![estate.to_string(), beneficiary.to_string()],
            )?;
        }
        tx.commit()?;

        Ok(())
    }
}

fn parse_estate_row(row: &Row<'_>) -> EstateRepoResult<Estate> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        EstateRepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in estates.uuid"
        ))
    })?;

    let executor_uuid = match row.get::<_, Option<String>>("executor_uuid")? {
        Some(value) => Some(Uuid::parse_str(&value).map_err(|_| {
            EstateRepoError::InvalidData(format!(
                "invalid uuid value `{value}` in estates.executor_uuid"
            ))
        })?),
        None => None,
    };

    Ok(Estate {
        uuid,
        display_name: row.get("display_name")?,
        executor_uuid,
        beneficiary_uuids: Vec::new(),
    })
}

fn load_beneficiaries(conn: &Connection, estate: EstateId) -> EstateRepoResult<Vec<UserId>> {
    let mut stmt = conn.prepare(
        "SELECT user_uuid
         FROM estate_beneficiaries
         WHERE estate_uuid = ?1
         ORDER BY user_uuid ASC;",
    )?;

    let mut rows = stmt.query([estate.to_string()])?;
    let mut beneficiaries = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get("user_uuid")?;
        let user = Uuid::parse_str(&value).map_err(|_| {
            EstateRepoError::InvalidData(format!(
                "invalid uuid value `{value}` in estate_beneficiaries.user_uuid"
            ))
        })?;
        beneficiaries.push(user);
    }

    Ok(beneficiaries)
}
