//! User directory repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `users` account directory.
//! - Keep role strings stable between model and storage.
//!
//! # Invariants
//! - Write paths call `User::validate()` before SQL mutations.
//! - Persisted role strings must parse; unparseable rows are rejected as
//!   invalid data, never defaulted.

use crate::db::DbError;
use crate::model::role::{parse_role, Role, UnknownRoleError};
use crate::model::user::{User, UserId, UserValidationError};
use crate::repo::{bool_to_int, ensure_connection_ready, int_to_bool, SchemaGuard};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT uuid, name, role, is_deleted FROM users";

pub type UserRepoResult<T> = Result<T, UserRepoError>;

/// Errors from user directory operations.
#[derive(Debug)]
pub enum UserRepoError {
    Validation(UserValidationError),
    /// Persisted role string does not parse. Fatal: never default a
    /// role.
    UnknownRole(UnknownRoleError),
    Db(DbError),
    NotFound(UserId),
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

impl Display for UserRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UnknownRole(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "user repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "user repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "user repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for UserRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::UnknownRole(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserValidationError> for UserRepoError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for UserRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for UserRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SchemaGuard> for UserRepoError {
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

/// Query options for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub role: Option<Role>,
    pub include_deleted: bool,
}

/// Repository interface for user directory operations.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> UserRepoResult<UserId>;
    fn update_user(&self, user: &User) -> UserRepoResult<()>;
    fn get_user(&self, id: UserId, include_deleted: bool) -> UserRepoResult<Option<User>>;
    fn list_users(&self, query: &UserListQuery) -> UserRepoResult<Vec<User>>;
    fn soft_delete_user(&self, id: UserId) -> UserRepoResult<()>;
}

/// SQLite-backed user directory repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> UserRepoResult<Self> {
        ensure_connection_ready(conn, "users", &["uuid", "name", "role", "is_deleted"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> UserRepoResult<UserId> {
        user.validate()?;

        self.conn.execute(
            "INSERT INTO users (uuid, name, role, is_deleted)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                user.uuid.to_string(),
                user.name.as_str(),
                user.role.as_str(),
                bool_to_int(user.is_deleted),
            ],
        )?;

        Ok(user.uuid)
    }

    fn update_user(&self, user: &User) -> UserRepoResult<()> {
        user.validate()?;

        let changed = self.conn.execute(
            "UPDATE users
             SET
                name = ?1,
                role = ?2,
                is_deleted = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?4;",
            params![
                user.name.as_str(),
                user.role.as_str(),
                bool_to_int(user.is_deleted),
                user.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(UserRepoError::NotFound(user.uuid));
        }

        Ok(())
    }

    fn get_user(&self, id: UserId, include_deleted: bool) -> UserRepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn list_users(&self, query: &UserListQuery) -> UserRepoResult<Vec<User>> {
        let mut sql = format!("{USER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<String> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }

        if let Some(role) = query.role {
            sql.push_str(" AND role = ?");
            bind_values.push(role.as_str().to_string());
        }

        sql.push_str(" ORDER BY name ASC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(bind_values))?;
        let mut users = Vec::new();

        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }

    fn soft_delete_user(&self, id: UserId) -> UserRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(UserRepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> UserRepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        UserRepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in users.uuid"))
    })?;

    let role_text: String = row.get("role")?;
    let role = parse_role(&role_text).map_err(UserRepoError::UnknownRole)?;

    let is_deleted = int_to_bool(row.get("is_deleted")?, "users", "is_deleted")
        .map_err(UserRepoError::InvalidData)?;

    Ok(User {
        uuid,
        name: row.get("name")?,
        role,
        is_deleted,
    })
}
