//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce model `validate()` before persistence.
//! - Repository constructors verify schema readiness; a connection that
//!   skipped migrations is rejected up front.
//! - Read paths reject invalid persisted state instead of masking it.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::db::migrations::latest_version;
use rusqlite::Connection;

pub mod estate_repo;
pub mod item_repo;
pub mod message_repo;
pub mod user_repo;

/// Schema readiness findings shared by every repository constructor.
#[derive(Debug)]
pub(crate) enum SchemaGuard {
    Uninitialized {
        expected_version: u32,
        actual_version: u32,
    },
    MissingTable(&'static str),
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

/// Verifies the connection is migrated and carries the given table with
/// the given columns.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> Result<(), SchemaGuard> {
    let actual_version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap_or(0);
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(SchemaGuard::Uninitialized {
            expected_version,
            actual_version,
        });
    }

    let table_exists: bool = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )
        .unwrap_or(false);
    if !table_exists {
        return Err(SchemaGuard::MissingTable(table));
    }

    for column in columns {
        let column_exists: bool = conn
            .query_row(
                &format!(
                    "SELECT EXISTS(
                        SELECT 1 FROM pragma_table_info('{table}') WHERE name = ?1
                    );"
                ),
                [*column],
                |row| row.get(0),
            )
            .unwrap_or(false);
        if !column_exists {
            return Err(SchemaGuard::MissingColumn { table, column });
        }
    }

    Ok(())
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn int_to_bool(value: i64, table: &str, column: &str) -> Result<bool, String> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(format!("invalid value `{other}` in {table}.{column}")),
    }
}
