//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Isolate SQLite query details from dispatch/business orchestration.
//! - Translate SQLite constraint failures into semantic errors.
//!
//! # Invariants
//! - Repository writes validate their input model before SQL mutations.
//! - "Not found" on reads is `Ok(None)`; errors always mean something failed.
//! - Repositories borrow a connection and never close it.

use crate::db::DbError;
use crate::model::asset::AssetId;
use crate::model::ModelValidationError;
use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod asset_repo;
pub mod setting_repo;
pub mod transaction_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Typed outcome of a failed repository operation.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    /// A UNIQUE constraint rejected the write.
    Duplicate { table: String, column: String },
    /// A transaction referenced an asset that does not exist.
    UnknownAsset(AssetId),
    /// The supplied connection was never initialized with the schema.
    MissingRequiredTable(&'static str),
    Db(DbError),
}

impl RepoError {
    /// Returns whether this error is a uniqueness violation.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Duplicate { table, column } => {
                write!(f, "duplicate value for {table}.{column}")
            }
            Self::UnknownAsset(id) => write!(f, "asset not found: {id}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is not initialized: missing table `{table}`")
            }
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Duplicate { .. }
            | Self::UnknownAsset(_)
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let Some((table, column)) = unique_violation(&value) {
            return Self::Duplicate { table, column };
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rejects connections that lack the portfolio schema.
pub(crate) fn ensure_connection_ready(conn: &rusqlite::Connection) -> RepoResult<()> {
    match crate::db::first_missing_table(conn)? {
        Some(table) => Err(RepoError::MissingRequiredTable(table)),
        None => Ok(()),
    }
}

/// Extracts `(table, column)` from a UNIQUE/PRIMARY KEY violation.
fn unique_violation(err: &rusqlite::Error) -> Option<(String, String)> {
    let rusqlite::Error::SqliteFailure(code, message) = err else {
        return None;
    };
    if code.extended_code != ffi::SQLITE_CONSTRAINT_UNIQUE
        && code.extended_code != ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    {
        return None;
    }

    // SQLite reports "UNIQUE constraint failed: assets.ticker[, assets.x]".
    let target = message
        .as_deref()
        .and_then(|text| text.split_once(": "))
        .map(|(_, target)| target)
        .and_then(|target| target.split(", ").next())
        .unwrap_or("unknown.unknown");
    let (table, column) = target.split_once('.').unwrap_or(("unknown", target));
    Some((table.to_string(), column.to_string()))
}

pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

#[cfg(test)]
mod tests {
    use super::RepoError;
    use rusqlite::Connection;

    #[test]
    fn unique_violation_maps_to_duplicate_with_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE assets (id INTEGER PRIMARY KEY, ticker TEXT UNIQUE);
             INSERT INTO assets (ticker) VALUES ('MSFT');",
        )
        .unwrap();

        let err = conn
            .execute("INSERT INTO assets (ticker) VALUES ('MSFT');", [])
            .unwrap_err();
        match RepoError::from(err) {
            RepoError::Duplicate { table, column } => {
                assert_eq!(table, "assets");
                assert_eq!(column, "ticker");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn other_sqlite_errors_stay_db_errors() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.execute("SELECT * FROM missing_table;", []).unwrap_err();
        assert!(matches!(RepoError::from(err), RepoError::Db(_)));
    }
}
