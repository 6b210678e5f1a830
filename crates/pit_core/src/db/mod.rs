//! SQLite storage bootstrap and schema initialization entry points.
//!
//! # Responsibility
//! - Resolve where the portfolio store lives on disk.
//! - Open and configure SQLite connections for PIT core.
//! - Create the schema idempotently on every open.
//!
//! # Invariants
//! - Schema statements are `CREATE ... IF NOT EXISTS` only; nothing is dropped
//!   or altered.
//! - Core code must not read/write application data before the schema exists.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;
mod path;
pub mod schema;

pub use open::{initialize, open_db, open_db_in_memory};
pub use path::{resolve_db_path, DATABASE_PATH_ENV, DEFAULT_DB_DIR_NAME, DEFAULT_DB_FILE_NAME};
pub use schema::{apply_schema, first_missing_table};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Filesystem failure while resolving or preparing the store location.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io { path, source } => {
                write!(f, "store location `{}` is unusable: {source}", path.display())
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
