//! Key/value settings repository.
//!
//! # Invariants
//! - One row per key; writing an existing key replaces its value.

use super::{ensure_connection_ready, RepoResult};
use crate::model::require_text;
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for settings.
pub trait SettingRepository {
    /// Inserts or replaces the value stored under `key`.
    fn set_setting(&self, key: &str, value: &str) -> RepoResult<()>;
    fn get_setting(&self, key: &str) -> RepoResult<Option<String>>;
}

/// SQLite-backed settings repository.
pub struct SqliteSettingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingRepository<'conn> {
    /// Constructs a repository from an initialized connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SettingRepository for SqliteSettingRepository<'_> {
    fn set_setting(&self, key: &str, value: &str) -> RepoResult<()> {
        require_text("setting", "key", key)?;

        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_setting(&self, key: &str) -> RepoResult<Option<String>> {
        // A row with a NULL value reads the same as a missing key.
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1;",
                [key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten();
        Ok(value)
    }
}
