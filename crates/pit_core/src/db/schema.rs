//! Portfolio schema definition and idempotent application.
//!
//! # Invariants
//! - Applying the schema twice is a no-op.
//! - `transactions.asset_id` is cleared, never cascaded, when its asset goes.

use super::DbResult;
use rusqlite::Connection;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Tables every ready connection must expose.
pub const REQUIRED_TABLES: [&str; 3] = ["assets", "transactions", "settings"];

/// Indexes created alongside the tables.
pub const INDEXES: [&str; 3] = [
    "idx_transactions_asset_id",
    "idx_transactions_date",
    "idx_assets_ticker",
];

/// Creates missing tables and indexes in one transaction.
pub fn apply_schema(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.commit()?;
    Ok(())
}

/// Returns the first required table absent from `conn`, if any.
///
/// Used to reject caller-supplied connections that were never initialized.
pub fn first_missing_table(conn: &Connection) -> DbResult<Option<&'static str>> {
    for table in REQUIRED_TABLES {
        if !object_exists(conn, "table", table)? {
            return Ok(Some(table));
        }
    }
    Ok(None)
}

/// Returns whether a schema object of `kind` (`table`/`index`) exists.
pub fn object_exists(conn: &Connection, kind: &str, name: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = ?1 AND name = ?2
        );",
        [kind, name],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{apply_schema, first_missing_table, object_exists, INDEXES, REQUIRED_TABLES};
    use rusqlite::Connection;

    #[test]
    fn apply_schema_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_schema(&mut conn).unwrap();
        apply_schema(&mut conn).unwrap();

        for table in REQUIRED_TABLES {
            assert!(object_exists(&conn, "table", table).unwrap(), "{table}");
        }
        for index in INDEXES {
            assert!(object_exists(&conn, "index", index).unwrap(), "{index}");
        }
    }

    #[test]
    fn first_missing_table_reports_uninitialized_connection() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(first_missing_table(&conn).unwrap(), Some("assets"));

        conn.execute_batch(
            "CREATE TABLE assets (id INTEGER PRIMARY KEY);
             CREATE TABLE transactions (id INTEGER PRIMARY KEY);",
        )
        .unwrap();
        assert_eq!(first_missing_table(&conn).unwrap(), Some("settings"));
    }
}
