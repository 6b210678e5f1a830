//! Transaction repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Record transactions with or without an owning asset.
//! - Provide per-asset and ledger-wide listings.
//!
//! # Invariants
//! - Listings are ordered by `date DESC, id DESC`.
//! - Ledger listing keeps asset-less rows (LEFT JOIN) with empty enrichment.
//! - A dangling `asset_id` surfaces as `RepoError::UnknownAsset`.

use super::{ensure_connection_ready, is_foreign_key_violation, RepoError, RepoResult};
use crate::model::asset::AssetId;
use crate::model::transaction::{LedgerEntry, NewTransaction, Transaction, TransactionId};
use rusqlite::{params, Connection, Row};

/// Repository interface for transaction operations.
pub trait TransactionRepository {
    fn add_transaction(&self, transaction: &NewTransaction) -> RepoResult<TransactionId>;
    fn list_for_asset(&self, asset_id: AssetId) -> RepoResult<Vec<Transaction>>;
    fn list_ledger(&self) -> RepoResult<Vec<LedgerEntry>>;
}

/// SQLite-backed transaction repository.
pub struct SqliteTransactionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTransactionRepository<'conn> {
    /// Constructs a repository from an initialized connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TransactionRepository for SqliteTransactionRepository<'_> {
    fn add_transaction(&self, transaction: &NewTransaction) -> RepoResult<TransactionId> {
        transaction.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO transactions (
                asset_id,
                transaction_type,
                date,
                quantity,
                price,
                fees,
                currency,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                transaction.asset_id,
                transaction.transaction_type.as_str(),
                transaction.date.as_str(),
                transaction.quantity,
                transaction.price,
                transaction.fees,
                transaction.currency.as_str(),
                transaction.notes.as_deref(),
            ],
        );

        match (inserted, transaction.asset_id) {
            (Ok(_), _) => Ok(self.conn.last_insert_rowid()),
            (Err(err), Some(asset_id)) if is_foreign_key_violation(&err) => {
                Err(RepoError::UnknownAsset(asset_id))
            }
            (Err(err), _) => Err(err.into()),
        }
    }

    fn list_for_asset(&self, asset_id: AssetId) -> RepoResult<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                asset_id,
                transaction_type,
                date,
                quantity,
                price,
                fees,
                currency,
                notes
             FROM transactions
             WHERE asset_id = ?1
             ORDER BY date DESC, id DESC;",
        )?;
        let transactions = stmt
            .query_map([asset_id], parse_transaction_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    fn list_ledger(&self) -> RepoResult<Vec<LedgerEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                t.id,
                t.asset_id,
                t.transaction_type,
                t.date,
                t.quantity,
                t.price,
                t.fees,
                t.currency,
                t.notes,
                a.ticker,
                a.name AS asset_name
             FROM transactions t
             LEFT JOIN assets a ON t.asset_id = a.id
             ORDER BY t.date DESC, t.id DESC;",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(LedgerEntry {
                    transaction: parse_transaction_row(row)?,
                    ticker: row.get("ticker")?,
                    asset_name: row.get("asset_name")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

fn parse_transaction_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get("id")?,
        asset_id: row.get("asset_id")?,
        transaction_type: row.get("transaction_type")?,
        date: row.get("date")?,
        quantity: row.get("quantity")?,
        price: row.get("price")?,
        // Rows written by older tools may carry NULL fees.
        fees: row.get::<_, Option<f64>>("fees")?.unwrap_or_default(),
        currency: row.get("currency")?,
        notes: row.get("notes")?,
    })
}
