//! Owned-connection portfolio store.
//!
//! # Responsibility
//! - Own one SQLite connection for the lifetime of a caller (one IPC call or
//!   one long-lived session) and close it on drop.
//! - Expose every repository operation through a single object.
//! - Provide an explicit transaction scope for multi-step work.
//!
//! # Invariants
//! - The wrapped connection always carries the portfolio schema.
//! - Every failed operation is logged before its error is returned.
//! - Outside `in_transaction`, each write commits on its own.

use crate::db::{open_db, open_db_in_memory, resolve_db_path};
use crate::model::asset::{Asset, AssetId, NewAsset};
use crate::model::transaction::{LedgerEntry, NewTransaction, Transaction, TransactionId};
use crate::repo::asset_repo::{AssetRepository, SqliteAssetRepository};
use crate::repo::setting_repo::{SettingRepository, SqliteSettingRepository};
use crate::repo::transaction_repo::{SqliteTransactionRepository, TransactionRepository};
use crate::repo::{ensure_connection_ready, RepoResult};
use log::{debug, error, warn};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use std::path::{Path, PathBuf};

/// Portfolio repository bound to an owned connection.
pub struct PortfolioStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl PortfolioStore {
    /// Resolves the store location and opens it, creating the schema if absent.
    ///
    /// Precedence: `explicit`, then `PIT_DATABASE_PATH`, then the default path.
    pub fn open(explicit: Option<&Path>) -> RepoResult<Self> {
        let path = resolve_db_path(explicit)?;
        let conn = open_db(&path)?;
        debug!("event=store_open module=store status=ok path={}", path.display());
        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
            path: None,
        })
    }

    /// Wraps an already-open connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when the connection was never initialized.
    pub fn from_connection(conn: Connection) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        let path = conn
            .path()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);
        Ok(Self { conn, path })
    }

    /// On-disk location, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Borrows the underlying connection, e.g. for ad-hoc repositories.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Releases the store and hands the connection back to the caller.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Runs `work` inside one IMMEDIATE transaction.
    ///
    /// Commits when `work` returns `Ok`, rolls back when it returns `Err`.
    pub fn in_transaction<T>(
        &mut self,
        work: impl FnOnce(&Connection) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let tx = SqlTransaction::new(&mut self.conn, TransactionBehavior::Immediate)?;
        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                debug!("event=store_tx module=store status=committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event=store_tx module=store status=error error_code=rollback_failed error={}",
                        rollback_err
                    );
                }
                warn!("event=store_tx module=store status=rolled_back error={}", err);
                Err(err)
            }
        }
    }

    pub fn add_asset(&self, asset: &NewAsset) -> RepoResult<AssetId> {
        let result = self.assets().add_asset(asset);
        match &result {
            Ok(id) => debug!("event=asset_add module=store status=ok asset_id={id}"),
            Err(err) if err.is_duplicate() => warn!(
                "event=asset_add module=store status=rejected error_code=duplicate error={}",
                err
            ),
            Err(err) => log_failure("asset_add", err),
        }
        result
    }

    pub fn get_asset_by_ticker(&self, ticker: &str) -> RepoResult<Option<Asset>> {
        logged("asset_get_by_ticker", self.assets().get_asset_by_ticker(ticker))
    }

    pub fn get_asset_by_id(&self, id: AssetId) -> RepoResult<Option<Asset>> {
        logged("asset_get_by_id", self.assets().get_asset_by_id(id))
    }

    /// Lists all assets ordered by name.
    pub fn get_all_assets(&self) -> RepoResult<Vec<Asset>> {
        logged("asset_list", self.assets().list_assets())
    }

    pub fn add_transaction(&self, transaction: &NewTransaction) -> RepoResult<TransactionId> {
        logged("transaction_add", self.transactions().add_transaction(transaction))
    }

    /// Lists one asset's transactions, newest date first.
    pub fn get_transactions_for_asset(&self, asset_id: AssetId) -> RepoResult<Vec<Transaction>> {
        logged(
            "transaction_list_for_asset",
            self.transactions().list_for_asset(asset_id),
        )
    }

    /// Lists every transaction with asset ticker/name, newest date first.
    pub fn get_all_transactions(&self) -> RepoResult<Vec<LedgerEntry>> {
        logged("transaction_list", self.transactions().list_ledger())
    }

    pub fn set_setting(&self, key: &str, value: &str) -> RepoResult<()> {
        logged("setting_set", self.settings().set_setting(key, value))
    }

    pub fn get_setting(&self, key: &str) -> RepoResult<Option<String>> {
        logged("setting_get", self.settings().get_setting(key))
    }

    fn assets(&self) -> SqliteAssetRepository<'_> {
        SqliteAssetRepository::from_ready(&self.conn)
    }

    fn transactions(&self) -> SqliteTransactionRepository<'_> {
        SqliteTransactionRepository::from_ready(&self.conn)
    }

    fn settings(&self) -> SqliteSettingRepository<'_> {
        SqliteSettingRepository::from_ready(&self.conn)
    }
}

fn logged<T>(event: &str, result: RepoResult<T>) -> RepoResult<T> {
    match &result {
        Ok(_) => debug!("event={event} module=store status=ok"),
        Err(err) => log_failure(event, err),
    }
    result
}

fn log_failure(event: &str, err: &crate::repo::RepoError) {
    error!("event={event} module=store status=error error={err}");
}
