//! Asset repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide add/lookup/list APIs over the `assets` table.
//!
//! # Invariants
//! - Write paths call `NewAsset::validate()` before SQL mutations.
//! - Ticker/isin clashes surface as `RepoError::Duplicate`.
//! - `list_assets` is ordered by `name ASC, id ASC`.

use super::{ensure_connection_ready, RepoResult};
use crate::model::asset::{Asset, AssetId, NewAsset};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ASSET_SELECT_SQL: &str = "SELECT
    id,
    ticker,
    name,
    asset_type,
    currency,
    isin
FROM assets";

/// Repository interface for asset operations.
pub trait AssetRepository {
    fn add_asset(&self, asset: &NewAsset) -> RepoResult<AssetId>;
    fn get_asset_by_ticker(&self, ticker: &str) -> RepoResult<Option<Asset>>;
    fn get_asset_by_id(&self, id: AssetId) -> RepoResult<Option<Asset>>;
    fn list_assets(&self) -> RepoResult<Vec<Asset>>;
}

/// SQLite-backed asset repository.
pub struct SqliteAssetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAssetRepository<'conn> {
    /// Constructs a repository from an initialized connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when the schema was never applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AssetRepository for SqliteAssetRepository<'_> {
    fn add_asset(&self, asset: &NewAsset) -> RepoResult<AssetId> {
        asset.validate()?;

        self.conn.execute(
            "INSERT INTO assets (ticker, name, asset_type, currency, isin)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                asset.stored_ticker(),
                asset.name.as_str(),
                asset.asset_type.as_str(),
                asset.currency.as_str(),
                asset.stored_isin(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_asset_by_ticker(&self, ticker: &str) -> RepoResult<Option<Asset>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ASSET_SELECT_SQL} WHERE ticker = ?1;"))?;
        let asset = stmt.query_row([ticker], parse_asset_row).optional()?;
        Ok(asset)
    }

    fn get_asset_by_id(&self, id: AssetId) -> RepoResult<Option<Asset>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ASSET_SELECT_SQL} WHERE id = ?1;"))?;
        let asset = stmt.query_row([id], parse_asset_row).optional()?;
        Ok(asset)
    }

    fn list_assets(&self) -> RepoResult<Vec<Asset>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ASSET_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let assets = stmt
            .query_map([], parse_asset_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assets)
    }
}

fn parse_asset_row(row: &Row<'_>) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: row.get("id")?,
        ticker: row.get("ticker")?,
        name: row.get("name")?,
        asset_type: row.get("asset_type")?,
        currency: row.get("currency")?,
        isin: row.get("isin")?,
    })
}
