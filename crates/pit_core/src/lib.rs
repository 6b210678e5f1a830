//! Core data access for PIT (portfolio investment tracker).
//! This crate is the single owner of the on-disk portfolio store.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use logging::{default_log_level, init_logging, init_logging_from_env, logging_status};
pub use model::asset::{Asset, AssetId, NewAsset};
pub use model::transaction::{
    LedgerEntry, NewTransaction, Transaction, TransactionId, DEFAULT_FEES,
};
pub use model::ModelValidationError;
pub use repo::asset_repo::{AssetRepository, SqliteAssetRepository};
pub use repo::setting_repo::{SettingRepository, SqliteSettingRepository};
pub use repo::transaction_repo::{SqliteTransactionRepository, TransactionRepository};
pub use repo::{RepoError, RepoResult};
pub use store::PortfolioStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
