//! Asset (holding) records.
//!
//! # Invariants
//! - `ticker` and `isin` are unique among non-null values.
//! - A blank ticker/isin is stored as NULL and never counts as a duplicate.

use super::{blank_to_none, require_text, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Store-generated asset identifier.
pub type AssetId = i64;

/// Persisted asset snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    /// Absent for holdings without a listing, e.g. savings accounts.
    pub ticker: Option<String>,
    pub name: String,
    /// Free-form category (`Stock`, `Crypto`, `Savings`, ...).
    pub asset_type: String,
    pub currency: String,
    pub isin: Option<String>,
}

/// Write model for `add_asset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAsset {
    pub ticker: Option<String>,
    pub name: String,
    pub asset_type: String,
    pub currency: String,
    pub isin: Option<String>,
}

impl NewAsset {
    /// Creates an unlisted asset (no ticker, no isin).
    pub fn new(
        name: impl Into<String>,
        asset_type: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            ticker: None,
            name: name.into(),
            asset_type: asset_type.into(),
            currency: currency.into(),
            isin: None,
        }
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    pub fn with_isin(mut self, isin: impl Into<String>) -> Self {
        self.isin = Some(isin.into());
        self
    }

    /// Checks required fields.
    ///
    /// # Errors
    /// - `BlankField` when `name`, `asset_type` or `currency` is blank.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("asset", "name", &self.name)?;
        require_text("asset", "asset_type", &self.asset_type)?;
        require_text("asset", "currency", &self.currency)?;
        Ok(())
    }

    /// Ticker as it will be persisted.
    pub fn stored_ticker(&self) -> Option<&str> {
        blank_to_none(self.ticker.as_deref())
    }

    /// ISIN as it will be persisted.
    pub fn stored_isin(&self) -> Option<&str> {
        blank_to_none(self.isin.as_deref())
    }
}
