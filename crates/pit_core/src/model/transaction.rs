//! Transaction (trade, fee, dividend, ...) records.
//!
//! # Invariants
//! - `asset_id` is optional so asset-less kinds such as fees can be recorded.
//! - Removing an asset clears `asset_id`; the transaction itself survives.
//! - `date` is stored as text and ordered lexicographically.

use super::asset::AssetId;
use super::{require_finite, require_text, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Store-generated transaction identifier.
pub type TransactionId = i64;

/// Fees recorded when the caller passes none.
pub const DEFAULT_FEES: f64 = 0.0;

/// Persisted transaction snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub asset_id: Option<AssetId>,
    pub transaction_type: String,
    pub date: String,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    pub fees: f64,
    pub currency: String,
    pub notes: Option<String>,
}

/// Transaction enriched with its owning asset's ticker and name.
///
/// Both enrichment fields are `None` for asset-less transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub ticker: Option<String>,
    pub asset_name: Option<String>,
}

/// Write model for `add_transaction`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub asset_id: Option<AssetId>,
    pub transaction_type: String,
    pub date: String,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    pub fees: f64,
    pub currency: String,
    pub notes: Option<String>,
}

impl NewTransaction {
    /// Creates a transaction without quantity, price, fees or notes.
    pub fn new(
        asset_id: Option<AssetId>,
        transaction_type: impl Into<String>,
        date: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            asset_id,
            transaction_type: transaction_type.into(),
            date: date.into(),
            quantity: None,
            price: None,
            fees: DEFAULT_FEES,
            currency: currency.into(),
            notes: None,
        }
    }

    /// Checks required text and numeric fields.
    ///
    /// # Errors
    /// - `BlankField` for blank `transaction_type`, `date` or `currency`.
    /// - `NonFiniteNumber` for NaN/infinite `quantity`, `price` or `fees`.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("transaction", "transaction_type", &self.transaction_type)?;
        require_text("transaction", "date", &self.date)?;
        require_text("transaction", "currency", &self.currency)?;
        require_finite("transaction", "quantity", self.quantity)?;
        require_finite("transaction", "price", self.price)?;
        require_finite("transaction", "fees", Some(self.fees))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{LedgerEntry, NewTransaction, Transaction, DEFAULT_FEES};
    use crate::model::ModelValidationError;

    #[test]
    fn new_transaction_defaults_fees_to_zero() {
        let tx = NewTransaction::new(None, "Fee", "2025-03-31", "USD");
        assert_eq!(tx.fees, DEFAULT_FEES);
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_finite_price() {
        let mut tx = NewTransaction::new(Some(1), "Buy", "2025-04-01", "USD");
        tx.price = Some(f64::NAN);
        assert_eq!(
            tx.validate().unwrap_err(),
            ModelValidationError::NonFiniteNumber {
                entity: "transaction",
                field: "price"
            }
        );
    }

    #[test]
    fn ledger_entry_serializes_flat() {
        let entry = LedgerEntry {
            transaction: Transaction {
                id: 7,
                asset_id: None,
                transaction_type: "Fee".to_string(),
                date: "2025-03-31".to_string(),
                quantity: None,
                price: Some(5.0),
                fees: 0.0,
                currency: "USD".to_string(),
                notes: Some("Monthly fee".to_string()),
            },
            ticker: None,
            asset_name: None,
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["id"], 7);
        assert!(value["asset_id"].is_null());
        assert!(value["asset_name"].is_null());
        assert_eq!(value["notes"], "Monthly fee");
    }
}
