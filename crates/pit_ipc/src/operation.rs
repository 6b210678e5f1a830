//! Closed set of operations reachable through the dispatch boundary.
//!
//! # Responsibility
//! - Map operation names to a fixed, typed signature.
//! - Bind positional JSON arguments to that signature.
//!
//! # Invariants
//! - Only names listed in `OperationKind::ALL` resolve; nothing else is callable.
//! - Trailing optional parameters may be omitted; `null` is accepted only for
//!   nullable parameters.

use pit_core::{AssetId, NewAsset, NewTransaction, DEFAULT_FEES};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Every operation the dispatcher can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    InitializeDatabase,
    AddAsset,
    GetAssetByTicker,
    GetAssetById,
    GetAllAssets,
    AddTransaction,
    GetTransactionsForAsset,
    GetAllTransactions,
    SetSetting,
    GetSetting,
}

impl OperationKind {
    pub const ALL: [OperationKind; 10] = [
        Self::InitializeDatabase,
        Self::AddAsset,
        Self::GetAssetByTicker,
        Self::GetAssetById,
        Self::GetAllAssets,
        Self::AddTransaction,
        Self::GetTransactionsForAsset,
        Self::GetAllTransactions,
        Self::SetSetting,
        Self::GetSetting,
    ];

    /// Canonical (snake_case) operation name.
    pub fn name(self) -> &'static str {
        match self {
            Self::InitializeDatabase => "initialize_database",
            Self::AddAsset => "add_asset",
            Self::GetAssetByTicker => "get_asset_by_ticker",
            Self::GetAssetById => "get_asset_by_id",
            Self::GetAllAssets => "get_all_assets",
            Self::AddTransaction => "add_transaction",
            Self::GetTransactionsForAsset => "get_transactions_for_asset",
            Self::GetAllTransactions => "get_all_transactions",
            Self::SetSetting => "set_setting",
            Self::GetSetting => "get_setting",
        }
    }

    fn camel_case_alias(self) -> &'static str {
        match self {
            Self::InitializeDatabase => "initializeDatabase",
            Self::AddAsset => "addAsset",
            Self::GetAssetByTicker => "getAssetByTicker",
            Self::GetAssetById => "getAssetById",
            Self::GetAllAssets => "getAllAssets",
            Self::AddTransaction => "addTransaction",
            Self::GetTransactionsForAsset => "getTransactionsForAsset",
            Self::GetAllTransactions => "getAllTransactions",
            Self::SetSetting => "setSetting",
            Self::GetSetting => "getSetting",
        }
    }

    /// Resolves a snake_case name or its camelCase alias.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name || kind.camel_case_alias() == name)
    }

    /// Positional parameter names; the first `required` must be supplied.
    fn params(self) -> (&'static [&'static str], usize) {
        match self {
            Self::InitializeDatabase | Self::GetAllAssets | Self::GetAllTransactions => (&[], 0),
            Self::AddAsset => (&["ticker", "name", "asset_type", "currency", "isin"], 4),
            Self::GetAssetByTicker => (&["ticker"], 1),
            Self::GetAssetById => (&["asset_id"], 1),
            Self::AddTransaction => (
                &[
                    "asset_id",
                    "transaction_type",
                    "date",
                    "quantity",
                    "price",
                    "fees",
                    "currency",
                    "notes",
                ],
                7,
            ),
            Self::GetTransactionsForAsset => (&["asset_id"], 1),
            Self::SetSetting => (&["key", "value"], 2),
            Self::GetSetting => (&["key"], 1),
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved operation with its arguments bound to typed values.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    InitializeDatabase,
    AddAsset(NewAsset),
    GetAssetByTicker { ticker: String },
    GetAssetById { asset_id: AssetId },
    GetAllAssets,
    AddTransaction(NewTransaction),
    GetTransactionsForAsset { asset_id: AssetId },
    GetAllTransactions,
    SetSetting { key: String, value: String },
    GetSetting { key: String },
}

impl Operation {
    /// Binds positional arguments to the signature of `kind`.
    ///
    /// # Errors
    /// - `BindError::Arity` when too few or too many arguments are given.
    /// - `BindError::Type` when an argument cannot be decoded into its slot.
    pub fn bind(kind: OperationKind, args: Vec<Value>) -> Result<Self, BindError> {
        let (names, required) = kind.params();
        if args.len() < required || args.len() > names.len() {
            return Err(BindError::Arity {
                operation: kind,
                min: required,
                max: names.len(),
                given: args.len(),
            });
        }

        let mut args = BoundArgs::new(kind, names, args);
        let operation = match kind {
            OperationKind::InitializeDatabase => Self::InitializeDatabase,
            OperationKind::AddAsset => Self::AddAsset(NewAsset {
                ticker: args.optional()?,
                name: args.required()?,
                asset_type: args.required()?,
                currency: args.required()?,
                isin: args.optional()?,
            }),
            OperationKind::GetAssetByTicker => Self::GetAssetByTicker {
                ticker: args.required()?,
            },
            OperationKind::GetAssetById => Self::GetAssetById {
                asset_id: args.required()?,
            },
            OperationKind::GetAllAssets => Self::GetAllAssets,
            OperationKind::AddTransaction => Self::AddTransaction(NewTransaction {
                asset_id: args.optional()?,
                transaction_type: args.required()?,
                date: args.required()?,
                quantity: args.optional()?,
                price: args.optional()?,
                fees: args.optional()?.unwrap_or(DEFAULT_FEES),
                currency: args.required()?,
                notes: args.optional()?,
            }),
            OperationKind::GetTransactionsForAsset => Self::GetTransactionsForAsset {
                asset_id: args.required()?,
            },
            OperationKind::GetAllTransactions => Self::GetAllTransactions,
            OperationKind::SetSetting => Self::SetSetting {
                key: args.required()?,
                value: args.required()?,
            },
            OperationKind::GetSetting => Self::GetSetting {
                key: args.required()?,
            },
        };
        Ok(operation)
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::InitializeDatabase => OperationKind::InitializeDatabase,
            Self::AddAsset(_) => OperationKind::AddAsset,
            Self::GetAssetByTicker { .. } => OperationKind::GetAssetByTicker,
            Self::GetAssetById { .. } => OperationKind::GetAssetById,
            Self::GetAllAssets => OperationKind::GetAllAssets,
            Self::AddTransaction(_) => OperationKind::AddTransaction,
            Self::GetTransactionsForAsset { .. } => OperationKind::GetTransactionsForAsset,
            Self::GetAllTransactions => OperationKind::GetAllTransactions,
            Self::SetSetting { .. } => OperationKind::SetSetting,
            Self::GetSetting { .. } => OperationKind::GetSetting,
        }
    }
}

/// Argument list that does not fit the resolved operation's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    Arity {
        operation: OperationKind,
        min: usize,
        max: usize,
        given: usize,
    },
    Type {
        operation: OperationKind,
        /// 1-based argument position.
        position: usize,
        param: &'static str,
        message: String,
    },
}

impl Display for BindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arity {
                operation,
                min,
                max,
                given,
            } if min == max => write!(
                f,
                "{operation}() takes {max} positional argument{} but {given} {} given",
                plural(*max),
                were(*given)
            ),
            Self::Arity {
                operation,
                min,
                max,
                given,
            } => write!(
                f,
                "{operation}() takes from {min} to {max} positional arguments but {given} {} given",
                were(*given)
            ),
            Self::Type {
                operation,
                position,
                param,
                message,
            } => write!(
                f,
                "{operation}() argument {position} (`{param}`) has the wrong type: {message}"
            ),
        }
    }
}

impl Error for BindError {}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn were(count: usize) -> &'static str {
    if count == 1 {
        "was"
    } else {
        "were"
    }
}

struct BoundArgs {
    operation: OperationKind,
    names: &'static [&'static str],
    values: std::vec::IntoIter<Value>,
    position: usize,
}

impl BoundArgs {
    fn new(operation: OperationKind, names: &'static [&'static str], values: Vec<Value>) -> Self {
        Self {
            operation,
            names,
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Decodes the next argument; `null` and absence are rejected.
    fn required<T: DeserializeOwned>(&mut self) -> Result<T, BindError> {
        let value = self.values.next().unwrap_or(Value::Null);
        self.position += 1;
        self.decode(value)
    }

    /// Decodes the next argument; `null` and absence become `None`.
    fn optional<T: DeserializeOwned>(&mut self) -> Result<Option<T>, BindError> {
        let value = self.values.next().unwrap_or(Value::Null);
        self.position += 1;
        if value.is_null() {
            return Ok(None);
        }
        self.decode(value).map(Some)
    }

    fn decode<T: DeserializeOwned>(&self, value: Value) -> Result<T, BindError> {
        serde_json::from_value(value).map_err(|err| BindError::Type {
            operation: self.operation,
            position: self.position,
            param: self.names.get(self.position - 1).copied().unwrap_or("?"),
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{BindError, Operation, OperationKind};
    use pit_core::NewAsset;
    use serde_json::json;

    fn args(value: serde_json::Value) -> Vec<serde_json::Value> {
        value.as_array().cloned().unwrap_or_default()
    }

    #[test]
    fn names_and_aliases_resolve_to_same_kind() {
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(
            OperationKind::from_name("getSetting"),
            Some(OperationKind::GetSetting)
        );
        assert_eq!(OperationKind::from_name("get_db_connection"), None);
        assert_eq!(OperationKind::from_name(""), None);
    }

    #[test]
    fn add_asset_binds_with_and_without_trailing_isin() {
        let bound = Operation::bind(
            OperationKind::AddAsset,
            args(json!(["AAPL", "Apple Inc.", "Stock", "USD", "US0378331005"])),
        )
        .unwrap();
        assert_eq!(
            bound,
            Operation::AddAsset(
                NewAsset::new("Apple Inc.", "Stock", "USD")
                    .with_ticker("AAPL")
                    .with_isin("US0378331005")
            )
        );

        let bound = Operation::bind(
            OperationKind::AddAsset,
            args(json!([null, "My Savings", "Savings", "GBP"])),
        )
        .unwrap();
        assert_eq!(
            bound,
            Operation::AddAsset(NewAsset::new("My Savings", "Savings", "GBP"))
        );
    }

    #[test]
    fn add_transaction_defaults_null_fees_to_zero() {
        let bound = Operation::bind(
            OperationKind::AddTransaction,
            args(json!([null, "Fee", "2025-03-31", null, 5.0, null, "USD"])),
        )
        .unwrap();
        match bound {
            Operation::AddTransaction(tx) => {
                assert_eq!(tx.asset_id, None);
                assert_eq!(tx.price, Some(5.0));
                assert_eq!(tx.fees, 0.0);
                assert_eq!(tx.notes, None);
            }
            other => panic!("unexpected operation: {other:?}"),
        }
    }

    #[test]
    fn integer_quantities_bind_as_numbers() {
        let bound = Operation::bind(
            OperationKind::AddTransaction,
            args(json!([3, "Buy", "2025-04-03", 10, 125, 1, "USD", "note"])),
        )
        .unwrap();
        match bound {
            Operation::AddTransaction(tx) => {
                assert_eq!(tx.asset_id, Some(3));
                assert_eq!(tx.quantity, Some(10.0));
                assert_eq!(tx.price, Some(125.0));
                assert_eq!(tx.fees, 1.0);
            }
            other => panic!("unexpected operation: {other:?}"),
        }
    }

    #[test]
    fn extra_argument_is_an_arity_error() {
        let err = Operation::bind(OperationKind::GetSetting, args(json!(["key1", "extra_arg"])))
            .unwrap_err();
        assert_eq!(
            err,
            BindError::Arity {
                operation: OperationKind::GetSetting,
                min: 1,
                max: 1,
                given: 2
            }
        );
        assert_eq!(
            err.to_string(),
            "get_setting() takes 1 positional argument but 2 were given"
        );
    }

    #[test]
    fn missing_required_argument_is_an_arity_error() {
        let err = Operation::bind(OperationKind::AddAsset, args(json!(["AAPL", "Apple"])))
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("takes from 4 to 5 positional arguments but 2 were given"));
    }

    #[test]
    fn wrong_type_names_position_and_parameter() {
        let err = Operation::bind(OperationKind::GetAssetById, args(json!(["seven"])))
            .unwrap_err();
        match &err {
            BindError::Type {
                position, param, ..
            } => {
                assert_eq!(*position, 1);
                assert_eq!(*param, "asset_id");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = Operation::bind(OperationKind::SetSetting, args(json!(["key", null])))
            .unwrap_err();
        assert!(err.to_string().contains("`value`"), "{err}");
    }
}
