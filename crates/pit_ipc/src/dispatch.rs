//! Name + argument-array dispatch onto the portfolio store.
//!
//! # Responsibility
//! - Parse the JSON argument array, resolve the operation name, bind
//!   arguments, invoke the store and flatten the typed outcome.
//!
//! # Invariants
//! - No state survives between calls; each `Dispatcher::handle` opens and
//!   closes its own store.
//! - Every failure class ends up in an `Envelope::Error`; nothing panics.
//! - Unknown names and binding failures never touch the store.

use crate::envelope::Envelope;
use crate::operation::{BindError, Operation, OperationKind};
use log::{debug, error, info, warn};
use pit_core::{PortfolioStore, RepoError};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Failure classes of one dispatched call.
#[derive(Debug)]
pub enum DispatchError {
    /// Argument text is not a JSON array.
    InvalidArguments { operation: String, message: String },
    UnknownOperation(String),
    Binding(BindError),
    Execution {
        operation: OperationKind,
        source: RepoError,
    },
    Serialization {
        operation: OperationKind,
        source: serde_json::Error,
    },
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArguments { operation, message } => {
                write!(f, "invalid arguments format for {operation}: {message}")
            }
            Self::UnknownOperation(name) => write!(f, "unknown operation `{name}`"),
            Self::Binding(err) => write!(f, "invalid arguments: {err}"),
            Self::Execution { operation, source } => {
                write!(f, "error executing {operation}: {source}")
            }
            Self::Serialization { operation, source } => {
                write!(f, "result of {operation} is not JSON serializable: {source}")
            }
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Binding(err) => Some(err),
            Self::Execution { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source),
            Self::InvalidArguments { .. } | Self::UnknownOperation(_) => None,
        }
    }
}

impl From<BindError> for DispatchError {
    fn from(value: BindError) -> Self {
        Self::Binding(value)
    }
}

/// Stateless per-call dispatcher.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    db_path: Option<PathBuf>,
}

impl Dispatcher {
    /// `db_path` overrides the environment/default store location.
    pub fn new(db_path: Option<PathBuf>) -> Self {
        Self { db_path }
    }

    /// Runs one call end to end with an ephemeral store connection.
    pub fn handle(&self, name: &str, raw_args: Option<&str>) -> Envelope {
        debug!("event=dispatch module=ipc status=start operation={name}");
        let result = parse_args(name, raw_args)
            .and_then(|args| bind_call(name, args))
            .and_then(|operation| {
                let store = PortfolioStore::open(self.db_path.as_deref()).map_err(|source| {
                    DispatchError::Execution {
                        operation: operation.kind(),
                        source,
                    }
                })?;
                run(&store, &operation)
            });
        finish(name, result)
    }
}

/// Parses the raw argument text; absent text means `[]`.
pub fn parse_args(name: &str, raw_args: Option<&str>) -> Result<Vec<Value>, DispatchError> {
    let Some(raw) = raw_args else {
        return Ok(Vec::new());
    };

    let parsed: Value =
        serde_json::from_str(raw).map_err(|err| DispatchError::InvalidArguments {
            operation: name.to_string(),
            message: err.to_string(),
        })?;
    args_from_value(name, parsed)
}

/// Accepts only a JSON array; `null` and scalars are rejected.
pub fn args_from_value(name: &str, value: Value) -> Result<Vec<Value>, DispatchError> {
    match value {
        Value::Array(args) => Ok(args),
        _ => Err(DispatchError::InvalidArguments {
            operation: name.to_string(),
            message: "arguments must be provided as a JSON array".to_string(),
        }),
    }
}

/// Resolves `name` against the closed operation set and binds `args`.
pub fn bind_call(name: &str, args: Vec<Value>) -> Result<Operation, DispatchError> {
    let kind = OperationKind::from_name(name)
        .ok_or_else(|| DispatchError::UnknownOperation(name.to_string()))?;
    Ok(Operation::bind(kind, args)?)
}

/// Invokes a bound operation and flattens its outcome into a JSON value.
///
/// `add_asset` uniqueness violations flatten to `null`; every other
/// repository error is returned as `DispatchError::Execution`.
pub fn run(store: &PortfolioStore, operation: &Operation) -> Result<Value, DispatchError> {
    let kind = operation.kind();
    info!("event=dispatch_invoke module=ipc status=start operation={kind}");
    let execution = |source: RepoError| DispatchError::Execution {
        operation: kind,
        source,
    };

    match operation {
        Operation::InitializeDatabase => {
            to_value(kind, store.path().map(|path| path.display().to_string()))
        }
        Operation::AddAsset(asset) => match store.add_asset(asset) {
            Ok(id) => to_value(kind, id),
            Err(err) if err.is_duplicate() => Ok(Value::Null),
            Err(err) => Err(execution(err)),
        },
        Operation::GetAssetByTicker { ticker } => {
            to_value(kind, store.get_asset_by_ticker(ticker).map_err(execution)?)
        }
        Operation::GetAssetById { asset_id } => {
            to_value(kind, store.get_asset_by_id(*asset_id).map_err(execution)?)
        }
        Operation::GetAllAssets => to_value(kind, store.get_all_assets().map_err(execution)?),
        Operation::AddTransaction(transaction) => {
            to_value(kind, store.add_transaction(transaction).map_err(execution)?)
        }
        Operation::GetTransactionsForAsset { asset_id } => to_value(
            kind,
            store
                .get_transactions_for_asset(*asset_id)
                .map_err(execution)?,
        ),
        Operation::GetAllTransactions => {
            to_value(kind, store.get_all_transactions().map_err(execution)?)
        }
        Operation::SetSetting { key, value } => {
            store.set_setting(key, value).map_err(execution)?;
            Ok(Value::Bool(true))
        }
        Operation::GetSetting { key } => to_value(kind, store.get_setting(key).map_err(execution)?),
    }
}

/// Logs the outcome of a call and turns it into an envelope.
pub fn finish(name: &str, result: Result<Value, DispatchError>) -> Envelope {
    match &result {
        Ok(_) => info!("event=dispatch module=ipc status=ok operation={name}"),
        Err(err @ (DispatchError::Execution { .. } | DispatchError::Serialization { .. })) => {
            error!("event=dispatch module=ipc status=error operation={name} error={err}")
        }
        Err(err) => warn!("event=dispatch module=ipc status=rejected operation={name} error={err}"),
    }
    Envelope::from(result)
}

fn to_value<T: Serialize>(operation: OperationKind, value: T) -> Result<Value, DispatchError> {
    serde_json::to_value(value)
        .map_err(|source| DispatchError::Serialization { operation, source })
}
