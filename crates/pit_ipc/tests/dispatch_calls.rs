use pit_core::db::open_db;
use pit_core::{
    AssetRepository, SqliteAssetRepository, SqliteTransactionRepository, TransactionRepository,
};
use pit_ipc::{Dispatcher, Envelope};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

struct Harness {
    _dir: TempDir,
    db_path: PathBuf,
    dispatcher: Dispatcher,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test_ipc_pit.db");
        let dispatcher = Dispatcher::new(Some(db_path.clone()));
        Self {
            _dir: dir,
            db_path,
            dispatcher,
        }
    }

    fn call(&self, name: &str, args: Value) -> Envelope {
        let raw = args.to_string();
        self.dispatcher.handle(name, Some(&raw))
    }

    fn data(&self, name: &str, args: Value) -> Value {
        match self.call(name, args) {
            Envelope::Data(value) => value,
            Envelope::Error(message) => panic!("{name} failed: {message}"),
        }
    }

    fn error(&self, name: &str, args: Value) -> String {
        match self.call(name, args) {
            Envelope::Error(message) => message,
            Envelope::Data(value) => panic!("{name} unexpectedly returned {value}"),
        }
    }
}

#[test]
fn get_setting_returns_value_or_null() {
    let harness = Harness::new();
    assert_eq!(
        harness.data("set_setting", json!(["base_currency", "USD"])),
        json!(true)
    );
    assert_eq!(
        harness.data("get_setting", json!(["base_currency"])),
        json!("USD")
    );
    assert_eq!(harness.data("get_setting", json!(["missing"])), Value::Null);
}

#[test]
fn set_setting_replaces_existing_value() {
    let harness = Harness::new();
    harness.data("setSetting", json!(["new_key", "v1"]));
    harness.data("setSetting", json!(["new_key", "v2"]));
    assert_eq!(harness.data("getSetting", json!(["new_key"])), json!("v2"));
}

#[test]
fn add_asset_returns_id_and_record_matches() {
    let harness = Harness::new();
    let id = harness.data(
        "add_asset",
        json!(["AAPL", "Apple Inc.", "Stock", "USD", "US0378331005"]),
    );
    let id = id.as_i64().expect("asset id should be an integer");

    let asset = harness.data("get_asset_by_id", json!([id]));
    assert_eq!(
        asset,
        json!({
            "id": id,
            "ticker": "AAPL",
            "name": "Apple Inc.",
            "asset_type": "Stock",
            "currency": "USD",
            "isin": "US0378331005"
        })
    );

    // Independent connection sees the committed row.
    let conn = open_db(&harness.db_path).unwrap();
    let repo = SqliteAssetRepository::try_new(&conn).unwrap();
    assert_eq!(repo.get_asset_by_ticker("AAPL").unwrap().unwrap().id, id);
}

#[test]
fn duplicate_ticker_returns_null_but_null_tickers_coexist() {
    let harness = Harness::new();
    let first = harness.data("add_asset", json!(["MSFT", "Microsoft", "Stock", "USD", null]));
    assert!(first.is_i64());
    let second = harness.data(
        "add_asset",
        json!(["MSFT", "Microsoft Duplicate", "Stock", "USD", null]),
    );
    assert_eq!(second, Value::Null);

    let savings_a = harness.data("add_asset", json!([null, "Savings A", "Savings", "GBP", null]));
    let savings_b = harness.data("add_asset", json!([null, "Savings B", "Savings", "GBP"]));
    assert!(savings_a.is_i64() && savings_b.is_i64());
    assert_ne!(savings_a, savings_b);
}

#[test]
fn get_all_assets_is_ordered_by_name() {
    let harness = Harness::new();
    harness.data("add_asset", json!(["META", "Meta", "Stock", "USD", null]));
    harness.data("add_asset", json!(["GOOG", "Alphabet", "Stock", "USD", null]));

    let assets = harness.data("get_all_assets", json!([]));
    let tickers = assets
        .as_array()
        .unwrap()
        .iter()
        .map(|asset| asset["ticker"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(tickers, vec!["GOOG", "META"]);
}

#[test]
fn add_transaction_then_list_for_asset() {
    let harness = Harness::new();
    let asset_id = harness
        .data("add_asset", json!(["IBM", "IBM", "Stock", "USD", null]))
        .as_i64()
        .unwrap();

    let tx_id = harness.data(
        "add_transaction",
        json!([asset_id, "Buy", "2025-04-03", 10, 125.0, 1.0, "USD", "Test Note via IPC"]),
    );
    let tx_id = tx_id.as_i64().expect("transaction id should be an integer");

    let conn = open_db(&harness.db_path).unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();
    let txs = repo.list_for_asset(asset_id).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].id, tx_id);

    let listed = harness.data("get_transactions_for_asset", json!([asset_id]));
    assert_eq!(listed[0]["notes"], json!("Test Note via IPC"));
    assert_eq!(listed[0]["quantity"], json!(10.0));
}

#[test]
fn fee_without_asset_appears_in_all_transactions() {
    let harness = Harness::new();
    let asset_id = harness
        .data("add_asset", json!(["X", "X Corp", "Stock", "USD", null]))
        .as_i64()
        .unwrap();
    harness.data(
        "add_transaction",
        json!([asset_id, "Buy", "2025-01-10", 50, 10.0, 1.0, "USD"]),
    );
    let fee_id = harness.data(
        "add_transaction",
        json!([null, "Fee", "2025-03-31", null, 5.00, 0.0, "USD", "Monthly fee"]),
    );

    let all = harness.data("get_all_transactions", json!([]));
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["id"], fee_id);
    assert_eq!(all[0]["asset_id"], Value::Null);
    assert_eq!(all[0]["asset_name"], Value::Null);
    assert_eq!(all[1]["asset_name"], json!("X Corp"));
    assert_eq!(all[1]["ticker"], json!("X"));
}

#[test]
fn unknown_operation_yields_error_without_data() {
    let harness = Harness::new();
    let line = harness.call("non_existent_function", json!([])).to_line();
    let parsed: Value = serde_json::from_str(&line).unwrap();
    assert!(parsed.get("data").is_none());
    assert!(parsed["error"]
        .as_str()
        .unwrap()
        .contains("unknown operation"));
}

#[test]
fn unknown_operation_does_not_touch_the_store() {
    let harness = Harness::new();
    harness.call("non_existent_function", json!([]));
    assert!(!harness.db_path.exists());
}

#[test]
fn argument_count_mismatch_yields_error_envelope() {
    let harness = Harness::new();
    let message = harness.error("get_setting", json!(["key1", "extra_arg"]));
    assert!(message.contains("positional argument"), "{message}");
    assert!(message.contains("takes"), "{message}");
}

#[test]
fn malformed_argument_text_yields_error_envelope() {
    let harness = Harness::new();
    let envelope = harness.dispatcher.handle("get_setting", Some("{not json"));
    match envelope {
        Envelope::Error(message) => assert!(message.contains("invalid arguments format")),
        other => panic!("unexpected envelope: {other:?}"),
    }

    let envelope = harness.dispatcher.handle("get_setting", Some(r#""k1""#));
    assert!(envelope.is_error());
}

#[test]
fn null_argument_text_is_rejected() {
    let harness = Harness::new();
    match harness.dispatcher.handle("get_all_assets", Some("null")) {
        Envelope::Error(message) => {
            assert!(message.contains("must be provided as a JSON array"), "{message}")
        }
        other => panic!("unexpected envelope: {other:?}"),
    }
    assert!(!harness.db_path.exists());
}

#[test]
fn missing_argument_text_defaults_to_empty_array() {
    let harness = Harness::new();
    assert_eq!(
        harness.dispatcher.handle("get_all_assets", None),
        Envelope::Data(json!([]))
    );
}

#[test]
fn initialize_database_creates_store_and_returns_path() {
    let harness = Harness::new();
    let path = harness.data("initialize_database", json!([]));
    assert_eq!(path, json!(harness.db_path.display().to_string()));
    assert!(harness.db_path.is_file());
}

#[test]
fn unusable_store_location_is_an_execution_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let dispatcher = Dispatcher::new(Some(blocker.join("pit.db")));

    match dispatcher.handle("get_all_assets", None) {
        Envelope::Error(message) => assert!(message.contains("get_all_assets"), "{message}"),
        other => panic!("unexpected envelope: {other:?}"),
    }
}
