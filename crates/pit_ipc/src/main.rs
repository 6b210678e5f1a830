//! Host-facing entry point.
//!
//! `pit_ipc <operation> [<json-arg-array>]` answers one call;
//! `pit_ipc --stdio` keeps a store open and answers newline-delimited
//! requests until stdin closes.

use clap::Parser;
use log::{error, info};
use pit_core::{core_version, init_logging_from_env, PortfolioStore};
use pit_ipc::{serve, Dispatcher, Envelope};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "pit_ipc", version, about = "PIT portfolio store dispatcher")]
struct Cli {
    /// Operation to invoke, e.g. `get_setting`.
    #[arg(required_unless_present = "stdio")]
    operation: Option<String>,

    /// JSON array of positional arguments; defaults to `[]`.
    #[arg(allow_hyphen_values = true)]
    args: Option<String>,

    /// Serve newline-delimited JSON requests from stdin.
    #[arg(long, conflicts_with_all = ["operation", "args"])]
    stdio: bool,

    /// Store location; overrides `PIT_DATABASE_PATH`.
    #[arg(long, value_name = "PATH")]
    db_path: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging_from_env() {
        // Logging is best effort; the response channel must still work.
        eprintln!("pit_ipc: logging disabled: {err}");
    }
    info!("event=ipc_start module=ipc status=ok core_version={}", core_version());

    if cli.stdio {
        return serve_stdio(cli.db_path);
    }

    let Some(operation) = cli.operation else {
        return ExitCode::from(2);
    };
    let envelope = Dispatcher::new(cli.db_path).handle(&operation, cli.args.as_deref());
    write_envelope(&envelope)
}

fn serve_stdio(db_path: Option<PathBuf>) -> ExitCode {
    let store = match PortfolioStore::open(db_path.as_deref()) {
        Ok(store) => store,
        Err(err) => {
            error!("event=serve module=ipc status=error error_code=store_open_failed error={err}");
            return write_envelope(&Envelope::error(format!("failed to open store: {err}")));
        }
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    match serve(&store, stdin.lock(), stdout.lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=serve module=ipc status=error error_code=io_failed error={err}");
            ExitCode::FAILURE
        }
    }
}

fn write_envelope(envelope: &Envelope) -> ExitCode {
    let mut stdout = std::io::stdout().lock();
    match writeln!(stdout, "{}", envelope.to_line()).and_then(|()| stdout.flush()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=respond module=ipc status=error error={err}");
            ExitCode::FAILURE
        }
    }
}
