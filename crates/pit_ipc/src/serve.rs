//! Long-lived request loop over newline-delimited JSON.
//!
//! Each input line is one request `{"operation": "...", "args": [...]}`;
//! each request gets exactly one envelope line, in order. The store
//! connection is opened once and shared by all requests.

use crate::dispatch::{args_from_value, bind_call, finish, run, DispatchError};
use crate::envelope::Envelope;
use log::{debug, info};
use pit_core::PortfolioStore;
use serde::Deserialize;
use serde_json::Value;
use std::io::{BufRead, Write};

#[derive(Debug, Deserialize)]
struct Request {
    operation: String,
    /// Only an absent field means "no arguments"; an explicit `null` is rejected.
    #[serde(default = "no_args")]
    args: Value,
}

fn no_args() -> Value {
    Value::Array(Vec::new())
}

/// Serves requests from `input` until EOF. Returns the number answered.
///
/// # Errors
/// - Returns I/O errors from reading `input` or writing `output`; malformed
///   requests are answered with an error envelope instead.
pub fn serve<R: BufRead, W: Write>(
    store: &PortfolioStore,
    mut input: R,
    mut output: W,
) -> std::io::Result<usize> {
    info!("event=serve module=ipc status=start");
    let mut answered = 0;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let envelope = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_line(store, line.trim_end_matches(['\n', '\r'])),
            Err(err) => reject_request(err.to_string()),
        };
        writeln!(output, "{}", envelope.to_line())?;
        output.flush()?;
        answered += 1;
    }

    info!("event=serve module=ipc status=ok answered={answered}");
    Ok(answered)
}

fn handle_line(store: &PortfolioStore, line: &str) -> Envelope {
    let request = match serde_json::from_str::<Request>(line) {
        Ok(request) => request,
        Err(err) => return reject_request(err.to_string()),
    };

    let name = request.operation.as_str();
    let result = args_from_value(name, request.args)
        .and_then(|args| bind_call(name, args))
        .and_then(|operation| run(store, &operation));
    finish(name, result)
}

fn reject_request(message: String) -> Envelope {
    debug!("event=serve_request module=ipc status=rejected error={message}");
    finish(
        "<request>",
        Err(DispatchError::InvalidArguments {
            operation: "<request>".to_string(),
            message,
        }),
    )
}
