//! Single-line JSON response envelope.
//!
//! # Invariants
//! - Serializes to an object with exactly one key: `data` or `error`.
//! - Rendering never fails; a fallback error line is used as a last resort.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const FALLBACK_LINE: &str = r#"{"error":"response could not be serialized"}"#;

/// Response for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    /// Successful result; may itself be `null`.
    Data(Value),
    /// Human-readable failure message.
    Error(String),
}

impl Envelope {
    pub fn data(value: Value) -> Self {
        Self::Data(value)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Renders the envelope as one JSON line without a trailing newline.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| FALLBACK_LINE.to_string())
    }
}

impl<E: std::fmt::Display> From<Result<Value, E>> for Envelope {
    fn from(result: Result<Value, E>) -> Self {
        match result {
            Ok(value) => Self::Data(value),
            Err(err) => Self::Error(err.to_string()),
        }
    }
}
