//! Process-level dispatch boundary for the PIT host application.
//!
//! # Responsibility
//! - Turn `(operation name, JSON argument array)` into one store call.
//! - Answer with exactly one single-line JSON envelope per call.
//!
//! # Invariants
//! - Stdout carries envelopes only; diagnostics go through `log`.

pub mod dispatch;
pub mod envelope;
pub mod operation;
pub mod serve;

pub use dispatch::{DispatchError, Dispatcher};
pub use envelope::Envelope;
pub use operation::{BindError, Operation, OperationKind};
pub use serve::serve;
