//! Portfolio domain model.
//!
//! # Responsibility
//! - Define the value records exchanged with repository callers.
//! - Validate write inputs before they reach SQL.
//!
//! # Invariants
//! - Records are snapshots; mutating one never touches the store.
//! - Identity is the store-generated integer `id`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod asset;
pub mod transaction;

/// Input rejected before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// A required text field is empty or whitespace-only.
    BlankField {
        entity: &'static str,
        field: &'static str,
    },
    /// A numeric field is NaN or infinite.
    NonFiniteNumber {
        entity: &'static str,
        field: &'static str,
    },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { entity, field } => {
                write!(f, "{entity}.{field} must not be blank")
            }
            Self::NonFiniteNumber { entity, field } => {
                write!(f, "{entity}.{field} must be a finite number")
            }
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::BlankField { entity, field });
    }
    Ok(())
}

pub(crate) fn require_finite(
    entity: &'static str,
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ModelValidationError> {
    match value {
        Some(number) if !number.is_finite() => {
            Err(ModelValidationError::NonFiniteNumber { entity, field })
        }
        _ => Ok(()),
    }
}

/// Maps blank optional text to `None` so it is stored as SQL NULL.
pub(crate) fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
