//! # Error Types
//!
//! Structured error types for hydro_core. A `CalcError` is only raised for
//! structurally invalid input (empty paths, negative dimensions, impossible
//! counts). Numerically degenerate but valid input (zero flow, unknown fixture
//! names) is never an error: it produces neutral values plus a
//! [`Warning`](crate::report::Warning) in the module report.
//!
//! ## Example
//!
//! ```rust
//! use hydro_core::errors::{CalcError, CalcResult};
//!
//! fn validate_length(length_m: f64) -> CalcResult<()> {
//!     if length_m < 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "real_length_m",
//!             length_m.to_string(),
//!             "Length cannot be negative",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_length(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for hydro_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for sizing operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, negative, empty collection)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A catalog lookup that must succeed did not
    #[error("Catalog entry not found in {catalog}: {key}")]
    CatalogEntryNotFound { catalog: String, key: String },

    /// A project document that is not valid JSON for the configuration schema
    #[error("Invalid project document: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a CatalogEntryNotFound error
    pub fn catalog_entry_not_found(catalog: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::CatalogEntryNotFound {
            catalog: catalog.into(),
            key: key.into(),
        }
    }

    /// Prefix the field of an `InvalidInput` error with a parent path,
    /// so nested validation reports `cold_water.paths[0].segments[2].real_length_m`.
    pub fn within(self, parent: impl AsRef<str>) -> Self {
        let parent = parent.as_ref();
        match self {
            CalcError::InvalidInput { field, value, reason } => CalcError::InvalidInput {
                field: format!("{}.{}", parent, field),
                value,
                reason,
            },
            other => other,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::CatalogEntryNotFound { .. } => "CATALOG_ENTRY_NOT_FOUND",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: err.to_string(),
        }
    }
}

/// Reject negative values.
pub(crate) fn non_negative(field: &str, value: f64) -> CalcResult<()> {
    if value < 0.0 || value.is_nan() {
        return Err(CalcError::invalid_input(field, value.to_string(), "Cannot be negative"));
    }
    Ok(())
}

/// Reject zero, negative and NaN values.
pub(crate) fn positive(field: &str, value: f64) -> CalcResult<()> {
    if value <= 0.0 || value.is_nan() {
        return Err(CalcError::invalid_input(field, value.to_string(), "Must be positive"));
    }
    Ok(())
}

/// Reject a zero count that something is divided by.
pub(crate) fn at_least_one(field: &str, count: u32) -> CalcResult<()> {
    if count == 0 {
        return Err(CalcError::invalid_input(field, "0", "At least one is required"));
    }
    Ok(())
}

/// Require a percentage in (0, 100].
pub(crate) fn percentage(field: &str, value: f64) -> CalcResult<()> {
    if !(value > 0.0 && value <= 100.0) {
        return Err(CalcError::invalid_input(field, value.to_string(), "Must be within (0, 100] %"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("real_length_m", "-5.0", "Cannot be negative");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
        assert!(json.contains("\"type\":\"InvalidInput\""));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::from(serde_json::from_str::<u32>("x").unwrap_err()).error_code(), "SERIALIZATION_ERROR");
        assert_eq!(
            CalcError::catalog_entry_not_found("pumps", "X-1").error_code(),
            "CATALOG_ENTRY_NOT_FOUND"
        );
    }

    #[test]
    fn test_within_prefixes_field() {
        let err = CalcError::invalid_input("real_length_m", "-1", "Cannot be negative")
            .within("segments[2]")
            .within("paths[0]");
        match err {
            CalcError::InvalidInput { field, .. } => assert_eq!(field, "paths[0].segments[2].real_length_m"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_validators() {
        assert!(non_negative("x", 0.0).is_ok());
        assert!(at_least_one("stack_count", 0).is_err());
        assert!(at_least_one("stack_count", 2).is_ok());
        assert!(non_negative("x", -0.1).is_err());
        assert!(positive("x", 0.0).is_err());
        assert!(percentage("x", 100.0).is_ok());
        assert!(percentage("x", 0.0).is_err());
        assert!(percentage("x", 101.0).is_err());
    }
}
