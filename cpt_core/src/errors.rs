//! # Error Types
//!
//! Structured error types for cpt_core. Validation failures are fatal to the
//! single computation that raised them and bubble up to the caller, which
//! decides whether to skip the sounding or abort the batch.
//!
//! Degenerate-but-defined inputs (zero friction angle, zero raw resistance,
//! no water table) are never errors: the computations handle them with
//! explicit branches.
//!
//! ## Example
//!
//! ```rust
//! use cpt_core::errors::{CptError, CptResult};
//!
//! fn validate_alpha(alpha: f64) -> CptResult<()> {
//!     if alpha <= 0.0 {
//!         return Err(CptError::invalid_input(
//!             "safety_coefficient",
//!             alpha.to_string(),
//!             "Safety coefficient must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_alpha(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for cpt_core operations
pub type CptResult<T> = Result<T, CptError>;

/// Structured error type for CPT processing.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CptError {
    /// An input value is invalid (non-positive, out of range, not finite)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// An input series or table holds no rows
    #[error("Empty input: {what}")]
    EmptyInput { what: String },

    /// A requested column index does not exist in the table
    #[error("Column index {index} out of range (table has {column_count} columns)")]
    ColumnOutOfRange { index: usize, column_count: usize },

    /// A raw unit label is not one of the supported units
    #[error("Unknown {quantity} unit: '{unit}'")]
    UnknownUnit { quantity: String, unit: String },

    /// A bearing-capacity method label is not recognized (strict parsing only)
    #[error("Unknown bearing capacity method: '{label}'")]
    UnknownMethod { label: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Job file schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CptError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CptError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an EmptyInput error
    pub fn empty_input(what: impl Into<String>) -> Self {
        CptError::EmptyInput { what: what.into() }
    }

    /// Create an UnknownUnit error
    pub fn unknown_unit(quantity: impl Into<String>, unit: impl Into<String>) -> Self {
        CptError::UnknownUnit {
            quantity: quantity.into(),
            unit: unit.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CptError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CptError::SerializationError { reason: reason.into() }
    }

    /// Validation errors are raised by the computational core itself
    /// (as opposed to I/O around it).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CptError::InvalidInput { .. }
                | CptError::EmptyInput { .. }
                | CptError::ColumnOutOfRange { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CptError::InvalidInput { .. } => "INVALID_INPUT",
            CptError::EmptyInput { .. } => "EMPTY_INPUT",
            CptError::ColumnOutOfRange { .. } => "COLUMN_OUT_OF_RANGE",
            CptError::UnknownUnit { .. } => "UNKNOWN_UNIT",
            CptError::UnknownMethod { .. } => "UNKNOWN_METHOD",
            CptError::FileError { .. } => "FILE_ERROR",
            CptError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CptError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

/// Check that a scalar is finite and strictly positive.
pub(crate) fn require_positive(field: &str, value: f64) -> CptResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CptError::invalid_input(
            field,
            value.to_string(),
            "Must be a positive finite number",
        ));
    }
    Ok(())
}
