//! Schema error types
//!
//! Error codes:
//! - DOC_SCHEMA_STRUCTURE_INVALID (FATAL)
//! - DOC_SCHEMA_VALIDATION_FAILED (REJECT)
//!
//! Structural errors are raised only while a schema is being built and mean
//! the declaration itself is broken. Validation errors are raised per call
//! and only ever reject the offending document.

use std::fmt;

use thiserror::Error;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The single operation is rejected, the caller carries on
    Reject,
    /// Configuration defect, the process must not start serving
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Machine readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Descriptor tree is self-contradictory or malformed
    DocSchemaStructureInvalid,
    /// Document or value violates the schema
    DocSchemaValidationFailed,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::DocSchemaStructureInvalid => "DOC_SCHEMA_STRUCTURE_INVALID",
            SchemaErrorCode::DocSchemaValidationFailed => "DOC_SCHEMA_VALIDATION_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::DocSchemaStructureInvalid => Severity::Fatal,
            SchemaErrorCode::DocSchemaValidationFailed => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with the dotted path of the offending property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Raised during schema construction
    #[error("[FATAL] DOC_SCHEMA_STRUCTURE_INVALID: {}", describe(.path, .reason))]
    Structure { path: String, reason: String },

    /// Raised while normalizing a document or resolving a leaf
    #[error("[REJECT] DOC_SCHEMA_VALIDATION_FAILED: {}", describe(.path, .reason))]
    Validation { path: String, reason: String },
}

fn describe(path: &str, reason: &str) -> String {
    if path.is_empty() {
        reason.to_string()
    } else {
        format!("property '{}' {}", path, reason)
    }
}

impl SchemaError {
    /// Create a structural error
    pub fn structure(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Structure {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a validation error
    pub fn validation(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Validation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Required property absent with nothing to fall back on
    pub fn required_missing(path: impl Into<String>) -> Self {
        Self::validation(path, "is required but not provided")
    }

    /// Value has the wrong JSON type
    pub fn type_mismatch(path: impl Into<String>, expected: &str, actual: &str) -> Self {
        Self::validation(path, format!("must be {}, got {}", expected, actual))
    }

    /// Path segment names no declared property
    pub fn unknown_property(path: impl Into<String>) -> Self {
        Self::validation(path, "is not a known property")
    }

    /// Non-final path segment is not an object descriptor
    pub fn not_an_object(path: impl Into<String>) -> Self {
        Self::validation(path, "is not an object")
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        match self {
            SchemaError::Structure { .. } => SchemaErrorCode::DocSchemaStructureInvalid,
            SchemaError::Validation { .. } => SchemaErrorCode::DocSchemaValidationFailed,
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code().severity()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Dotted path of the offending property
    pub fn path(&self) -> &str {
        match self {
            SchemaError::Structure { path, .. } | SchemaError::Validation { path, .. } => path,
        }
    }

    /// Human-readable reason
    pub fn reason(&self) -> &str {
        match self {
            SchemaError::Structure { reason, .. } | SchemaError::Validation { reason, .. } => {
                reason
            }
        }
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
