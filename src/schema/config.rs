//! Schema engine configuration
//!
//! Fixed when a schema is built and immutable afterwards.

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};

/// Knobs shared by every operation on one schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Root field the storage layer already keeps unique (default: "_id")
    #[serde(default = "default_identity_field")]
    pub identity_field: String,

    /// Deepest Object/Array nesting accepted at construction (default: 32)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Reject undeclared document keys instead of dropping them (default: false)
    #[serde(default)]
    pub reject_unknown_fields: bool,
}

fn default_identity_field() -> String {
    "_id".to_string()
}

fn default_max_depth() -> usize {
    32
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            identity_field: default_identity_field(),
            max_depth: default_max_depth(),
            reject_unknown_fields: false,
        }
    }
}

impl SchemaConfig {
    /// Config that refuses undeclared keys
    pub fn strict() -> Self {
        Self {
            reject_unknown_fields: true,
            ..Default::default()
        }
    }

    /// Same config with a different depth limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Same config with a different identity field
    pub fn with_identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = field.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SchemaResult<()> {
        if self.max_depth == 0 {
            return Err(SchemaError::structure("", "max_depth must be at least 1"));
        }
        if self.identity_field.is_empty() {
            return Err(SchemaError::structure(
                "",
                "identity_field must not be empty",
            ));
        }
        Ok(())
    }
}
