//! Schema subsystem
//!
//! A schema is declared once, in code, as a tree of typed and constrained
//! property descriptors. Everything else is derived from that declaration:
//!
//! - normalized documents ready for storage ([`normalize`])
//! - single-field values for dotted-path updates ([`resolve_leaf`])
//! - a declarative validation document for an external store ([`compile`])
//! - the unique paths the store must index ([`list_unique_keys`])
//!
//! # Design Principles
//!
//! - Structural invariants are enforced at construction, never later
//! - Built schemas are immutable and shareable across threads
//! - Every operation is pure and allocates its own output
//! - Validation is fail-fast and reports a dotted path

mod compiler;
mod config;
mod errors;
mod normalizer;
mod path;
mod report;
mod structure;
mod types;
mod uniques;

pub use compiler::{compile, compile_to_string};
pub use config::SchemaConfig;
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use normalizer::{normalize, Mode};
pub use path::{normalize_update, resolve_leaf};
pub use report::validation_messages;
pub use types::{Document, Pattern, Properties, Property, PropertyKind, Schema};
pub use uniques::{list_unique_keys, unique_index_specs, UniqueIndexSpec};
