//! docschema - declare a document's shape once, derive the rest
//!
//! One declaration yields validated documents, a declarative validation
//! document for an external store, and the unique paths it must index.

pub mod observability;
pub mod schema;

pub use schema::{
    compile, compile_to_string, list_unique_keys, normalize, normalize_update, resolve_leaf,
    unique_index_specs, validation_messages, Document, Mode, Pattern, Properties, Property,
    PropertyKind, Schema, SchemaConfig, SchemaError, SchemaErrorCode, SchemaResult, Severity,
    UniqueIndexSpec,
};
