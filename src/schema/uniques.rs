//! Unique path extraction
//!
//! Collects the dotted paths flagged `unique`, in declaration order, so the
//! storage layer can build its uniqueness indexes. The configured identity
//! field at the root is skipped: the storage layer already keeps it unique.
//! Flags inside array elements are not extracted.

use serde::{Deserialize, Serialize};

use super::normalizer::make_path;
use super::types::{Properties, PropertyKind, Schema};
use crate::observability::{log_event_with_fields, Event, Fields};

/// One uniqueness index the storage layer should build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueIndexSpec {
    /// Dotted path of the indexed field
    pub path: String,
    /// Index direction, always ascending
    pub ascending: bool,
}

/// Returns every unique dotted path in declaration order.
pub fn list_unique_keys(schema: &Schema) -> Vec<String> {
    let mut keys = Vec::new();
    collect(
        schema.properties(),
        "",
        Some(schema.config().identity_field.as_str()),
        &mut keys,
    );
    log_event_with_fields(Event::UniqueKeysListed, Fields::new().count(keys.len()));
    keys
}

/// Index specifications in the same order as [`list_unique_keys`].
pub fn unique_index_specs(schema: &Schema) -> Vec<UniqueIndexSpec> {
    list_unique_keys(schema)
        .into_iter()
        .map(|path| UniqueIndexSpec {
            path,
            ascending: true,
        })
        .collect()
}

fn collect(properties: &Properties, prefix: &str, identity: Option<&str>, out: &mut Vec<String>) {
    for (name, prop) in properties {
        let path = make_path(prefix, name);
        if prop.unique && identity != Some(name.as_str()) {
            out.push(path.clone());
        }
        if let PropertyKind::Object { schema } = &prop.kind {
            collect(schema, &path, None, out);
        }
    }
}
