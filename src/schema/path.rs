//! Dotted-path resolution for targeted partial updates
//!
//! An update may address a nested field directly (`profile.username`)
//! without resupplying the whole parent object. Every non-final segment must
//! name an object property; the final segment names the leaf whose rules the
//! value is checked against.

use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use super::normalizer::{json_type_name, normalize_slot, Mode};
use super::types::{Document, Properties, Property, PropertyKind, Schema};
use crate::observability::{log_event_with_fields, Event, Fields};

/// Resolves `dotted_path` to its leaf descriptor and normalizes `value`
/// against it, as a single key in partial mode.
///
/// Returns `Ok(None)` when the leaf is optional and `value` is null with
/// nothing to substitute: the key should be dropped from the update.
///
/// # Errors
///
/// - unknown property: a segment names nothing at that level
/// - not an object: a non-final segment is not an object property
/// - any validation failure of `value` against the leaf
pub fn resolve_leaf(schema: &Schema, dotted_path: &str, value: &Value) -> SchemaResult<Option<Value>> {
    let leaf = find_leaf(schema.properties(), dotted_path)?;
    let normalized = normalize_slot(Some(value), leaf, dotted_path, Mode::Partial, schema.config())?;
    log_event_with_fields(Event::LeafResolved, Fields::new().path(dotted_path));
    Ok(normalized)
}

/// Walks the descriptor tree along `dotted_path`.
pub(crate) fn find_leaf<'a>(properties: &'a Properties, dotted_path: &str) -> SchemaResult<&'a Property> {
    let mut current = properties;
    let mut walked = String::with_capacity(dotted_path.len());
    let mut segments = dotted_path.split('.').peekable();

    while let Some(segment) = segments.next() {
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(segment);

        let prop = current
            .get(segment)
            .ok_or_else(|| SchemaError::unknown_property(walked.as_str()))?;

        if segments.peek().is_none() {
            return Ok(prop);
        }

        match &prop.kind {
            PropertyKind::Object { schema } => current = schema,
            _ => return Err(SchemaError::not_an_object(walked)),
        }
    }

    // split always yields at least one segment
    Err(SchemaError::unknown_property(dotted_path))
}

/// Normalizes an update whose keys may be dotted paths.
///
/// Plain keys are checked against the root property in partial mode; dotted
/// keys go through [`resolve_leaf`]. Keys are kept as given, and keys whose
/// value normalizes to nothing are dropped. Undeclared keys are always an
/// error here, whatever `reject_unknown_fields` says: an update cannot target
/// a field the schema does not have.
pub fn normalize_update(schema: &Schema, update: &Value) -> SchemaResult<Document> {
    let obj = update
        .as_object()
        .ok_or_else(|| SchemaError::type_mismatch("$root", "an object", json_type_name(update)))?;

    let mut out = Document::new();
    for (key, value) in obj {
        let normalized = if key.contains('.') {
            resolve_leaf(schema, key, value)
        } else {
            let prop = schema
                .get(key)
                .ok_or_else(|| SchemaError::unknown_property(key.as_str()));
            prop.and_then(|prop| normalize_slot(Some(value), prop, key, Mode::Partial, schema.config()))
        };

        match normalized {
            Ok(Some(value)) => {
                out.insert(key.clone(), value);
            }
            Ok(None) => {}
            Err(e) => {
                log_event_with_fields(
                    Event::DocumentRejected,
                    Fields::new().mode("update").path(e.path()).reason(e.reason()),
                );
                return Err(e);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> Schema {
        Schema::new([
            ("_id", Property::string().required().min_length(36).max_length(36)),
            (
                "profile",
                Property::object([
                    ("username", Property::string().required().unique().min_length(3).max_length(20)),
                    ("biography", Property::string().nullable().max_length(500)),
                    ("role", Property::string().default("user")),
                    (
                        "links",
                        Property::object([("site", Property::string()), ("clicks", Property::number())]),
                    ),
                ])
                .required(),
            ),
            ("tags", Property::array(Property::string())),
        ])
        .unwrap()
    }

    #[test]
    fn test_leaf_validates_value() {
        let schema = users();
        assert_eq!(
            resolve_leaf(&schema, "profile.username", &json!("alice")).unwrap(),
            Some(json!("alice"))
        );
        let err = resolve_leaf(&schema, "profile.username", &json!("ab")).unwrap_err();
        assert_eq!(err.path(), "profile.username");
        assert!(err.reason().contains("minimum length"));
    }

    #[test]
    fn test_unknown_leaf() {
        let err = resolve_leaf(&users(), "profile.unknown", &json!("x")).unwrap_err();
        assert_eq!(err.path(), "profile.unknown");
        assert!(err.reason().contains("not a known property"));
    }

    #[test]
    fn test_unknown_root_segment() {
        let err = resolve_leaf(&users(), "account.name", &json!("x")).unwrap_err();
        assert_eq!(err.path(), "account");
    }

    #[test]
    fn test_non_object_segment() {
        let err = resolve_leaf(&users(), "tags.first", &json!("x")).unwrap_err();
        assert_eq!(err.path(), "tags");
        assert!(err.reason().contains("not an object"));

        let err = resolve_leaf(&users(), "profile.role.name", &json!("x")).unwrap_err();
        assert_eq!(err.path(), "profile.role");
    }

    #[test]
    fn test_empty_segments() {
        assert!(resolve_leaf(&users(), "", &json!("x")).is_err());
        assert!(resolve_leaf(&users(), "profile..username", &json!("x")).is_err());
    }

    #[test]
    fn test_deep_leaf() {
        let schema = users();
        assert_eq!(
            resolve_leaf(&schema, "profile.links.clicks", &json!(0)).unwrap(),
            Some(json!(0))
        );
        assert!(resolve_leaf(&schema, "profile.links.clicks", &json!("0")).is_err());
    }

    #[test]
    fn test_null_leaf_rules() {
        let schema = users();
        assert_eq!(
            resolve_leaf(&schema, "profile.role", &Value::Null).unwrap(),
            Some(json!("user"))
        );
        assert_eq!(
            resolve_leaf(&schema, "profile.biography", &Value::Null).unwrap(),
            Some(Value::Null)
        );
        assert_eq!(resolve_leaf(&schema, "profile.links", &Value::Null).unwrap(), None);
        assert!(resolve_leaf(&schema, "profile.username", &Value::Null).is_err());
    }

    #[test]
    fn test_object_leaf_is_partial() {
        let out = resolve_leaf(&users(), "profile", &json!({ "biography": "hi" })).unwrap();
        assert_eq!(out, Some(json!({ "biography": "hi" })));
    }

    #[test]
    fn test_normalize_update_mixes_plain_and_dotted_keys() {
        let out = normalize_update(
            &users(),
            &json!({
                "profile.username": "bob",
                "profile.links.site": null,
                "tags": ["a", "b"]
            }),
        )
        .unwrap();
        assert_eq!(
            Value::Object(out),
            json!({ "profile.username": "bob", "tags": ["a", "b"] })
        );
    }

    #[test]
    fn test_normalize_update_rejects_first_bad_key() {
        let err = normalize_update(&users(), &json!({ "profile.username": "x" })).unwrap_err();
        assert_eq!(err.path(), "profile.username");

        let err = normalize_update(&users(), &json!({ "nope": 1 })).unwrap_err();
        assert_eq!(err.path(), "nope");
    }

    #[test]
    fn test_normalize_update_requires_object() {
        let err = normalize_update(&users(), &json!("text")).unwrap_err();
        assert_eq!(err.path(), "$root");
    }
}
