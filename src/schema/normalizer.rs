//! Document validation and normalization
//!
//! Absence rules, applied when a value is missing or null:
//! 1. a default wins, even over `nullable`
//! 2. otherwise a nullable property becomes null
//! 3. otherwise a required property fails
//! 4. otherwise the key is left out of the output
//!
//! Only a missing key or JSON null counts as absent. `0`, `false` and `""`
//! are present values.
//!
//! Validation is fail-fast and never mutates its input.

use serde_json::Value;

use super::config::SchemaConfig;
use super::errors::{SchemaError, SchemaResult};
use super::types::{Document, Properties, Property, PropertyKind, Schema};
use crate::observability::{log_event_with_fields, Event, Fields};

/// Which properties a normalization pass visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Every declared property; required and default rules apply to absent keys
    #[default]
    Full,
    /// Only keys present in the input; omitted fields are left untouched
    Partial,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Full => "full",
            Mode::Partial => "partial",
        }
    }
}

/// Validates `document` against `schema` and returns the normalized copy.
///
/// # Errors
///
/// Returns a validation error carrying the dotted path of the first
/// offending property.
pub fn normalize(schema: &Schema, document: &Value, mode: Mode) -> SchemaResult<Document> {
    let result = document
        .as_object()
        .ok_or_else(|| SchemaError::type_mismatch("$root", "an object", json_type_name(document)))
        .and_then(|obj| normalize_object(schema.properties(), obj, "", mode, schema.config()));

    match &result {
        Ok(out) => log_event_with_fields(
            Event::DocumentNormalized,
            Fields::new().mode(mode.as_str()).count(out.len()),
        ),
        Err(e) => log_event_with_fields(
            Event::DocumentRejected,
            Fields::new().mode(mode.as_str()).path(e.path()).reason(e.reason()),
        ),
    }
    result
}

/// Normalizes one mapping against its property declarations.
pub(crate) fn normalize_object(
    properties: &Properties,
    obj: &Document,
    prefix: &str,
    mode: Mode,
    config: &SchemaConfig,
) -> SchemaResult<Document> {
    let mut out = Document::new();

    match mode {
        Mode::Full => {
            if config.reject_unknown_fields {
                if let Some(key) = obj.keys().find(|key| !properties.contains_key(*key)) {
                    return Err(SchemaError::unknown_property(make_path(prefix, key)));
                }
            }
            for (name, prop) in properties {
                let path = make_path(prefix, name);
                if let Some(value) = normalize_slot(obj.get(name), prop, &path, mode, config)? {
                    out.insert(name.clone(), value);
                }
            }
        }
        Mode::Partial => {
            for (key, value) in obj {
                let path = make_path(prefix, key);
                let Some(prop) = properties.get(key) else {
                    if config.reject_unknown_fields {
                        return Err(SchemaError::unknown_property(path));
                    }
                    continue;
                };
                if let Some(value) = normalize_slot(Some(value), prop, &path, mode, config)? {
                    out.insert(key.clone(), value);
                }
            }
        }
    }

    Ok(out)
}

/// Normalizes a possibly absent value. `None` means "drop the key".
pub(crate) fn normalize_slot(
    value: Option<&Value>,
    prop: &Property,
    path: &str,
    mode: Mode,
    config: &SchemaConfig,
) -> SchemaResult<Option<Value>> {
    match value {
        None | Some(Value::Null) => absent(prop, path),
        Some(value) => normalize_value(value, prop, path, mode, config).map(Some),
    }
}

/// Defaults were normalized when the schema was built, so they are emitted as is.
fn absent(prop: &Property, path: &str) -> SchemaResult<Option<Value>> {
    if let Some(default) = &prop.default {
        return Ok(Some(default.clone()));
    }
    if prop.nullable {
        return Ok(Some(Value::Null));
    }
    if prop.required {
        return Err(SchemaError::required_missing(path));
    }
    Ok(None)
}

/// Validates a present, non-null value and returns its normalized form.
pub(crate) fn normalize_value(
    value: &Value,
    prop: &Property,
    path: &str,
    mode: Mode,
    config: &SchemaConfig,
) -> SchemaResult<Value> {
    match &prop.kind {
        PropertyKind::String {
            min_length,
            max_length,
            pattern,
        } => {
            let text = value
                .as_str()
                .ok_or_else(|| SchemaError::type_mismatch(path, "a string", json_type_name(value)))?;
            let length = text.chars().count();
            if let Some(min) = min_length {
                if length < *min {
                    return Err(SchemaError::validation(
                        path,
                        format!("must have a minimum length of {}", min),
                    ));
                }
            }
            if let Some(max) = max_length {
                if length > *max {
                    return Err(SchemaError::validation(
                        path,
                        format!("must have a maximum length of {}", max),
                    ));
                }
            }
            if let Some(pattern) = pattern {
                if !pattern.is_match(text) {
                    return Err(SchemaError::validation(
                        path,
                        format!("must match the pattern {}", pattern),
                    ));
                }
            }
            Ok(value.clone())
        }
        PropertyKind::Number { minimum, maximum } => {
            let number = value
                .as_f64()
                .ok_or_else(|| SchemaError::type_mismatch(path, "a number", json_type_name(value)))?;
            if let Some(min) = minimum {
                if number < *min {
                    return Err(SchemaError::validation(
                        path,
                        format!("must be greater than or equal to {}", min),
                    ));
                }
            }
            if let Some(max) = maximum {
                if number > *max {
                    return Err(SchemaError::validation(
                        path,
                        format!("must be less than or equal to {}", max),
                    ));
                }
            }
            Ok(value.clone())
        }
        PropertyKind::Boolean => {
            if !value.is_boolean() {
                return Err(SchemaError::type_mismatch(path, "a boolean", json_type_name(value)));
            }
            Ok(value.clone())
        }
        PropertyKind::Array {
            element,
            minimum,
            maximum,
        } => {
            let items = value
                .as_array()
                .ok_or_else(|| SchemaError::type_mismatch(path, "an array", json_type_name(value)))?;
            if let Some(min) = minimum {
                if items.len() < *min {
                    return Err(SchemaError::validation(
                        path,
                        format!("must have at least {} items", min),
                    ));
                }
            }
            if let Some(max) = maximum {
                if items.len() > *max {
                    return Err(SchemaError::validation(
                        path,
                        format!("must have at most {} items", max),
                    ));
                }
            }

            // Elements are always replaced wholesale, so they normalize in full mode
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let elem_path = format!("{}[{}]", path, i);
                    if item.is_null() {
                        absent_element(element, &elem_path)
                    } else {
                        normalize_value(item, element, &elem_path, Mode::Full, config)
                    }
                })
                .collect::<SchemaResult<Vec<_>>>()
                .map(Value::Array)
        }
        PropertyKind::Object { schema } => {
            let obj = value
                .as_object()
                .ok_or_else(|| SchemaError::type_mismatch(path, "an object", json_type_name(value)))?;
            normalize_object(schema, obj, path, mode, config).map(Value::Object)
        }
    }
}

/// An element slot cannot be omitted, so an element is implicitly required.
fn absent_element(element: &Property, path: &str) -> SchemaResult<Value> {
    if let Some(default) = &element.default {
        return Ok(default.clone());
    }
    if element.nullable {
        return Ok(Value::Null);
    }
    Err(SchemaError::required_missing(path))
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a field path from prefix and field name.
pub(crate) fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
