//! Declarative validation document compiler
//!
//! Derives a JSON-Schema-like document from the descriptor tree, for
//! installation in an external validating store. Output is pure data, and the
//! same tree always yields the same bytes: properties keep declaration order
//! and no map in the output is unordered.

use serde_json::{Map, Number, Value};

use super::types::{Properties, Property, PropertyKind, Schema};
use crate::observability::{log_event_with_fields, Event, Fields};

/// Compiles `schema` to its declarative validation document.
///
/// The root node has the shape
/// `{"type": "object", "properties": {...}, "required": [...]}`.
pub fn compile(schema: &Schema) -> Value {
    let root = object_node(Value::from("object"), schema.properties());
    log_event_with_fields(Event::SchemaCompiled, Fields::new().count(schema.len()));
    Value::Object(root)
}

/// Compiled document as compact JSON text, stable across calls.
pub fn compile_to_string(schema: &Schema) -> String {
    compile(schema).to_string()
}

fn object_node(type_value: Value, properties: &Properties) -> Map<String, Value> {
    let mut compiled = Map::new();
    let mut required = Vec::new();

    for (name, prop) in properties {
        if prop.required {
            required.push(Value::String(name.clone()));
        }
        compiled.insert(name.clone(), Value::Object(compile_property(prop)));
    }

    let mut node = Map::new();
    node.insert("type".into(), type_value);
    node.insert("properties".into(), Value::Object(compiled));
    node.insert("required".into(), Value::Array(required));
    node
}

fn compile_property(prop: &Property) -> Map<String, Value> {
    let type_value = type_of(prop);

    match &prop.kind {
        PropertyKind::Object { schema } => object_node(type_value, schema),
        PropertyKind::String {
            min_length,
            max_length,
            ..
        } => {
            let mut node = Map::new();
            node.insert("type".into(), type_value);
            if let Some(min) = min_length {
                node.insert("minLength".into(), Value::from(*min));
            }
            if let Some(max) = max_length {
                node.insert("maxLength".into(), Value::from(*max));
            }
            node
        }
        PropertyKind::Number { minimum, maximum } => {
            let mut node = Map::new();
            node.insert("type".into(), type_value);
            if let Some(min) = minimum.and_then(number) {
                node.insert("minimum".into(), min);
            }
            if let Some(max) = maximum.and_then(number) {
                node.insert("maximum".into(), max);
            }
            node
        }
        PropertyKind::Boolean => {
            let mut node = Map::new();
            node.insert("type".into(), type_value);
            node
        }
        PropertyKind::Array {
            element,
            minimum,
            maximum,
        } => {
            let mut node = Map::new();
            node.insert("type".into(), type_value);
            node.insert("items".into(), Value::Object(compile_property(element)));
            if let Some(min) = minimum {
                node.insert("minItems".into(), Value::from(*min));
            }
            if let Some(max) = maximum {
                node.insert("maxItems".into(), Value::from(*max));
            }
            node
        }
    }
}

/// Scalar type, or `[type, "null"]` when nullable.
fn type_of(prop: &Property) -> Value {
    let name = prop.type_name();
    if prop.nullable {
        Value::Array(vec![Value::from(name), Value::from("null")])
    } else {
        Value::from(name)
    }
}

/// Largest magnitude below which every whole `f64` is an exact integer.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Whole bounds are emitted as integers so `5.0` reads as `5`.
///
/// `None` only for non-finite input, which schema construction rejects; an
/// unbounded side is simply left out.
fn number(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() < EXACT_INTEGER_LIMIT {
        Some(Value::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number)
    }
}
