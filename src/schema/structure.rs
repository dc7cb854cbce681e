//! Construction-time structural checks
//!
//! Run once per schema, before it can be used:
//! - Bounds are finite and lower bounds never exceed upper bounds
//! - Nested object and array descriptors are themselves well-formed
//! - Defaults satisfy their own descriptor, and are stored normalized
//! - Nesting stays within `max_depth`
//!
//! Descriptors own their children, so a descriptor graph is always a tree.
//! The depth limit is what bounds recursion in every later operation.

use serde_json::Value;

use super::config::SchemaConfig;
use super::errors::{SchemaError, SchemaResult};
use super::normalizer::{self, make_path, Mode};
use super::types::{Properties, Property, PropertyKind};

/// Validates a whole property mapping. Root properties sit at depth 1.
pub(crate) fn validate_structure(
    properties: &mut Properties,
    config: &SchemaConfig,
) -> SchemaResult<()> {
    validate_properties(properties, "", 1, config)
}

fn validate_properties(
    properties: &mut Properties,
    prefix: &str,
    depth: usize,
    config: &SchemaConfig,
) -> SchemaResult<()> {
    for (name, prop) in properties.iter_mut() {
        validate_property(prop, &make_path(prefix, name), depth, config)?;
    }
    Ok(())
}

fn validate_property(
    prop: &mut Property,
    path: &str,
    depth: usize,
    config: &SchemaConfig,
) -> SchemaResult<()> {
    if depth > config.max_depth {
        return Err(SchemaError::structure(
            path,
            format!("nesting exceeds max_depth of {}", config.max_depth),
        ));
    }

    if let Some(misuse) = prop.misuse() {
        return Err(SchemaError::structure(path, misuse));
    }

    match &mut prop.kind {
        PropertyKind::String {
            min_length,
            max_length,
            ..
        } => {
            if let (Some(min), Some(max)) = (min_length, max_length) {
                if min > max {
                    return Err(SchemaError::structure(
                        path,
                        "maxLength must be greater than or equal to minLength",
                    ));
                }
            }
        }
        PropertyKind::Number { minimum, maximum } => {
            let finite = |bound: &Option<f64>| bound.map_or(true, f64::is_finite);
            if !finite(&*minimum) || !finite(&*maximum) {
                return Err(SchemaError::structure(path, "bounds must be finite numbers"));
            }
            if let (Some(min), Some(max)) = (minimum, maximum) {
                if min > max {
                    return Err(SchemaError::structure(
                        path,
                        "maximum must be greater than or equal to minimum",
                    ));
                }
            }
        }
        PropertyKind::Boolean => {}
        PropertyKind::Object { schema } => {
            validate_properties(schema, path, depth + 1, config)?;
        }
        PropertyKind::Array {
            element,
            minimum,
            maximum,
        } => {
            if let (Some(min), Some(max)) = (minimum, maximum) {
                if min > max {
                    return Err(SchemaError::structure(
                        path,
                        "maximum item count must be greater than or equal to minimum",
                    ));
                }
            }
            validate_property(element, &format!("{}[]", path), depth + 1, config)?;
        }
    }

    // Children are checked first so a default can be normalized against them
    if let Some(default) = &prop.default {
        let normalized = normalize_default(prop, default, path, config)?;
        prop.default = Some(normalized);
    }

    Ok(())
}

/// Returns the default in the form a full normalization pass would emit it.
fn normalize_default(
    prop: &Property,
    default: &Value,
    path: &str,
    config: &SchemaConfig,
) -> SchemaResult<Value> {
    if default.is_null() {
        if prop.nullable {
            return Ok(Value::Null);
        }
        return Err(SchemaError::structure(
            path,
            "default value cannot be null unless the property is nullable",
        ));
    }

    normalizer::normalize_value(default, prop, path, Mode::Full, config)
        .map_err(|e| SchemaError::structure(e.path(), format!("has an invalid default: {}", e.reason())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Pattern, Schema};
    use serde_json::json;

    #[test]
    fn test_valid_structure() {
        let schema = Schema::new([
            ("title", Property::string().min_length(5).max_length(5)),
            ("score", Property::number().minimum(1.0).maximum(1.0)),
            ("tags", Property::array(Property::string()).min_items(2).max_items(5)),
        ]);
        assert!(schema.is_ok());
    }

    #[test]
    fn test_inverted_string_bounds() {
        let err = Schema::new([("title", Property::string().min_length(10).max_length(5))])
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.path(), "title");
        assert!(err.reason().contains("maxLength"));
    }

    #[test]
    fn test_inverted_number_bounds() {
        let err = Schema::new([("score", Property::number().minimum(10.0).maximum(1.0))])
            .unwrap_err();
        assert!(err.reason().contains("maximum"));
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        assert!(Schema::new([("score", Property::number().minimum(f64::NAN))]).is_err());
        let err = Schema::new([("score", Property::number().maximum(f64::INFINITY))]).unwrap_err();
        assert_eq!(err.path(), "score");
        assert!(err.reason().contains("finite"));
        assert!(Schema::new([("score", Property::number().minimum(f64::NEG_INFINITY))]).is_err());
    }

    #[test]
    fn test_inverted_array_bounds() {
        let err = Schema::new([(
            "tags",
            Property::array(Property::string()).min_items(3).max_items(1),
        )])
        .unwrap_err();
        assert_eq!(err.path(), "tags");
    }

    #[test]
    fn test_nested_defect_reports_full_path() {
        let err = Schema::new([(
            "profile",
            Property::object([(
                "name",
                Property::string().min_length(4).max_length(2),
            )]),
        )])
        .unwrap_err();
        assert_eq!(err.path(), "profile.name");
    }

    #[test]
    fn test_array_element_defect() {
        let err = Schema::new([(
            "tags",
            Property::array(Property::number().minimum(5.0).maximum(1.0)),
        )])
        .unwrap_err();
        assert_eq!(err.path(), "tags[]");
    }

    #[test]
    fn test_invalid_default_rejected() {
        let err = Schema::new([("role", Property::string().min_length(5).default("usr"))])
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(err.reason().contains("default"));

        assert!(Schema::new([("count", Property::number().default("zero"))]).is_err());
        let pattern = Pattern::new("^[a-z]+$").unwrap();
        assert!(Schema::new([("slug", Property::string().pattern(pattern).default("A-1"))]).is_err());
    }

    #[test]
    fn test_null_default_requires_nullable() {
        assert!(Schema::new([("bio", Property::string().default(Value::Null))]).is_err());
        assert!(Schema::new([("bio", Property::string().nullable().default(Value::Null))]).is_ok());
    }

    #[test]
    fn test_object_default_checked_recursively() {
        let address = || {
            Property::object([
                ("city", Property::string().required()),
                ("zip", Property::string().default("00000")),
            ])
        };
        assert!(Schema::new([("address", address().default(json!({"city": "Oslo"})))]).is_ok());
        let err = Schema::new([("address", address().default(json!({"zip": "12345"})))])
            .unwrap_err();
        assert_eq!(err.path(), "address.city");
    }

    #[test]
    fn test_array_default_checked() {
        let tags = || Property::array(Property::number().minimum(1.0)).max_items(2);
        assert!(Schema::new([("tags", tags().default(json!([1, 2])))]).is_ok());
        assert!(Schema::new([("tags", tags().default(json!([1, 2, 3])))]).is_err());
        assert!(Schema::new([("tags", tags().default(json!([0])))]).is_err());
    }

    #[test]
    fn test_object_default_stored_normalized() {
        let schema = Schema::new([(
            "address",
            Property::object([
                ("city", Property::string().required()),
                ("zip", Property::string().default("00000")),
            ])
            .default(json!({ "city": "Oslo", "stray": 1 })),
        )])
        .unwrap();
        assert_eq!(
            schema.get("address").unwrap().default,
            Some(json!({ "city": "Oslo", "zip": "00000" }))
        );
    }

    #[test]
    fn test_array_default_stored_normalized() {
        let schema = Schema::new([(
            "xs",
            Property::array(Property::number().default(7)).default(json!([null, 2])),
        )])
        .unwrap();
        assert_eq!(schema.get("xs").unwrap().default, Some(json!([7, 2])));
    }

    #[test]
    fn test_depth_limit() {
        let config = SchemaConfig::default().with_max_depth(2);
        let two_levels = [("a", Property::object([("b", Property::string())]))];
        assert!(Schema::with_config(two_levels, config.clone()).is_ok());

        let three_levels = [(
            "a",
            Property::object([("b", Property::object([("c", Property::string())]))]),
        )];
        let err = Schema::with_config(three_levels, config.clone()).unwrap_err();
        assert_eq!(err.path(), "a.b.c");

        let nested_arrays = [("m", Property::array(Property::array(Property::number())))];
        let err = Schema::with_config(nested_arrays, config).unwrap_err();
        assert_eq!(err.path(), "m[][]");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SchemaConfig::default().with_max_depth(0);
        assert!(Schema::with_config([("a", Property::string())], config).is_err());
    }
}
