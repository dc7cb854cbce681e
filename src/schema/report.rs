//! Validator failure report flattening
//!
//! When the external store refuses a write with the compiled validation
//! document, it answers with a tree of failed rules. This module turns that
//! tree into one readable line per failed rule, keyed by dotted path.

use serde_json::Value;

/// Flattens a rule-failure report into messages.
///
/// Accepts the store's error info (`{"details": {...}}`), the details object
/// itself (`{"operatorName": "$jsonSchema", "schemaRulesNotSatisfied": [...]}`)
/// or a bare rule list. Entries that do not look like rules are skipped.
pub fn validation_messages(report: &Value) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(rules) = rules_of(report) {
        flatten(rules, "", &mut out);
    }
    out
}

fn rules_of(report: &Value) -> Option<&[Value]> {
    match report {
        Value::Array(rules) => Some(rules),
        Value::Object(obj) => {
            if let Some(rules) = obj.get("schemaRulesNotSatisfied") {
                return rules.as_array().map(Vec::as_slice);
            }
            obj.get("details").and_then(rules_of)
        }
        _ => None,
    }
}

fn flatten(rules: &[Value], parent: &str, out: &mut Vec<String>) {
    for rule in rules {
        let Some(operator) = rule.get("operatorName").and_then(Value::as_str) else {
            continue;
        };

        match operator {
            "properties" => {
                let entries = rule
                    .get("propertiesNotSatisfied")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                for entry in entries {
                    let Some(name) = entry.get("propertyName").and_then(Value::as_str) else {
                        continue;
                    };
                    let path = if parent.is_empty() {
                        name.to_string()
                    } else {
                        format!("{}.{}", parent, name)
                    };
                    flatten(details(entry), &path, out);
                }
            }
            "items" => {
                let index = rule.get("itemIndex").map(text).unwrap_or_default();
                flatten(details(rule), &format!("{}[{}]", parent, index), out);
            }
            "minLength" | "maxLength" => {
                let (label, bound) = if operator == "minLength" {
                    ("min", specified(rule, "minLength"))
                } else {
                    ("max", specified(rule, "maxLength"))
                };
                out.push(format!(
                    "{}: {} - {} length: {} - {}",
                    parent,
                    field(rule, "reason"),
                    label,
                    bound,
                    field(rule, "consideredValue")
                ));
            }
            "minimum" | "maximum" => {
                let (label, bound) = if operator == "minimum" {
                    ("min", specified(rule, "minimum"))
                } else {
                    ("max", specified(rule, "maximum"))
                };
                out.push(format!(
                    "{}: {} - {} value: {} - {}",
                    parent,
                    field(rule, "reason"),
                    label,
                    bound,
                    field(rule, "consideredValue")
                ));
            }
            "type" => {
                out.push(format!(
                    "{}: {} - type: {} - {}: {}",
                    parent,
                    field(rule, "reason"),
                    specified(rule, "type"),
                    field(rule, "consideredValue"),
                    field(rule, "consideredType")
                ));
            }
            other => {
                out.push(format!("{}: {} - {}", parent, other, field(rule, "consideredValue")));
            }
        }
    }
}

fn details(rule: &Value) -> &[Value] {
    rule.get("details")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn field(rule: &Value, key: &str) -> String {
    rule.get(key).map(text).unwrap_or_default()
}

fn specified(rule: &Value, key: &str) -> String {
    rule.get("specifiedAs")
        .and_then(|s| s.get(key))
        .map(text)
        .unwrap_or_default()
}

/// Strings print bare, everything else as JSON.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
