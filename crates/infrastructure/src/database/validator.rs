//! A small `$jsonSchema` subset: `required`, and per-property `bsonType`,
//! `minLength`, `maxLength`, `minimum`, `pattern` and array `items`.

use regex::Regex;
use serde_json::{Map, Value};

use super::document::Document;

pub fn validate_document(validator: &Value, document: &Document) -> Result<(), String> {
    let schema = validator.get("$jsonSchema").unwrap_or(validator);
    validate_object(schema, document, "")
}

fn validate_object(schema: &Value, object: &Map<String, Value>, path: &str) -> Result<(), String> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(field) {
                return Err(format!("missing required field '{}{}'", path, field));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (field, rules) in properties {
            // Null counts as absent for optional fields
            if let Some(value) = object.get(field).filter(|v| !v.is_null()) {
                validate_value(rules, value, &format!("{}{}", path, field))?;
            }
        }
    }

    Ok(())
}

fn validate_value(rules: &Value, value: &Value, field: &str) -> Result<(), String> {
    if let Some(expected) = rules.get("bsonType") {
        let allowed: Vec<&str> = match expected {
            Value::String(name) => vec![name.as_str()],
            Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        if !allowed.is_empty() && !allowed.iter().any(|name| has_bson_type(value, name)) {
            return Err(format!("field '{}' must be of type {}", field, allowed.join("|")));
        }
    }

    if let Value::String(text) = value {
        let length = text.chars().count() as u64;
        if let Some(min) = rules.get("minLength").and_then(Value::as_u64) {
            if length < min {
                return Err(format!("field '{}' is shorter than {} characters", field, min));
            }
        }
        if let Some(max) = rules.get("maxLength").and_then(Value::as_u64) {
            if length > max {
                return Err(format!("field '{}' is longer than {} characters", field, max));
            }
        }
        if let Some(pattern) = rules.get("pattern").and_then(Value::as_str) {
            let regex = Regex::new(pattern)
                .map_err(|e| format!("invalid pattern for '{}': {}", field, e))?;
            if !regex.is_match(text) {
                return Err(format!("field '{}' does not match {}", field, pattern));
            }
        }
    }

    if let (Some(minimum), Some(number)) = (rules.get("minimum").and_then(Value::as_f64), value.as_f64()) {
        if number < minimum {
            return Err(format!("field '{}' must be at least {}", field, minimum));
        }
    }

    if let (Some(items), Value::Array(values)) = (rules.get("items"), value) {
        for (position, item) in values.iter().enumerate() {
            validate_value(items, item, &format!("{}[{}]", field, position))?;
        }
    }

    if let Value::Object(nested) = value {
        validate_object(rules, nested, &format!("{}.", field))?;
    }

    Ok(())
}

fn has_bson_type(value: &Value, name: &str) -> bool {
    match name {
        "string" => value.is_string(),
        "int" | "long" => value.is_i64() || value.is_u64(),
        "double" | "number" => value.is_number(),
        "bool" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        // Dates are stored as RFC 3339 strings
        "date" => value
            .as_str()
            .map(|text| chrono::DateTime::parse_from_rfc3339(text).is_ok())
            .unwrap_or(false),
        _ => false,
    }
}
