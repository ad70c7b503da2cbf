//! Case conversion for resource payloads: response keys camelCase -> snake_case before typed decoding.

use serde_json::{Map, Value};

/// Convert a single identifier from camelCase to snake_case.
/// e.g. "className" -> "class_name", "isActive" -> "is_active"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert all keys of a JSON object from camelCase to snake_case (in place).
/// When both spellings are present the snake_case key already in the object wins.
pub fn object_keys_to_snake_case(obj: &mut Map<String, Value>) {
    let keys: Vec<String> = obj.keys().cloned().collect();
    for k in keys {
        let snake = to_snake_case(&k);
        if snake != k {
            if let Some(v) = obj.remove(&k) {
                obj.entry(snake).or_insert(v);
            }
        }
    }
}

/// Recursively apply snake_case to all object keys in a Value (objects and arrays of objects).
pub fn value_keys_to_snake_case_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            object_keys_to_snake_case(map);
            for (_, v) in map.iter_mut() {
                value_keys_to_snake_case_recursive(v);
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                value_keys_to_snake_case_recursive(v);
            }
        }
        _ => {}
    }
}
