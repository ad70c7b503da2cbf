//! Standard response envelope handling: `{ "data": ... }` or a bare payload.

use serde_json::Value;

/// Payload inside a `{ "data": ... }` envelope, or the value itself when it is not wrapped.
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => map.remove("data").unwrap_or(Value::Null),
        other => other,
    }
}

/// Items of a list response. Anything that is not an array (after unwrapping) yields no items.
pub fn unwrap_list(value: Value) -> Vec<Value> {
    match unwrap_data(value) {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_envelope_and_bare_list() {
        assert_eq!(unwrap_list(json!({ "data": [1, 2] })), vec![json!(1), json!(2)]);
        assert_eq!(unwrap_list(json!([3])), vec![json!(3)]);
        assert!(unwrap_list(json!({ "data": { "id": 1 } })).is_empty());
        assert_eq!(unwrap_data(json!({ "id": 1 })), json!({ "id": 1 }));
    }
}
