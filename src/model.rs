//! Selection entities: institute, class, subject, child. Decoding tolerates the back end's
//! alternate field names and numeric ids.

use crate::case::value_keys_to_snake_case_recursive;
use crate::error::LoadError;
use crate::response::unwrap_data;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a selectable entity. Numbers in payloads are kept in their decimal string form
/// so they compare equal to the raw route token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this id equals a raw route token.
    pub fn matches(&self, token: &str) -> bool {
        self.0 == token
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId(s)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(deserializer)?;
        id_text(&v).map(EntityId).ok_or_else(|| {
            serde::de::Error::custom(format!("id must be a string or a number; got {}", v))
        })
    }
}

fn id_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    /// Institute type, e.g. "school" or "tuition_institute".
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl Organization {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Organization {
            id: EntityId::new(id),
            name: name.into(),
            kind: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub grade: i64,
    #[serde(default)]
    pub specialty: String,
    /// Set on the placeholder written before the class record arrives.
    #[serde(skip)]
    pub provisional: bool,
}

impl ClassInfo {
    /// Provisional class carrying only the route id and a display name.
    pub fn placeholder(id: &str, name: impl Into<String>) -> Self {
        ClassInfo {
            id: EntityId::from(id),
            name: name.into(),
            code: String::new(),
            description: String::new(),
            grade: 0,
            specialty: String::new(),
            provisional: true,
        }
    }

    /// Authoritative class from a resource payload. The id is always the route token that was
    /// requested; missing fields fall back to `fallback` (usually the placeholder). A payload
    /// that is not a record is a decode error.
    pub fn from_payload(payload: &Value, requested_id: &str, fallback: &ClassInfo) -> Result<Self, LoadError> {
        let fields = normalized(payload)?;
        Ok(ClassInfo {
            id: EntityId::from(requested_id),
            name: first_text(&fields, &["name", "class_name"]).unwrap_or_else(|| fallback.name.clone()),
            code: first_text(&fields, &["code"]).unwrap_or_default(),
            description: first_text(&fields, &["description"]).unwrap_or_default(),
            grade: fields.get("grade").and_then(Value::as_i64).unwrap_or(fallback.grade),
            specialty: first_text(&fields, &["specialty", "section"])
                .unwrap_or_else(|| fallback.specialty.clone()),
            provisional: false,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Subject {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Subject {
            id: EntityId::new(id),
            name: name.into(),
            code: String::new(),
            description: String::new(),
            is_active: None,
        }
    }

    pub fn from_payload(payload: &Value, requested_id: &str) -> Result<Self, LoadError> {
        let fields = normalized(payload)?;
        Ok(Subject {
            id: EntityId::from(requested_id),
            name: first_text(&fields, &["name", "subject_name"]).unwrap_or_default(),
            code: first_text(&fields, &["code"]).unwrap_or_default(),
            description: first_text(&fields, &["description"]).unwrap_or_default(),
            is_active: fields.get("is_active").and_then(Value::as_bool),
        })
    }
}

/// A dependent the session user may view as. Routes may name a child by `id` or `user_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub id: EntityId,
    #[serde(default)]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub name: String,
}

impl Child {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Child {
            id: EntityId::new(id),
            user_id: None,
            name: name.into(),
        }
    }

    pub fn answers_to(&self, token: &str) -> bool {
        self.id.matches(token) || self.user_id.as_ref().map(|u| u.matches(token)).unwrap_or(false)
    }

    /// Decode each entry of a children list; entries that do not decode are skipped.
    pub fn list_from_payloads(items: Vec<Value>) -> Vec<Child> {
        items
            .into_iter()
            .filter_map(|mut item| {
                value_keys_to_snake_case_recursive(&mut item);
                match serde_json::from_value::<Child>(item) {
                    Ok(child) => Some(child),
                    Err(e) => {
                        tracing::debug!(error = %e, "skipping undecodable child entry");
                        None
                    }
                }
            })
            .collect()
    }
}

/// The record inside `payload` with snake_case keys.
fn normalized(payload: &Value) -> Result<Value, LoadError> {
    let mut fields = unwrap_data(payload.clone());
    if !fields.is_object() {
        return Err(LoadError::Decode(format!("expected a record, got {}", kind_of(&fields))));
    }
    value_keys_to_snake_case_recursive(&mut fields);
    Ok(fields)
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a record",
    }
}

/// First non-empty string among `keys` (numbers are accepted and stringified).
fn first_text(fields: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| fields.get(*k).and_then(id_text))
}
