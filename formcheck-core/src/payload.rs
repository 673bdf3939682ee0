// formcheck-core/src/payload.rs
//! The submitted form payload: an insertion-ordered mapping from field name
//! to either a text value or a nested group of fields.
//!
//! Payloads arrive from the transport layer as JSON objects. Form encoders post
//! `name[]` and `name[key]` fields as nested structures, so arrays become
//! groups keyed by position and scalars other than strings keep their textual
//! form.
//!
//! License: MIT OR APACHE 2.0

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// A single submitted value: a text leaf or a nested group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Group(Payload),
}

impl FieldValue {
    /// Returns the text of a leaf, or `None` for a group.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            FieldValue::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Payload> {
        match self {
            FieldValue::Group(p) => Some(p),
            FieldValue::Text(_) => None,
        }
    }

    /// Loose comparison used for checkbox and radio state.
    ///
    /// Text matches when the strings are identical, or when both sides read as
    /// numbers with the same value (`"1"` matches `"01"` and `"1.0"`).
    /// Groups never match.
    pub fn loosely_equals(&self, other: &str) -> bool {
        let Some(text) = self.as_text() else { return false; };
        if text == other {
            return true;
        }
        match (parse_numeric(text), parse_numeric(other)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            FieldValue::Text(_) => Shape::Leaf,
            FieldValue::Group(p) => p.shape(),
        }
    }
}

fn parse_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Payload> for FieldValue {
    fn from(value: Payload) -> Self {
        FieldValue::Group(value)
    }
}

/// The structure of a payload with every leaf erased.
///
/// Two payloads with equal shapes have the same keys in the same order at
/// every nesting level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Leaf,
    Group(Vec<(String, Shape)>),
}

/// An insertion-ordered set of submitted fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct Payload {
    fields: IndexMap<String, FieldValue>,
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Text value of a top-level field; `None` when absent or a group.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::as_text)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Inserts or replaces a field. A replaced field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Builder form of [`Payload::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn shape(&self) -> Shape {
        Shape::Group(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.shape()))
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for Payload
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Payload {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = indexmap::map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl TryFrom<Value> for Payload {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, field_from_json(v)))
                .collect()),
            other => Err(format!(
                "a form payload must be a JSON object, found {}",
                json_kind(&other)
            )),
        }
    }
}

fn field_from_json(value: Value) -> FieldValue {
    match value {
        Value::String(s) => FieldValue::Text(s),
        Value::Null => FieldValue::Text(String::new()),
        Value::Bool(b) => FieldValue::Text(b.to_string()),
        Value::Number(n) => FieldValue::Text(n.to_string()),
        Value::Array(items) => FieldValue::Group(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), field_from_json(v)))
                .collect(),
        ),
        Value::Object(map) => FieldValue::Group(
            map.into_iter()
                .map(|(k, v)| (k, field_from_json(v)))
                .collect(),
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_from_json_keeps_order_and_nesting() {
        let payload: Payload = serde_json::from_str(
            r#"{"zeta": "z", "alpha": 5, "tags": ["a", "b"], "addr": {"city": "Oslo", "zip": null}}"#,
        )
        .unwrap();

        let keys: Vec<&String> = payload.keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "tags", "addr"]);
        assert_eq!(payload.text("alpha"), Some("5"));

        let tags = payload.get("tags").and_then(FieldValue::as_group).unwrap();
        assert_eq!(tags.text("1"), Some("b"));

        let addr = payload.get("addr").and_then(FieldValue::as_group).unwrap();
        assert_eq!(addr.text("zip"), Some(""));
    }

    #[test]
    fn test_payload_rejects_non_object_root() {
        let result: Result<Payload, _> = serde_json::from_str(r#"["a"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_loose_equality() {
        let one = FieldValue::from("1");
        assert!(one.loosely_equals("1"));
        assert!(one.loosely_equals("01"));
        assert!(one.loosely_equals("1.0"));
        assert!(!one.loosely_equals("yes"));
        assert!(!FieldValue::from("").loosely_equals("0"));
        assert!(!FieldValue::Group(Payload::new()).loosely_equals(""));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut payload = Payload::new().with("a", "1").with("b", "2");
        payload.insert("a", "3");
        let keys: Vec<&String> = payload.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(payload.text("a"), Some("3"));
    }
}
