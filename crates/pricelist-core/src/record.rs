//! Core row types for extracted and normalized price list data

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// The five field names every imported row ends up with, in display order
pub const CANONICAL_FIELDS: [&str; 5] = ["brand", "model", "type", "dp", "mrp"];

/// A single value in an extracted row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
    /// Empty/null cell
    Empty,
}

impl FieldValue {
    /// Parse operator input into a FieldValue, detecting numbers
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return FieldValue::Empty;
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => FieldValue::Number(n),
            _ => FieldValue::Text(trimmed.to_string()),
        }
    }

    /// Check if the value renders as nothing
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Number(_) => false,
        }
    }

    /// Convert to a display string
    pub fn to_string_value(&self) -> String {
        match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Empty => String::new(),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Empty => write!(f, ""),
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => FieldValue::Empty,
            Value::Bool(b) => FieldValue::Text(b.to_string()),
            Value::Number(n) => n
                .as_f64()
                .map(FieldValue::Number)
                .unwrap_or_else(|| FieldValue::Text(n.to_string())),
            Value::String(s) => FieldValue::Text(s),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

// Extraction output is whatever the remote model produced, so decoding accepts
// any JSON value instead of failing the whole batch.
impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(FieldValue::from)
    }
}

/// An extracted row: arbitrary field names mapped to values, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    /// Create a new empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record with every given field set to empty
    pub fn blank<S: AsRef<str>>(fields: &[S]) -> Self {
        fields
            .iter()
            .map(|f| (f.as_ref().to_string(), FieldValue::Empty))
            .collect()
    }

    /// Set a field, keeping its position if it already exists
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Builder-style variant of [`Record::set`]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Get a field by exact name
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    /// Fields in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// The normalized row shape accepted by the import endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub brand: String,
    pub model: String,
    /// Product type/category
    #[serde(rename = "type")]
    pub kind: String,
    /// Dealer price
    pub dp: f64,
    /// Maximum retail price
    pub mrp: f64,
}

impl CanonicalRecord {
    /// Values as display strings, in [`CANONICAL_FIELDS`] order
    pub fn values(&self) -> [String; 5] {
        [
            self.brand.clone(),
            self.model.clone(),
            self.kind.clone(),
            self.dp.to_string(),
            self.mrp.to_string(),
        ]
    }
}

impl From<CanonicalRecord> for Record {
    fn from(c: CanonicalRecord) -> Self {
        Record::new()
            .with("brand", c.brand)
            .with("model", c.model)
            .with("type", c.kind)
            .with("dp", c.dp)
            .with("mrp", c.mrp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_parse() {
        assert_eq!(FieldValue::parse("42"), FieldValue::Number(42.0));
        assert_eq!(FieldValue::parse(" 3.5 "), FieldValue::Number(3.5));
        assert_eq!(
            FieldValue::parse("Tubeless"),
            FieldValue::Text("Tubeless".to_string())
        );
        assert_eq!(FieldValue::parse("   "), FieldValue::Empty);
        assert_eq!(FieldValue::parse("inf"), FieldValue::Text("inf".to_string()));
    }

    #[test]
    fn test_field_value_from_json() {
        let record: Record =
            serde_json::from_str(r#"{"a": "x", "b": 10, "c": null, "d": true, "e": [1]}"#)
                .unwrap();

        assert_eq!(record.get("a"), Some(&FieldValue::Text("x".to_string())));
        assert_eq!(record.get("b"), Some(&FieldValue::Number(10.0)));
        assert_eq!(record.get("c"), Some(&FieldValue::Empty));
        assert_eq!(record.get("d"), Some(&FieldValue::Text("true".to_string())));
        assert_eq!(record.get("e"), Some(&FieldValue::Text("[1]".to_string())));
    }

    #[test]
    fn test_record_preserves_key_order() {
        let record: Record = serde_json::from_str(r#"{"Zeta": 1, "Alpha": 2, "Mid": 3}"#).unwrap();
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["Zeta", "Alpha", "Mid"]);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Zeta":1.0,"Alpha":2.0,"Mid":3.0}"#);
    }

    #[test]
    fn test_set_existing_field_keeps_position() {
        let mut record = Record::blank(&["brand", "model", "mrp"]);
        record.set("model", "CZAR");

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["brand", "model", "mrp"]);
        assert_eq!(record.get("model"), Some(&FieldValue::Text("CZAR".to_string())));
        assert_eq!(record.get("brand"), Some(&FieldValue::Empty));
    }

    #[test]
    fn test_canonical_record_json_names() {
        let c = CanonicalRecord {
            brand: "MRF".to_string(),
            model: "CZAR".to_string(),
            kind: "Tubeless".to_string(),
            dp: 1000.0,
            mrp: 1200.5,
        };

        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value["type"], "Tubeless");
        assert_eq!(value["mrp"], 1200.5);

        let record = Record::from(c);
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, CANONICAL_FIELDS.to_vec());
    }
}
