//! Field resolver: maps arbitrary extracted rows onto the canonical shape
//!
//! Source documents name their columns however they like ("Item Code",
//! "Dealer Price", "M.R.P."...). Each canonical field is located with an
//! ordered list of key predicates, scanning the record's keys in order and
//! taking the first key that satisfies any predicate. Fields are located
//! independently, so one key ("Dealer Price") may feed both `dp` and `mrp`.

use crate::record::{CanonicalRecord, FieldValue, Record};
use serde::{Deserialize, Serialize};

/// Labels used when a row has no usable brand or type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDefaults {
    pub brand: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            brand: "Unknown".to_string(),
            kind: "Standard".to_string(),
        }
    }
}

/// How a lowercase key is tested against an alias
#[derive(Debug, Clone, Copy)]
enum Match {
    Exact(&'static str),
    Contains(&'static str),
}

impl Match {
    fn test(self, key: &str) -> bool {
        match self {
            Match::Exact(alias) => key == alias,
            Match::Contains(alias) => key.contains(alias),
        }
    }
}

const BRAND: &[Match] = &[Match::Exact("brand")];
const MODEL: &[Match] = &[
    Match::Contains("model"),
    Match::Contains("pattern"),
    Match::Contains("item"),
];
const TYPE: &[Match] = &[Match::Exact("type"), Match::Contains("category")];
const DP: &[Match] = &[
    Match::Contains("dp"),
    Match::Contains("dealer"),
    Match::Contains("net"),
];
const MRP: &[Match] = &[
    Match::Contains("mrp"),
    Match::Contains("list"),
    Match::Contains("price"),
];

/// Keys of one record, lowercased for matching
struct KeyScan<'a> {
    keys: Vec<(String, &'a str, &'a FieldValue)>,
}

impl<'a> KeyScan<'a> {
    fn new(record: &'a Record) -> Self {
        let keys = record
            .iter()
            .map(|(k, v)| (k.trim().to_lowercase(), k, v))
            .collect();
        Self { keys }
    }

    /// Value of the first key matching any predicate
    fn find(&self, predicates: &[Match]) -> Option<&'a FieldValue> {
        self.keys
            .iter()
            .find(|(lower, _, _)| predicates.iter().any(|p| p.test(lower)))
            .map(|(_, _, v)| *v)
    }

    fn literal(&self, name: &str) -> Option<&'a FieldValue> {
        self.keys
            .iter()
            .find(|(_, original, _)| *original == name)
            .map(|(_, _, v)| *v)
    }
}

/// Resolve one extracted row into the canonical shape
///
/// Total and side-effect free: every output field is present and typed even
/// for an empty record.
pub fn resolve(record: &Record, defaults: &FieldDefaults) -> CanonicalRecord {
    let scan = KeyScan::new(record);

    let brand = non_empty_text(scan.find(BRAND))
        .or_else(|| non_empty_text(scan.literal("brand")))
        .unwrap_or_else(|| defaults.brand.clone());
    let model = non_empty_text(scan.find(MODEL)).unwrap_or_default();
    let kind = non_empty_text(scan.find(TYPE)).unwrap_or_else(|| defaults.kind.clone());
    let dp = coerce_number(scan.find(DP).unwrap_or(&FieldValue::Empty));
    let mrp = coerce_number(scan.find(MRP).unwrap_or(&FieldValue::Empty));

    CanonicalRecord {
        brand,
        model,
        kind,
        dp,
        mrp,
    }
}

fn non_empty_text(value: Option<&FieldValue>) -> Option<String> {
    value
        .map(|v| v.to_string_value().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Coerce any value to a number: keep only digits and '.', then parse
///
/// Never fails; anything unparsable becomes 0.
pub fn coerce_number(value: &FieldValue) -> f64 {
    match value {
        FieldValue::Empty => 0.0,
        other => parse_price(&other.to_string_value()),
    }
}

/// Strip everything but digits and '.' from text and parse it, 0 on failure
pub fn parse_price(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_record_is_fully_defaulted() {
        let c = resolve(&Record::new(), &FieldDefaults::default());
        assert_eq!(c.brand, "Unknown");
        assert_eq!(c.model, "");
        assert_eq!(c.kind, "Standard");
        assert_eq!(c.dp, 0.0);
        assert_eq!(c.mrp, 0.0);
    }

    #[test]
    fn test_typical_extracted_headers() {
        let r = record(
            r#"{"Sr No": 1, "Brand": "MRF", "Pattern": "ZLX", "Category": "Tubeless",
                "Net Rate": "₹ 2,150", "M.R.P": "2,600.00"}"#,
        );
        let c = resolve(&r, &FieldDefaults::default());

        assert_eq!(c.brand, "MRF");
        assert_eq!(c.model, "ZLX");
        assert_eq!(c.kind, "Tubeless");
        assert_eq!(c.dp, 2150.0);
        // "M.R.P" does not contain "mrp"; no other price-like key exists
        assert_eq!(c.mrp, 0.0);
    }

    #[test]
    fn test_first_matching_key_wins() {
        let r = record(r#"{"Item Code": "A1", "Model Name": "B2", "MRP": 10}"#);
        let c = resolve(&r, &FieldDefaults::default());
        assert_eq!(c.model, "A1");
        assert_eq!(c.mrp, 10.0);
    }

    #[test]
    fn test_fields_match_keys_independently() {
        let r = record(r#"{"Item": "A", "Net Price": 90, "MRP": 100}"#);
        let c = resolve(&r, &FieldDefaults::default());
        assert_eq!(c.dp, 90.0);
        assert_eq!(c.mrp, 90.0);

        let r = record(r#"{"Model": "X", "Dealer Price": 900, "List Price": 1200}"#);
        let c = resolve(&r, &FieldDefaults::default());
        assert_eq!(c.dp, 900.0);
        assert_eq!(c.mrp, 900.0);
    }

    #[test]
    fn test_type_requires_exact_alias() {
        let r = record(r#"{"Tyre Type": "Radial"}"#);
        assert_eq!(resolve(&r, &FieldDefaults::default()).kind, "Standard");

        let r = record(r#"{" TYPE ": "Radial"}"#);
        assert_eq!(resolve(&r, &FieldDefaults::default()).kind, "Radial");
    }

    #[test]
    fn test_empty_brand_uses_default() {
        let defaults = FieldDefaults {
            brand: "Apollo".to_string(),
            kind: "Tube".to_string(),
        };
        let r = record(r#"{"Brand": "", "Type": null}"#);
        let c = resolve(&r, &defaults);
        assert_eq!(c.brand, "Apollo");
        assert_eq!(c.kind, "Tube");
    }

    #[test]
    fn test_numeric_brand_becomes_text() {
        let r = record(r#"{"brand": 3, "model": 205}"#);
        let c = resolve(&r, &FieldDefaults::default());
        assert_eq!(c.brand, "3");
        assert_eq!(c.model, "205");
    }

    #[test]
    fn test_resolve_is_stable_under_reapplication() {
        let defaults = FieldDefaults::default();
        let inputs = [
            r#"{"Brand": "CEAT", "Item": "Milaze", "Category": "TT", "DP": "1,000", "MRP": "₹1,234.50"}"#,
            r#"{"Model": "Only a model"}"#,
            r#"{}"#,
            r#"{"Net": 5, "Price": "abc"}"#,
        ];

        for input in inputs {
            let once = resolve(&record(input), &defaults);
            let twice = resolve(&Record::from(once.clone()), &defaults);
            assert_eq!(once, twice, "input: {}", input);
        }
    }

    #[test]
    fn test_coercion_examples() {
        assert_eq!(parse_price("₹1,234.50"), 1234.5);
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("abc"), 0.0);
        assert_eq!(parse_price("1.2.3"), 0.0);
        assert_eq!(parse_price("Rs 450/-"), 450.0);

        assert_eq!(coerce_number(&FieldValue::Number(99.5)), 99.5);
        assert_eq!(coerce_number(&FieldValue::Empty), 0.0);
        assert_eq!(coerce_number(&FieldValue::Text("1 200".to_string())), 1200.0);
    }

    #[test]
    fn test_numbers_and_text_coerce_alike() {
        assert_eq!(
            coerce_number(&FieldValue::Number(-5.0)),
            coerce_number(&FieldValue::Text("-5".to_string()))
        );
        assert_eq!(coerce_number(&FieldValue::Number(-5.0)), 5.0);
        assert_eq!(coerce_number(&FieldValue::Number(f64::NAN)), 0.0);
        assert_eq!(coerce_number(&FieldValue::Number(1e21)), 1e21);
    }
}
