//! Working header inference for the editable grid

use crate::record::{Record, CANONICAL_FIELDS};
use std::collections::HashSet;

/// Serial-number column names dropped from the working headers by default
pub const DEFAULT_SERIAL_ALIASES: &[&str] = &[
    "sr no", "sr. no", "sr.no", "s.no", "s. no", "s no", "sl no", "sl. no", "serial no",
];

/// Derive the working header set from the current rows
///
/// The result is the union of all keys in first-seen order, minus any key
/// matching a serial alias (case-insensitive, surrounding whitespace ignored).
/// Falls back to [`CANONICAL_FIELDS`] when nothing is left.
pub fn infer_headers<S: AsRef<str>>(rows: &[Record], serial_aliases: &[S]) -> Vec<String> {
    let denied: HashSet<String> = serial_aliases
        .iter()
        .map(|a| a.as_ref().trim().to_lowercase())
        .collect();

    let mut headers: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for row in rows {
        for key in row.keys() {
            if seen.insert(key) && !denied.contains(&key.trim().to_lowercase()) {
                headers.push(key.to_string());
            }
        }
    }

    if headers.is_empty() {
        return CANONICAL_FIELDS.iter().map(|f| f.to_string()).collect();
    }

    headers
}
