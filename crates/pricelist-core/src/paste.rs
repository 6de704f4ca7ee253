//! Parser for price rows pasted as free-form delimited text
//!
//! Each line is one row of the fixed five-column convention
//! `brand, model, type, dp, mrp`. A line is split on tabs when it contains a
//! tab (spreadsheet copy), otherwise on commas. Quotes are ordinary
//! characters; there is no escaping.

use crate::record::{CanonicalRecord, Record};
use crate::resolver::parse_price;
use tracing::debug;

/// Parse pasted text into canonical rows
///
/// Lines that cannot be read, and rows with neither brand nor model, are
/// skipped.
pub fn parse_paste(text: &str) -> Vec<CanonicalRecord> {
    text.lines()
        .enumerate()
        .filter_map(|(line_idx, line)| {
            let row = parse_line(line);
            if row.is_none() && !line.trim().is_empty() {
                debug!(line = line_idx + 1, "discarding pasted line");
            }
            row
        })
        .collect()
}

/// Parse pasted text straight into store rows
pub fn parse_paste_records(text: &str) -> Vec<Record> {
    parse_paste(text).into_iter().map(Record::from).collect()
}

fn parse_line(line: &str) -> Option<CanonicalRecord> {
    let delimiter = if line.contains('\t') { b'\t' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .delimiter(delimiter)
        .from_reader(line.as_bytes());

    let fields = reader.records().next()?.ok()?;
    let field = |i: usize| fields.get(i).map(str::trim).unwrap_or("");

    let row = CanonicalRecord {
        brand: field(0).to_string(),
        model: field(1).to_string(),
        kind: field(2).to_string(),
        dp: parse_price(field(3)),
        mrp: parse_price(field(4)),
    };

    if row.brand.is_empty() && row.model.is_empty() {
        return None;
    }

    Some(row)
}
