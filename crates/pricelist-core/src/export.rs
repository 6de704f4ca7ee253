//! Export encoders for the current rows
//!
//! Both encoders are read-only projections: CSV for spreadsheets and pretty
//! JSON that decodes back to the same rows.

use crate::error::{Error, Result};
use crate::record::{CanonicalRecord, Record, CANONICAL_FIELDS};
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Kind of downloadable artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Csv,
    Json,
}

impl ArtifactKind {
    /// File extension for this kind
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Csv => "csv",
            ArtifactKind::Json => "json",
        }
    }
}

/// Encode rows as CSV with the given header row
///
/// Fields missing from a row encode as empty.
pub fn encode_csv<S: AsRef<str>>(headers: &[S], rows: &[Record]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(false)
        .from_writer(Vec::new());

    writer.write_record(headers.iter().map(|h| h.as_ref()))?;

    for row in rows {
        writer.write_record(headers.iter().map(|h| {
            row.get(h.as_ref())
                .map(|v| v.to_string_value())
                .unwrap_or_default()
        }))?;
    }

    finish(writer)
}

/// Encode the submission payload as CSV with the canonical header row
pub fn encode_canonical_csv(payload: &[CanonicalRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(CANONICAL_FIELDS)?;
    for record in payload {
        writer.write_record(record.values())?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Encode rows as indented JSON, keeping each row's field order
pub fn encode_json(rows: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// Decode rows previously written by [`encode_json`] (or any JSON array of objects)
pub fn decode_json(content: &str) -> Result<Vec<Record>> {
    serde_json::from_str(content).map_err(Error::Json)
}

/// Load rows from a JSON file
pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
        path: path.as_ref().to_path_buf(),
        source: e,
    })?;
    decode_json(&content)
}

/// File name for an artifact exported at `at`
pub fn artifact_name(kind: ArtifactKind, at: DateTime<Local>) -> String {
    format!("pricelist_{}.{}", at.format("%Y%m%d_%H%M%S"), kind.extension())
}

/// Write an artifact into `dir`, returning the path written
///
/// Never overwrites: a second export within the same second gets a `_2`,
/// `_3`... suffix.
pub fn write_artifact<P: AsRef<Path>>(dir: P, kind: ArtifactKind, contents: &str) -> Result<PathBuf> {
    write_artifact_at(dir.as_ref(), kind, Local::now(), contents)
}

fn write_artifact_at(dir: &Path, kind: ArtifactKind, at: DateTime<Local>, contents: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let name = artifact_name(kind, at);
    let stem = name.trim_end_matches(kind.extension()).trim_end_matches('.');

    let mut attempt = 1;
    loop {
        let path = if attempt == 1 {
            dir.join(&name)
        } else {
            dir.join(format!("{}_{}.{}", stem, attempt, kind.extension()))
        };

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(contents.as_bytes())?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(Error::Io(e)),
        }
    }
}
