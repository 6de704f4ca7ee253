//! pricelist-core: normalization and reconciliation of extracted price lists
//!
//! This library provides functionality to:
//! - Infer working column headers from rows with arbitrary field names
//! - Resolve any row onto the canonical brand/model/type/dp/mrp shape
//! - Hold rows under interactive edit with positional identity
//! - Parse pasted delimited text into rows
//! - Export rows as CSV or JSON
//! - Submit the normalized batch to the import service

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod paste;
pub mod record;
pub mod resolver;
pub mod schema;
pub mod session;
pub mod store;
pub mod submit;

pub use client::{Extraction, HttpService, PriceListService};
pub use config::Config;
pub use error::{Error, Result};
pub use export::{decode_json, encode_canonical_csv, encode_csv, encode_json, ArtifactKind};
pub use paste::{parse_paste, parse_paste_records};
pub use record::{CanonicalRecord, FieldValue, Record, CANONICAL_FIELDS};
pub use resolver::{coerce_number, resolve, FieldDefaults};
pub use schema::infer_headers;
pub use session::{InFlight, Request, Session};
pub use store::RowStore;
pub use submit::{build_payload, SubmissionReceipt};
