//! Client for the remote extraction and import services

use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::{CanonicalRecord, Record};
use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use tracing::{info, warn};

/// Message used when the extraction service fails without a readable reason
pub const EXTRACT_FAILED: &str = "Failed to parse PDF";

/// Message used when the import service rejects a batch
pub const IMPORT_FAILED: &str = "Failed to import data";

/// Rows extracted from an uploaded document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Extracted rows, in document order
    pub records: Vec<Record>,
    /// Full text of the source document, for reference only
    pub raw_text: String,
}

/// The two remote operations the editing session depends on
pub trait PriceListService {
    /// Upload a document and get its rows back
    fn extract(&self, file_name: &str, bytes: Vec<u8>) -> Result<Extraction>;

    /// Persist a batch of normalized rows; all or nothing
    fn import(&self, payload: &[CanonicalRecord]) -> Result<()>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExtractBody {
    Full {
        #[serde(rename = "extractedData")]
        extracted_data: Vec<Record>,
        #[serde(rename = "rawText", default)]
        raw_text: Option<String>,
    },
    // Older servers answer with the bare array
    Rows(Vec<Record>),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// [`PriceListService`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpService {
    client: Client,
    extract_url: String,
    import_url: String,
}

impl HttpService {
    /// Create a client for the endpoints named in `config`
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            extract_url: config.extract_url(),
            import_url: config.import_url(),
        })
    }
}

impl PriceListService for HttpService {
    fn extract(&self, file_name: &str, bytes: Vec<u8>) -> Result<Extraction> {
        let size = bytes.len();
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))?;
        let form = multipart::Form::new().part("file", part);

        info!(file = file_name, size, url = %self.extract_url, "uploading document for extraction");
        let response = self.client.post(&self.extract_url).multipart(form).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| EXTRACT_FAILED.to_string());
            warn!(status = status.as_u16(), %message, "extraction rejected");
            return Err(Error::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ExtractBody = serde_json::from_str(&body).map_err(|e| {
            Error::MalformedResponse(format!("extraction returned an unexpected format: {}", e))
        })?;

        Ok(match parsed {
            ExtractBody::Full {
                extracted_data,
                raw_text,
            } => Extraction {
                records: extracted_data,
                raw_text: raw_text.unwrap_or_default(),
            },
            ExtractBody::Rows(records) => Extraction {
                records,
                raw_text: String::new(),
            },
        })
    }

    fn import(&self, payload: &[CanonicalRecord]) -> Result<()> {
        info!(rows = payload.len(), url = %self.import_url, "submitting import batch");
        let response = self.client.post(&self.import_url).json(payload).send()?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = status.as_u16(), "import rejected");
            return Err(Error::Rejected {
                status: status.as_u16(),
                message: IMPORT_FAILED.to_string(),
            });
        }

        Ok(())
    }
}

fn mime_for(file_name: &str) -> &'static str {
    if file_name.to_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}
