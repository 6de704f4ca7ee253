//! Error types for pricelist-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pricelist-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not reach the extraction or import service
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },

    /// The service answered with a body we could not understand
    #[error("unexpected response: {0}")]
    MalformedResponse(String),

    /// Extraction succeeded but produced no rows
    #[error("no rows were extracted from '{0}'")]
    EmptyExtraction(String),

    /// A request of the same kind is still outstanding
    #[error("{0} is already in progress")]
    InFlight(&'static str),

    /// Submission was requested with an empty row store
    #[error("there are no rows to import")]
    NothingToSubmit,

    /// CSV encoding error from the csv crate
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
