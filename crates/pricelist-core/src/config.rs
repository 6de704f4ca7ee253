//! Importer configuration
//!
//! Loaded from a JSON file; every field is optional and falls back to its
//! default. `PRICELIST_API_URL` overrides the service address.

use crate::error::{Error, Result};
use crate::resolver::FieldDefaults;
use crate::schema::DEFAULT_SERIAL_ALIASES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable that overrides [`Config::api_url`]
pub const API_URL_ENV: &str = "PRICELIST_API_URL";

const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Settings shared by the session, the resolver and the HTTP client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base address of the extraction/import service
    pub api_url: String,
    /// Labels used when a row has no usable brand or type
    pub defaults: FieldDefaults,
    /// Column names treated as serial numbers and hidden from the grid
    pub serial_aliases: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            defaults: FieldDefaults::default(),
            serial_aliases: DEFAULT_SERIAL_ALIASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load a config file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the config file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply the environment override
    pub fn with_env(self) -> Self {
        self.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    /// Replace the API address when `url` is set and non-empty
    pub fn with_api_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        self
    }

    /// Base address without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Address of the document extraction endpoint
    pub fn extract_url(&self) -> String {
        format!("{}/api/admin/parse-pdf", self.base_url())
    }

    /// Address of the bulk import endpoint
    pub fn import_url(&self) -> String {
        format!("{}/api/admin/import", self.base_url())
    }
}
