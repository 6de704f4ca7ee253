//! Submission pipeline: turns the row store into the import payload

use crate::record::{CanonicalRecord, Record};
use crate::resolver::{resolve, FieldDefaults};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resolve every row, in order, into the payload sent to the import endpoint
pub fn build_payload(rows: &[Record], defaults: &FieldDefaults) -> Vec<CanonicalRecord> {
    rows.iter().map(|row| resolve(row, defaults)).collect()
}

/// Record of a batch the import endpoint accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Number of rows in the accepted batch
    pub row_count: usize,
    /// When the batch was accepted
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionReceipt {
    pub fn new(row_count: usize) -> Self {
        Self {
            row_count,
            submitted_at: Utc::now(),
        }
    }
}
