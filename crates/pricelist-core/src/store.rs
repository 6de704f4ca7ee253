//! Row store: the ordered, index-addressed rows under edit
//!
//! A row's identity is its position. Deleting row `i` shifts every later row
//! down by one; callers holding indices must re-read after a delete.

use crate::record::{FieldValue, Record};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordered collection of extracted rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowStore {
    rows: Vec<Record>,
}

impl RowStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the store has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in display order
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Get a row by index
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.rows.get(index)
    }

    /// Discard all rows and install `records` in their place
    pub fn replace_all(&mut self, records: Vec<Record>) {
        debug!(previous = self.rows.len(), new = records.len(), "replacing row store");
        self.rows = records;
    }

    /// Insert one row at the top
    pub fn insert_at_front(&mut self, record: Record) {
        self.rows.insert(0, record);
    }

    /// Insert a batch at the top, keeping the batch's own order
    pub fn prepend(&mut self, records: Vec<Record>) {
        debug!(count = records.len(), "prepending rows");
        self.rows.splice(0..0, records);
    }

    /// Set one field of the row at `index`
    ///
    /// Returns false and leaves the store untouched when `index` is out of
    /// bounds.
    pub fn set_field(
        &mut self,
        index: usize,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.set(field, value);
                true
            }
            None => {
                debug!(index, len = self.rows.len(), "ignoring edit of missing row");
                false
            }
        }
    }

    /// Remove and return the row at `index`, shifting later rows down
    pub fn delete_at(&mut self, index: usize) -> Option<Record> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            debug!(index, len = self.rows.len(), "ignoring delete of missing row");
            None
        }
    }

    /// Remove all rows
    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }
}

impl From<Vec<Record>> for RowStore {
    fn from(rows: Vec<Record>) -> Self {
        Self { rows }
    }
}
