//! Editing session: the row store plus everything the operator sees around it
//!
//! A session owns its rows, the working headers derived from them, the last
//! status message and one in-flight flag per request kind. It is a plain
//! value; share it across threads only behind a single `Mutex`.

use crate::client::PriceListService;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::export;
use crate::paste::parse_paste_records;
use crate::record::{CanonicalRecord, FieldValue, Record};
use crate::schema::infer_headers;
use crate::store::RowStore;
use crate::submit::{build_payload, SubmissionReceipt};
use tracing::{info, warn};

/// Kinds of remote request a session can have outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Extract,
    Import,
}

impl Request {
    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            Request::Extract => "extraction",
            Request::Import => "import",
        }
    }
}

/// Proof that a request was started; hand it back to [`Session::finish`]
#[derive(Debug)]
#[must_use = "an unfinished request keeps its control disabled"]
pub struct InFlight {
    kind: Request,
}

impl InFlight {
    pub fn kind(&self) -> Request {
        self.kind
    }
}

/// State of one operator's review of an extracted price list
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    store: RowStore,
    headers: Vec<String>,
    raw_text: String,
    status: String,
    extracting: bool,
    importing: bool,
}

impl Session {
    /// Start an empty session
    pub fn new(config: Config) -> Self {
        let headers = infer_headers(&[], &config.serial_aliases);
        Self {
            config,
            store: RowStore::new(),
            headers,
            raw_text: String::new(),
            status: String::new(),
            extracting: false,
            importing: false,
        }
    }

    /// Start a session over previously saved rows
    pub fn with_rows(config: Config, rows: Vec<Record>) -> Self {
        let mut session = Self::new(config);
        session.store.replace_all(rows);
        session.refresh_headers();
        session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current working headers
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Rows in display order
    pub fn rows(&self) -> &[Record] {
        self.store.rows()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Last status message shown to the operator
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Full text of the last extracted document
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Whether a request of `kind` is outstanding
    pub fn is_busy(&self, kind: Request) -> bool {
        match kind {
            Request::Extract => self.extracting,
            Request::Import => self.importing,
        }
    }

    fn refresh_headers(&mut self) {
        self.headers = infer_headers(self.store.rows(), &self.config.serial_aliases);
    }

    /// Insert a blank row at the top, one empty field per working header
    pub fn add_row(&mut self) {
        self.store.insert_at_front(Record::blank(&self.headers));
        self.status = "New row added. Fill in the details manually.".to_string();
    }

    /// Edit one field; false when `index` is out of bounds
    pub fn set_field(&mut self, index: usize, field: &str, value: impl Into<FieldValue>) -> bool {
        let changed = self.store.set_field(index, field, value);
        if changed && !self.headers.iter().any(|h| h == field) {
            self.refresh_headers();
        }
        changed
    }

    /// Delete the row at `index`; later rows move up one position
    pub fn delete_row(&mut self, index: usize) -> Option<Record> {
        let removed = self.store.delete_at(index);
        if removed.is_some() {
            self.refresh_headers();
        }
        removed
    }

    /// Drop every row and reset the status
    pub fn clear(&mut self) {
        self.store.clear();
        self.raw_text.clear();
        self.status.clear();
        self.refresh_headers();
    }

    /// Parse pasted text and insert its rows above the existing ones
    ///
    /// Returns the number of rows added.
    pub fn ingest_paste(&mut self, text: &str) -> usize {
        let records = parse_paste_records(text);
        let count = records.len();

        if count == 0 {
            self.status = "No rows found in pasted text.".to_string();
            return 0;
        }

        self.store.prepend(records);
        self.refresh_headers();
        self.status = format!("Added {} pasted rows.", count);
        count
    }

    /// Mark a request of `kind` as outstanding
    ///
    /// Fails when one is already outstanding, so a second click of the same
    /// control cannot start a parallel request.
    pub fn begin(&mut self, kind: Request) -> Result<InFlight> {
        let flag = match kind {
            Request::Extract => &mut self.extracting,
            Request::Import => &mut self.importing,
        };
        if *flag {
            return Err(Error::InFlight(kind.label()));
        }
        *flag = true;
        Ok(InFlight { kind })
    }

    /// Clear the outstanding flag for a finished request
    pub fn finish(&mut self, ticket: InFlight) {
        match ticket.kind {
            Request::Extract => self.extracting = false,
            Request::Import => self.importing = false,
        }
    }

    /// Upload a document and, if it yields rows, replace the current rows
    ///
    /// On failure, or when nothing was extracted, the current rows are kept.
    pub fn extract<S>(&mut self, service: &S, file_name: &str, bytes: Vec<u8>) -> Result<usize>
    where
        S: PriceListService + ?Sized,
    {
        let ticket = match self.begin(Request::Extract) {
            Ok(ticket) => ticket,
            Err(e) => return Err(self.fail(e)),
        };
        self.status = "Scanning document... This may take a few seconds.".to_string();

        let result = service.extract(file_name, bytes);
        self.finish(ticket);

        let extraction = match result {
            Ok(extraction) if extraction.records.is_empty() => {
                return Err(self.fail(Error::EmptyExtraction(file_name.to_string())))
            }
            Ok(extraction) => extraction,
            Err(e) => return Err(self.fail(e)),
        };

        let count = extraction.records.len();
        self.store.replace_all(extraction.records);
        self.raw_text = extraction.raw_text;
        self.refresh_headers();
        self.status = format!("Successfully extracted {} items. Please review below.", count);
        info!(file = file_name, rows = count, "extraction complete");
        Ok(count)
    }

    /// Normalized rows as they would be submitted
    pub fn payload(&self) -> Vec<CanonicalRecord> {
        build_payload(self.store.rows(), &self.config.defaults)
    }

    /// Submit every row as one batch; clears the rows once accepted
    ///
    /// On failure the rows stay as they are so the operator can retry.
    pub fn submit<S>(&mut self, service: &S) -> Result<SubmissionReceipt>
    where
        S: PriceListService + ?Sized,
    {
        if self.store.is_empty() {
            return Err(self.fail(Error::NothingToSubmit));
        }

        let ticket = match self.begin(Request::Import) {
            Ok(ticket) => ticket,
            Err(e) => return Err(self.fail(e)),
        };
        let payload = self.payload();
        let result = service.import(&payload);
        self.finish(ticket);

        if let Err(e) = result {
            return Err(self.fail(e));
        }

        let receipt = SubmissionReceipt::new(payload.len());
        self.store.clear();
        self.raw_text.clear();
        self.refresh_headers();
        self.status = "Import Complete.".to_string();
        info!(rows = receipt.row_count, "import accepted");
        Ok(receipt)
    }

    fn fail(&mut self, error: Error) -> Error {
        warn!(%error, "request failed");
        self.status = format!("Error: {}", error);
        error
    }

    /// Current rows as CSV under the working headers
    pub fn export_csv(&self) -> Result<String> {
        export::encode_csv(&self.headers, self.store.rows())
    }

    /// Submission payload as CSV under the canonical headers
    pub fn export_canonical_csv(&self) -> Result<String> {
        export::encode_canonical_csv(&self.payload())
    }

    /// Current rows as indented JSON
    pub fn export_json(&self) -> Result<String> {
        export::encode_json(self.store.rows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Extraction, IMPORT_FAILED};
    use std::cell::{Cell, RefCell};

    /// Service double answering from fixed data
    #[derive(Default)]
    struct FakeService {
        rows: Option<Vec<Record>>,
        reject_import: bool,
        calls: Cell<usize>,
        imported: RefCell<Vec<CanonicalRecord>>,
    }

    impl FakeService {
        fn extracting(json: &str) -> Self {
            Self {
                rows: Some(serde_json::from_str(json).unwrap()),
                ..Self::default()
            }
        }
    }

    impl PriceListService for FakeService {
        fn extract(&self, _file_name: &str, _bytes: Vec<u8>) -> Result<Extraction> {
            self.calls.set(self.calls.get() + 1);
            match &self.rows {
                Some(rows) => Ok(Extraction {
                    records: rows.clone(),
                    raw_text: "raw document text".to_string(),
                }),
                None => Err(Error::Rejected {
                    status: 500,
                    message: "Model overloaded".to_string(),
                }),
            }
        }

        fn import(&self, payload: &[CanonicalRecord]) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            if self.reject_import {
                return Err(Error::Rejected {
                    status: 503,
                    message: IMPORT_FAILED.to_string(),
                });
            }
            self.imported.borrow_mut().extend_from_slice(payload);
            Ok(())
        }
    }

    fn session_with(json: &str) -> Session {
        Session::with_rows(Config::default(), serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_new_session_has_canonical_headers() {
        let session = Session::new(Config::default());
        assert!(session.is_empty());
        assert_eq!(session.headers(), ["brand", "model", "type", "dp", "mrp"]);
    }

    #[test]
    fn test_add_row_is_seeded_from_headers() {
        let mut session = session_with(r#"[{"Sr No": 1, "Item": "A", "Rate": 10}]"#);
        session.add_row();

        assert_eq!(session.len(), 2);
        let keys: Vec<&str> = session.rows()[0].keys().collect();
        assert_eq!(keys, vec!["Item", "Rate"]);
        assert!(session.rows()[0].iter().all(|(_, v)| v.is_empty()));
    }

    #[test]
    fn test_new_field_extends_headers() {
        let mut session = session_with(r#"[{"Model": "A"}, {"Model": "B"}]"#);
        assert!(session.set_field(1, "Notes", "check"));
        assert_eq!(session.headers(), ["Model", "Notes"]);

        assert!(!session.set_field(7, "Other", "x"));
        assert_eq!(session.headers(), ["Model", "Notes"]);
    }

    #[test]
    fn test_deleting_last_row_with_field_shrinks_headers() {
        let mut session = session_with(r#"[{"Model": "A"}, {"Model": "B", "Extra": 1}]"#);
        session.delete_row(1);
        assert_eq!(session.headers(), ["Model"]);

        session.delete_row(0);
        assert_eq!(session.headers(), ["brand", "model", "type", "dp", "mrp"]);
    }

    #[test]
    fn test_paste_prepends_batch() {
        let mut session = session_with(r#"[{"brand": "Existing"}]"#);
        let added = session.ingest_paste("MRF,CZAR,Tubeless,1000,1200\n,,,,");

        assert_eq!(added, 1);
        assert_eq!(session.len(), 2);
        assert_eq!(
            session.rows()[0].get("model"),
            Some(&FieldValue::Text("CZAR".to_string()))
        );
        assert_eq!(
            session.rows()[1].get("brand"),
            Some(&FieldValue::Text("Existing".to_string()))
        );

        assert_eq!(session.ingest_paste("\n,,,\n"), 0);
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_extract_replaces_rows() {
        crate::logging::init_test();
        let mut session = session_with(r#"[{"old": 1}]"#);
        let service = FakeService::extracting(r#"[{"Brand": "X", "Model": "Y"}, {"Brand": "X", "MRP": 10}]"#);

        let count = session.extract(&service, "list.pdf", vec![]).unwrap();

        assert_eq!(count, 2);
        assert_eq!(session.headers(), ["Brand", "Model", "MRP"]);
        assert_eq!(session.raw_text(), "raw document text");
        assert_eq!(
            session.status(),
            "Successfully extracted 2 items. Please review below."
        );
        assert!(!session.is_busy(Request::Extract));
    }

    #[test]
    fn test_failed_or_empty_extraction_keeps_rows() {
        let mut session = session_with(r#"[{"Model": "keep me"}]"#);
        let before = session.rows().to_vec();

        let failing = FakeService::default();
        assert!(matches!(
            session.extract(&failing, "a.pdf", vec![]),
            Err(Error::Rejected { .. })
        ));
        assert_eq!(session.rows(), before.as_slice());
        assert!(session.status().contains("Model overloaded"));
        assert!(!session.is_busy(Request::Extract));

        let empty = FakeService::extracting("[]");
        assert!(matches!(
            session.extract(&empty, "a.pdf", vec![]),
            Err(Error::EmptyExtraction(_))
        ));
        assert_eq!(session.rows(), before.as_slice());
    }

    #[test]
    fn test_second_request_of_same_kind_is_refused() {
        let mut session = session_with(r#"[{"Model": "A"}]"#);
        let service = FakeService::extracting(r#"[{"Model": "B"}]"#);

        let ticket = session.begin(Request::Extract).unwrap();
        assert!(session.is_busy(Request::Extract));
        assert!(matches!(
            session.extract(&service, "a.pdf", vec![]),
            Err(Error::InFlight("extraction"))
        ));
        assert_eq!(service.calls.get(), 0);
        assert_eq!(session.status(), "Error: extraction is already in progress");
        assert_eq!(session.len(), 1);

        // A different kind is independent
        let import = session.begin(Request::Import).unwrap();
        session.finish(import);

        session.finish(ticket);
        assert_eq!(session.extract(&service, "a.pdf", vec![]).unwrap(), 1);
    }

    #[test]
    fn test_submit_clears_on_success() {
        let mut session = session_with(
            r#"[{"Brand": "CEAT", "Item": "Milaze", "DP": "₹1,000", "MRP": "1,234.50"}, {}]"#,
        );
        let service = FakeService::default();

        let receipt = session.submit(&service).unwrap();

        assert_eq!(receipt.row_count, 2);
        assert!(session.is_empty());
        assert_eq!(session.status(), "Import Complete.");

        let imported = service.imported.borrow();
        assert_eq!(imported[0].model, "Milaze");
        assert_eq!(imported[0].dp, 1000.0);
        assert_eq!(imported[0].mrp, 1234.5);
        assert_eq!(imported[1].brand, "Unknown");
    }

    #[test]
    fn test_failed_submit_keeps_rows_for_retry() {
        let mut session = session_with(r#"[{"Model": "A"}]"#);
        let failing = FakeService {
            reject_import: true,
            ..FakeService::default()
        };

        assert!(session.submit(&failing).is_err());
        assert_eq!(session.len(), 1);
        assert!(!session.is_busy(Request::Import));
        assert!(session.status().starts_with("Error: Failed to import data"));

        let working = FakeService::default();
        assert!(session.submit(&working).is_ok());
        assert_eq!(working.imported.borrow().len(), 1);
    }

    #[test]
    fn test_submit_with_no_rows_makes_no_request() {
        let mut session = Session::new(Config::default());
        let service = FakeService::default();

        assert!(matches!(session.submit(&service), Err(Error::NothingToSubmit)));
        assert_eq!(service.calls.get(), 0);
    }

    #[test]
    fn test_exports_do_not_mutate() {
        let session = session_with(r#"[{"Brand": "MRF", "MRP": 10}]"#);
        let before = session.rows().to_vec();

        assert_eq!(session.export_csv().unwrap(), "Brand,MRP\nMRF,10\n");
        assert_eq!(
            session.export_canonical_csv().unwrap(),
            "brand,model,type,dp,mrp\nMRF,,Standard,0,10\n"
        );
        let json = session.export_json().unwrap();
        assert_eq!(export::decode_json(&json).unwrap(), before);
        assert_eq!(session.rows(), before.as_slice());
    }
}
