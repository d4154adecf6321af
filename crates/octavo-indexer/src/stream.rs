//! Downstream message stream interface
//!
//! After a batch lands in the index, one "document processed" message
//! per document goes to the stream. Notification is advisory: the index
//! write is the durability boundary, so stream failures are logged and
//! never fail the batch. Partial failures report the failed subset so
//! the caller can retry just those records.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use octavo_model::source;

use crate::error::Error;

/// Message emitted for each indexed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub id: String,
    #[serde(rename = "nyplSource")]
    pub nypl_source: String,
    #[serde(rename = "nyplType")]
    pub nypl_type: String,
}

impl ProcessedRecord {
    /// Build the message for a bib uri: numeric id plus prefix-derived
    /// source.
    pub fn bib(uri: &str) -> Self {
        Self {
            id: source::numeric_id(uri).to_string(),
            nypl_source: octavo_model::RecordSource::from_uri(uri).as_str().to_string(),
            nypl_type: "bib".to_string(),
        }
    }
}

/// Outcome of a stream write: indexes (into the submitted slice) of
/// records the stream rejected.
#[derive(Debug, Default)]
pub struct WriteOutcome {
    pub failed: Vec<usize>,
}

pub trait MessageStream: Send + Sync {
    fn write(&self, stream: &str, records: &[ProcessedRecord]) -> Result<WriteOutcome, Error>;
}

/// In-memory stream collecting everything written, with an optional
/// count of initial rejections for retry tests.
#[derive(Default)]
pub struct MemoryStream {
    written: Mutex<Vec<ProcessedRecord>>,
    reject_next: Mutex<usize>,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the first `n` records of subsequent writes.
    pub fn reject_next(&self, n: usize) {
        *self.reject_next.lock().unwrap() = n;
    }

    pub fn written(&self) -> Vec<ProcessedRecord> {
        self.written.lock().unwrap().clone()
    }
}

impl MessageStream for MemoryStream {
    fn write(&self, _stream: &str, records: &[ProcessedRecord]) -> Result<WriteOutcome, Error> {
        let mut reject = self.reject_next.lock().unwrap();
        let rejecting = (*reject).min(records.len());
        *reject -= rejecting;
        drop(reject);

        let mut written = self.written.lock().unwrap();
        written.extend(records.iter().skip(rejecting).cloned());
        Ok(WriteOutcome {
            failed: (0..rejecting).collect(),
        })
    }
}

/// Stream persisted as json-lines, one message per line.
pub struct JsonLinesStream {
    path: PathBuf,
}

impl JsonLinesStream {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MessageStream for JsonLinesStream {
    fn write(&self, _stream: &str, records: &[ProcessedRecord]) -> Result<WriteOutcome, Error> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::Notify(format!("{}: {e}", self.path.display())))?;
        for record in records {
            let line =
                serde_json::to_string(record).map_err(|e| Error::Notify(e.to_string()))?;
            writeln!(file, "{line}").map_err(|e| Error::Notify(e.to_string()))?;
        }
        Ok(WriteOutcome::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processed_record_for_sierra_bib() {
        let record = ProcessedRecord::bib("b10681848");
        assert_eq!(record.id, "10681848");
        assert_eq!(record.nypl_source, "sierra-nypl");
        assert_eq!(record.nypl_type, "bib");
    }

    #[test]
    fn processed_record_for_partner_bib() {
        let record = ProcessedRecord::bib("pb9876");
        assert_eq!(record.id, "9876");
        assert_eq!(record.nypl_source, "recap-pul");
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let record = ProcessedRecord::bib("b1");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "1", "nyplSource": "sierra-nypl", "nyplType": "bib"})
        );
    }

    #[test]
    fn memory_stream_reports_failed_subset() {
        let stream = MemoryStream::new();
        stream.reject_next(1);
        let records = vec![ProcessedRecord::bib("b1"), ProcessedRecord::bib("b2")];
        let outcome = stream.write("processed", &records).unwrap();
        assert_eq!(outcome.failed, vec![0]);
        assert_eq!(stream.written().len(), 1);

        // Retry of the failed subset succeeds
        let outcome = stream.write("processed", &records[..1]).unwrap();
        assert!(outcome.failed.is_empty());
        assert_eq!(stream.written().len(), 2);
    }

    #[test]
    fn json_lines_stream_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.ndjson");
        let stream = JsonLinesStream::new(&path);
        stream.write("processed", &[ProcessedRecord::bib("b1")]).unwrap();
        stream.write("processed", &[ProcessedRecord::bib("b2")]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
