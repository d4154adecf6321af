//! Record store interface
//!
//! The triple store is an external collaborator; the pipeline only needs
//! record lookup by id, range reads for the batch workers, and a total
//! count. Reference implementations: an in-memory store for tests and a
//! json-lines store over fixture files.

use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;

use octavo_model::{Bib, StatementRow};

use crate::error::Error;

pub trait RecordStore: Send + Sync {
    /// Total number of bibs available.
    fn count(&self) -> Result<usize, Error>;

    /// One bib by uri; `Ok(None)` when the id does not resolve.
    fn bib(&self, uri: &str) -> Result<Option<Bib>, Error>;

    /// A contiguous range of bibs in stable store order.
    fn bibs(&self, offset: usize, limit: usize) -> Result<Vec<Bib>, Error>;
}

/// In-memory store over pre-built bibs.
pub struct MemoryStore {
    bibs: Vec<Bib>,
}

impl MemoryStore {
    pub fn new(bibs: Vec<Bib>) -> Self {
        Self { bibs }
    }
}

impl RecordStore for MemoryStore {
    fn count(&self) -> Result<usize, Error> {
        Ok(self.bibs.len())
    }

    fn bib(&self, uri: &str) -> Result<Option<Bib>, Error> {
        Ok(self.bibs.iter().find(|b| b.uri() == uri).cloned())
    }

    fn bibs(&self, offset: usize, limit: usize) -> Result<Vec<Bib>, Error> {
        Ok(self
            .bibs
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// One fixture line: a bib's statement rows plus its children's rows
/// (items/holdings grouped by subject on load).
#[derive(Debug, Deserialize)]
struct BibLine {
    bib: Vec<StatementRow>,
    #[serde(default)]
    items: Vec<StatementRow>,
    #[serde(default)]
    holdings: Vec<StatementRow>,
}

/// Store backed by a json-lines file, loaded eagerly.
#[derive(Debug)]
pub struct JsonLinesStore {
    bibs: Vec<Bib>,
}

impl JsonLinesStore {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Store(format!("{}: {e}", path.display())))?;
        let mut bibs = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let parsed: BibLine = serde_json::from_str(&line).map_err(|e| {
                Error::Store(format!("{} line {}: {e}", path.display(), line_no + 1))
            })?;
            if let Some(bib) = Bib::from_rows(parsed.bib, parsed.items, parsed.holdings) {
                bibs.push(bib);
            }
        }
        log::debug!("loaded {} bib(s) from {}", bibs.len(), path.display());
        Ok(Self { bibs })
    }
}

impl RecordStore for JsonLinesStore {
    fn count(&self) -> Result<usize, Error> {
        Ok(self.bibs.len())
    }

    fn bib(&self, uri: &str) -> Result<Option<Bib>, Error> {
        Ok(self.bibs.iter().find(|b| b.uri() == uri).cloned())
    }

    fn bibs(&self, offset: usize, limit: usize) -> Result<Vec<Bib>, Error> {
        Ok(self
            .bibs
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn memory_store_range_reads() {
        let bibs: Vec<Bib> = ["b1", "b2", "b3"]
            .iter()
            .map(|uri| Bib::new(octavo_model::Record::new(*uri, vec![])))
            .collect();
        let store = MemoryStore::new(bibs);
        assert_eq!(store.count().unwrap(), 3);
        let range = store.bibs(1, 2).unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(range[0].uri(), "b2");
        assert!(store.bib("b3").unwrap().is_some());
        assert!(store.bib("b9").unwrap().is_none());
    }

    #[test]
    fn json_lines_store_loads_bibs_and_children() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"bib": [{{"subject_id": "b1", "predicate": "dcterms:title", "object_literal": "T"}}], "items": [{{"subject_id": "i1", "predicate": "nypl:shelfMark", "object_literal": "Box 1"}}]}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"bib": [{{"subject_id": "b2", "predicate": "dcterms:title", "object_literal": "U"}}]}}"#
        )
        .unwrap();

        let store = JsonLinesStore::open(file.path()).unwrap();
        assert_eq!(store.count().unwrap(), 2);
        let bib = store.bib("b1").unwrap().unwrap();
        assert_eq!(bib.items.len(), 1);
        assert_eq!(bib.items[0].uri(), "i1");
    }

    #[test]
    fn json_lines_store_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        let err = JsonLinesStore::open(file.path()).unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }
}
