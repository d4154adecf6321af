//! Search index interface
//!
//! The index client is an external collaborator; the pipeline needs bulk
//! save and delete-by-uri. Saves are all-or-nothing from the caller's
//! perspective: any per-document error fails the batch. Deletes are
//! idempotent: deleting a missing document is success.

use std::path::PathBuf;
use std::sync::Mutex;

use rustc_hash::FxHashMap;

use crate::document::Document;
use crate::error::Error;

/// Outcome of a bulk save. `errors` is empty on full success.
#[derive(Debug, Default)]
pub struct SaveOutcome {
    pub errors: Vec<String>,
}

/// Outcome of a delete. `found` is false when the uri was not indexed.
#[derive(Debug)]
pub struct DeleteOutcome {
    pub found: bool,
}

pub trait SearchIndex: Send + Sync {
    fn save(&self, index: &str, documents: &[Document]) -> Result<SaveOutcome, Error>;
    fn delete(&self, index: &str, uri: &str) -> Result<DeleteOutcome, Error>;
}

/// In-memory index keyed by uri, with enough bookkeeping for tests:
/// save-call counts, deleted uris, and optional poisoned uris whose
/// batches report per-document errors.
#[derive(Default)]
pub struct MemoryIndex {
    documents: Mutex<FxHashMap<String, Document>>,
    deleted: Mutex<Vec<String>>,
    save_calls: Mutex<usize>,
    poisoned: Mutex<Vec<String>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any batch containing this uri report a per-document error.
    pub fn poison(&self, uri: &str) {
        self.poisoned.lock().unwrap().push(uri.to_string());
    }

    pub fn document(&self, uri: &str) -> Option<Document> {
        self.documents.lock().unwrap().get(uri).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn deleted_uris(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn save_calls(&self) -> usize {
        *self.save_calls.lock().unwrap()
    }
}

impl SearchIndex for MemoryIndex {
    fn save(&self, _index: &str, documents: &[Document]) -> Result<SaveOutcome, Error> {
        *self.save_calls.lock().unwrap() += 1;
        let poisoned = self.poisoned.lock().unwrap();
        let errors: Vec<String> = documents
            .iter()
            .filter(|d| poisoned.contains(&d.uri().to_string()))
            .map(|d| format!("{}: rejected", d.uri()))
            .collect();
        if !errors.is_empty() {
            return Ok(SaveOutcome { errors });
        }
        let mut store = self.documents.lock().unwrap();
        for doc in documents {
            store.insert(doc.uri().to_string(), doc.clone());
        }
        Ok(SaveOutcome::default())
    }

    fn delete(&self, _index: &str, uri: &str) -> Result<DeleteOutcome, Error> {
        self.deleted.lock().unwrap().push(uri.to_string());
        let found = self.documents.lock().unwrap().remove(uri).is_some();
        Ok(DeleteOutcome { found })
    }
}

/// Index persisted as one JSON file per document under
/// `<dir>/<index>/<uri>.json`, a local stand-in good enough for
/// end-to-end runs and inspection.
pub struct JsonDirIndex {
    dir: PathBuf,
}

impl JsonDirIndex {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, index: &str, uri: &str) -> PathBuf {
        self.dir.join(index).join(format!("{uri}.json"))
    }
}

impl SearchIndex for JsonDirIndex {
    fn save(&self, index: &str, documents: &[Document]) -> Result<SaveOutcome, Error> {
        let index_dir = self.dir.join(index);
        std::fs::create_dir_all(&index_dir)?;
        for doc in documents {
            if doc.uri().is_empty() {
                return Ok(SaveOutcome {
                    errors: vec!["document without uri".to_string()],
                });
            }
            let json = serde_json::to_string_pretty(doc)
                .map_err(|e| Error::IndexWrite(e.to_string()))?;
            std::fs::write(self.path_for(index, doc.uri()), json)?;
        }
        Ok(SaveOutcome::default())
    }

    fn delete(&self, index: &str, uri: &str) -> Result<DeleteOutcome, Error> {
        let path = self.path_for(index, uri);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(DeleteOutcome { found: true }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(DeleteOutcome { found: false })
            }
            Err(e) => Err(Error::Delete(format!("{}: {e}", path.display()))),
        }
    }
}
