//! Declarative field mapping: field name to predicate and output key
//!
//! Field semantics are data, not code: each record type has a mapping
//! table fetched once per process and cached. Unknown field names are a
//! hard error; mapping completeness is a deployment precondition, not a
//! runtime branch.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Record types with their own mapping tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Bib,
    Item,
    Holding,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bib => "bib",
            Self::Item => "item",
            Self::Holding => "holding",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum MappingError {
    /// Unknown field name. Fail fast, the mapping is incomplete.
    UnknownField {
        record_type: RecordType,
        field: String,
    },
    Fetch(String),
    Parse(String),
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { record_type, field } => {
                write!(f, "invalid {record_type} field: {field}")
            }
            Self::Fetch(msg) => write!(f, "mapping fetch failed: {msg}"),
            Self::Parse(msg) => write!(f, "mapping parse failed: {msg}"),
        }
    }
}

impl std::error::Error for MappingError {}

/// One mapping entry: source predicate plus destination document key(s).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub pred: String,
    #[serde(default)]
    json_ld_key: Option<String>,
    #[serde(default)]
    pub index_property_name: Option<String>,
    #[serde(default)]
    pub elastic_search_key: Option<String>,
    #[serde(default)]
    pub parallel_field_name: Option<String>,
}

impl FieldSpec {
    /// Destination key; defaults to the predicate's local part.
    pub fn json_ld_key(&self) -> &str {
        match &self.json_ld_key {
            Some(key) => key,
            None => self.pred.rsplit(':').next().unwrap_or(&self.pred),
        }
    }

    /// Notes index under `indexPropertyName` when present.
    pub fn index_key(&self) -> &str {
        self.index_property_name
            .as_deref()
            .unwrap_or_else(|| self.json_ld_key())
    }
}

/// The full mapping table for one record type.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    record_type: RecordType,
    fields: FxHashMap<String, FieldSpec>,
}

impl FieldMapping {
    pub fn from_json(record_type: RecordType, json: &str) -> Result<Self, MappingError> {
        let fields: FxHashMap<String, FieldSpec> =
            serde_json::from_str(json).map_err(|e| MappingError::Parse(e.to_string()))?;
        Ok(Self {
            record_type,
            fields,
        })
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// Mapping entry for a field name; unknown names are a hard error.
    pub fn spec_for(&self, field: &str) -> Result<&FieldSpec, MappingError> {
        self.fields.get(field).ok_or_else(|| MappingError::UnknownField {
            record_type: self.record_type,
            field: field.to_string(),
        })
    }

    pub fn predicate_for(&self, field: &str) -> Result<&str, MappingError> {
        Ok(&self.spec_for(field)?.pred)
    }

    /// All (name, spec) entries, unordered.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Where mapping tables come from. The fetch is blocking and happens
/// once per record type per process (via [`MappingCache`]).
pub trait MappingSource: Send + Sync {
    fn fetch(&self, record_type: RecordType) -> Result<FieldMapping, MappingError>;
}

/// Mapping tables compiled into the binary.
pub struct BuiltinSource;

impl MappingSource for BuiltinSource {
    fn fetch(&self, record_type: RecordType) -> Result<FieldMapping, MappingError> {
        let json = match record_type {
            RecordType::Bib => include_str!("../data/field-mapping-bib.json"),
            RecordType::Item => include_str!("../data/field-mapping-item.json"),
            RecordType::Holding => include_str!("../data/field-mapping-holding.json"),
        };
        FieldMapping::from_json(record_type, json)
    }
}

/// Mapping tables read from `<dir>/field-mapping-<type>.json`.
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MappingSource for FileSource {
    fn fetch(&self, record_type: RecordType) -> Result<FieldMapping, MappingError> {
        let path = self.dir.join(format!("field-mapping-{record_type}.json"));
        let json = std::fs::read_to_string(&path)
            .map_err(|e| MappingError::Fetch(format!("{}: {e}", path.display())))?;
        FieldMapping::from_json(record_type, &json)
    }
}

/// Mapping tables fetched over HTTP from
/// `<base_url>/field-mapping-<type>.json`.
pub struct HttpSource {
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }
}

impl MappingSource for HttpSource {
    fn fetch(&self, record_type: RecordType) -> Result<FieldMapping, MappingError> {
        let url = format!("{}/field-mapping-{record_type}.json", self.base_url);
        log::debug!("fetching field mapping from {url}");
        let body = ureq::get(&url)
            .call()
            .map_err(|e| MappingError::Fetch(format!("{url}: {e}")))?
            .into_string()
            .map_err(|e| MappingError::Fetch(format!("{url}: {e}")))?;
        FieldMapping::from_json(record_type, &body)
    }
}

/// Process-scoped mapping cache, passed by reference to the serializers.
/// Populated lazily on first access per type, never invalidated within a
/// run; `reset` exists for test isolation.
pub struct MappingCache {
    source: Box<dyn MappingSource>,
    cache: RwLock<FxHashMap<RecordType, Arc<FieldMapping>>>,
}

impl MappingCache {
    pub fn new(source: Box<dyn MappingSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn builtin() -> Self {
        Self::new(Box::new(BuiltinSource))
    }

    pub fn for_type(&self, record_type: RecordType) -> Result<Arc<FieldMapping>, MappingError> {
        if let Some(mapping) = self.cache.read().unwrap().get(&record_type) {
            return Ok(Arc::clone(mapping));
        }
        // First access per type pays the fetch; concurrent losers reuse
        // whichever copy landed first.
        let fetched = Arc::new(self.source.fetch(record_type)?);
        let mut cache = self.cache.write().unwrap();
        Ok(Arc::clone(
            cache.entry(record_type).or_insert(fetched),
        ))
    }

    pub fn reset(&self) {
        self.cache.write().unwrap().clear();
    }
}
