//! Octavo Indexer - Record-to-document transformation and indexing
//!
//! The core of the system: serializes statement-model records into
//! search documents through the declarative field mapping, applies the
//! suppression/research rules, and drives the batch pipeline that
//! writes documents to the index and notifies the downstream stream.
//! The batch orchestrator fans the pipeline out over range-partitioned
//! workers with bounded concurrency.

pub mod document;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod runner;
pub mod serializer;
pub mod shelfmark;
pub mod store;
pub mod stream;
pub mod suppression;
pub mod text;

pub use document::Document;
pub use error::Error;
pub use index::{DeleteOutcome, JsonDirIndex, MemoryIndex, SaveOutcome, SearchIndex};
pub use pipeline::{
    process_records, process_uris, IndexingResult, PipelineDeps, PipelineOptions, BATCH_SIZE,
};
pub use runner::{
    partition, Chunk, LogObserver, ProgressObserver, RunSummary, RunnerConfig, WorkerEvent,
    WorkerHandle,
};
pub use serializer::{serialize_bib, serialize_holding, serialize_item};
pub use store::{JsonLinesStore, MemoryStore, RecordStore};
pub use stream::{JsonLinesStream, MemoryStream, MessageStream, ProcessedRecord, WriteOutcome};
pub use suppression::SuppressionReason;
