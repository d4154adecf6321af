//! Indexing pipeline: suppress, serialize, batch, write, notify
//!
//! Records flow through one at a time; survivors batch up (100 per
//! batch, arrival order) and each batch is bulk-written before the next
//! is assembled, so exactly one write is in flight. A batch write
//! reporting per-document errors is fatal to the run; silent data loss
//! is unacceptable. Stream notification after a successful write is
//! best-effort.

use octavo_core::is_shutdown_requested;
use octavo_model::{Bib, MappingCache, Taxonomy};

use crate::document::Document;
use crate::error::Error;
use crate::index::SearchIndex;
use crate::serializer::serialize_bib;
use crate::store::RecordStore;
use crate::stream::{MessageStream, ProcessedRecord};
use crate::suppression;

/// Documents per bulk write.
pub const BATCH_SIZE: usize = 100;

/// Collaborators the pipeline writes to.
pub struct PipelineDeps<'a> {
    pub index: &'a dyn SearchIndex,
    pub index_name: &'a str,
    pub stream: Option<&'a dyn MessageStream>,
    pub stream_name: &'a str,
    pub taxonomy: &'a dyn Taxonomy,
    pub mappings: &'a MappingCache,
}

/// Per-run options and progress callbacks.
#[derive(Default)]
pub struct PipelineOptions<'a> {
    /// Skip downstream notification entirely.
    pub skip_notification: bool,
    pub on_batch_complete: Option<Box<dyn FnMut(usize) + 'a>>,
    pub on_record_suppressed: Option<Box<dyn FnMut(&Bib) + 'a>>,
}

/// Accumulated accounting for one pipeline run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IndexingResult {
    pub saved_count: usize,
    pub saved_uris: Vec<String>,
    pub suppressed_count: usize,
    pub suppressed_uris: Vec<String>,
    pub deleted_count: usize,
    pub deleted_uris: Vec<String>,
}

/// Process a sequence of bibs: evaluate suppression (issuing retracting
/// deletes), serialize survivors, and write them out in batches.
pub fn process_records<I>(
    records: I,
    deps: &PipelineDeps,
    opts: &mut PipelineOptions,
) -> Result<IndexingResult, Error>
where
    I: IntoIterator<Item = Bib>,
{
    let mut result = IndexingResult::default();
    let mut batch: Vec<Document> = Vec::with_capacity(BATCH_SIZE);

    for bib in records {
        if is_shutdown_requested() {
            log::warn!("shutdown requested, stopping after {} record(s)", result.saved_count);
            break;
        }

        if let Some(reason) = suppression::evaluate(&bib, deps.taxonomy) {
            log::info!("Suppressing ({reason}) {}", bib.uri());
            delete_resource(deps, bib.uri());
            result.suppressed_count += 1;
            result.suppressed_uris.push(bib.uri().to_string());
            if let Some(cb) = opts.on_record_suppressed.as_mut() {
                cb(&bib);
            }
            continue;
        }

        batch.push(serialize_bib(&bib, deps.mappings)?);
        if batch.len() >= BATCH_SIZE {
            flush_batch(&mut batch, deps, opts, &mut result)?;
        }
    }

    if !batch.is_empty() {
        flush_batch(&mut batch, deps, opts, &mut result)?;
    }

    Ok(result)
}

/// Process an explicit id list: ids that cannot be fetched from the
/// store are retracted from the index (they were deleted upstream or
/// never existed) and reported separately from suppressions.
pub fn process_uris(
    uris: &[String],
    store: &dyn RecordStore,
    deps: &PipelineDeps,
    opts: &mut PipelineOptions,
) -> Result<IndexingResult, Error> {
    let mut seen = Vec::new();
    let mut bibs = Vec::new();
    let mut missing = Vec::new();

    for uri in uris {
        if seen.contains(uri) {
            continue;
        }
        seen.push(uri.clone());
        match store.bib(uri) {
            Ok(Some(bib)) => bibs.push(bib),
            Ok(None) => missing.push(uri.clone()),
            Err(Error::StoreNotFound(_)) => {
                log::info!("Invalid bib id: {uri}. Moving on.");
                missing.push(uri.clone());
            }
            // Anything else is probably not record-specific; stop here.
            Err(e) => return Err(e),
        }
    }

    if !missing.is_empty() {
        log::info!("Issuing DELETE on invalid bib ids: {}", missing.join(", "));
        for uri in &missing {
            delete_resource(deps, uri);
        }
    }

    let mut result = process_records(bibs, deps, opts)?;
    result.deleted_count = missing.len();
    result.deleted_uris = missing;
    Ok(result)
}

/// Delete a document by uri, tolerating absence (a suppression usually
/// retracts something that was never indexed). Other failures are
/// logged and swallowed; suppression accounting must not block on the
/// delete outcome.
pub fn delete_resource(deps: &PipelineDeps, uri: &str) {
    match deps.index.delete(deps.index_name, uri) {
        Ok(outcome) => {
            if !outcome.found {
                log::debug!("Failed to delete {uri} because it does not exist");
            }
        }
        Err(e) => log::error!("Failed to delete {uri}: {e}"),
    }
}

fn flush_batch(
    batch: &mut Vec<Document>,
    deps: &PipelineDeps,
    opts: &mut PipelineOptions,
    result: &mut IndexingResult,
) -> Result<(), Error> {
    log::debug!("Saving batch of {} resource(s)", batch.len());
    let outcome = deps.index.save(deps.index_name, batch)?;
    if !outcome.errors.is_empty() {
        return Err(Error::IndexWrite(format!(
            "index reports {} error(s): {}",
            outcome.errors.len(),
            outcome.errors.join("; ")
        )));
    }

    if !opts.skip_notification {
        notify_processed(deps, batch);
    }

    let batch_size = batch.len();
    for doc in batch.drain(..) {
        result.saved_count += 1;
        result.saved_uris.push(doc.uri().to_string());
    }
    if let Some(cb) = opts.on_batch_complete.as_mut() {
        cb(batch_size);
    }
    Ok(())
}

/// Best-effort stream notification; a partial failure retries just the
/// failed subset once before giving up.
fn notify_processed(deps: &PipelineDeps, batch: &[Document]) {
    let Some(stream) = deps.stream else {
        log::warn!("Attempting to notify processed-documents stream, but no stream configured");
        return;
    };

    let records: Vec<ProcessedRecord> =
        batch.iter().map(|doc| ProcessedRecord::bib(doc.uri())).collect();

    match stream.write(deps.stream_name, &records) {
        Ok(outcome) if outcome.failed.is_empty() => {
            log::info!("Wrote {} record(s) to {}", records.len(), deps.stream_name);
        }
        Ok(outcome) => {
            let retry: Vec<ProcessedRecord> = outcome
                .failed
                .iter()
                .filter_map(|i| records.get(*i).cloned())
                .collect();
            log::warn!(
                "{} record(s) failed writing to {}, retrying those",
                retry.len(),
                deps.stream_name
            );
            match stream.write(deps.stream_name, &retry) {
                Ok(second) if second.failed.is_empty() => {}
                Ok(second) => log::error!(
                    "Error writing to {}: {} record(s) failed after retry",
                    deps.stream_name,
                    second.failed.len()
                ),
                Err(e) => log::error!("Error writing to {}: {e}", deps.stream_name),
            }
        }
        Err(e) => log::error!("Error writing to {}: {e}", deps.stream_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;
    use crate::stream::MemoryStream;
    use octavo_model::{predicates, Record, Statement, StaticTaxonomy};

    fn research_bib(uri: &str) -> Bib {
        Bib::new(Record::new(
            uri,
            vec![Statement::literal(uri, "dcterms:title", format!("Title {uri}"))],
        ))
    }

    fn suppressed_bib(uri: &str) -> Bib {
        Bib::new(Record::new(
            uri,
            vec![Statement::literal(uri, predicates::SUPPRESSED, "true")],
        ))
    }

    struct Fixture {
        index: MemoryIndex,
        stream: MemoryStream,
        taxonomy: StaticTaxonomy,
        mappings: MappingCache,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                index: MemoryIndex::new(),
                stream: MemoryStream::new(),
                taxonomy: StaticTaxonomy::builtin(),
                mappings: MappingCache::builtin(),
            }
        }

        fn deps(&self) -> PipelineDeps<'_> {
            PipelineDeps {
                index: &self.index,
                index_name: "resources",
                stream: Some(&self.stream),
                stream_name: "processed",
                taxonomy: &self.taxonomy,
                mappings: &self.mappings,
            }
        }
    }

    #[test]
    fn saves_valid_bibs() {
        let fx = Fixture::new();
        let result = process_records(
            vec![research_bib("b1"), research_bib("b2")],
            &fx.deps(),
            &mut PipelineOptions::default(),
        )
        .unwrap();

        assert_eq!(result.saved_count, 2);
        assert_eq!(result.saved_uris, vec!["b1", "b2"]);
        assert_eq!(result.suppressed_count, 0);
        assert_eq!(fx.index.len(), 2);
        assert_eq!(fx.index.save_calls(), 1);
        assert_eq!(fx.stream.written().len(), 2);
    }

    #[test]
    fn suppressed_bib_is_deleted_not_saved() {
        let fx = Fixture::new();
        let result = process_records(
            vec![research_bib("b1"), suppressed_bib("b2")],
            &fx.deps(),
            &mut PipelineOptions::default(),
        )
        .unwrap();

        assert_eq!(result.saved_count, 1);
        assert_eq!(result.suppressed_count, 1);
        assert_eq!(result.suppressed_uris, vec!["b2"]);
        assert_eq!(fx.index.deleted_uris(), vec!["b2"]);
        assert!(fx.index.document("b2").is_none());
        assert!(fx.index.document("b1").is_some());
    }

    #[test]
    fn batch_write_errors_are_fatal() {
        let fx = Fixture::new();
        fx.index.poison("b2");
        let err = process_records(
            vec![research_bib("b1"), research_bib("b2")],
            &fx.deps(),
            &mut PipelineOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::IndexWrite(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn notification_failures_do_not_fail_the_batch() {
        let fx = Fixture::new();
        // First write rejects everything; the retry subset also rejects.
        fx.stream.reject_next(4);
        let result = process_records(
            vec![research_bib("b1"), research_bib("b2")],
            &fx.deps(),
            &mut PipelineOptions::default(),
        )
        .unwrap();
        assert_eq!(result.saved_count, 2);
        assert_eq!(fx.index.len(), 2);
    }

    #[test]
    fn partial_stream_failure_retries_failed_subset() {
        let fx = Fixture::new();
        fx.stream.reject_next(1);
        let result = process_records(
            vec![research_bib("b1"), research_bib("b2")],
            &fx.deps(),
            &mut PipelineOptions::default(),
        )
        .unwrap();
        assert_eq!(result.saved_count, 2);
        // b2 landed on the first write, b1 on the retry
        assert_eq!(fx.stream.written().len(), 2);
    }

    #[test]
    fn skip_notification_option() {
        let fx = Fixture::new();
        let mut opts = PipelineOptions {
            skip_notification: true,
            ..Default::default()
        };
        process_records(vec![research_bib("b1")], &fx.deps(), &mut opts).unwrap();
        assert!(fx.stream.written().is_empty());
    }

    #[test]
    fn callbacks_fire() {
        let fx = Fixture::new();
        let mut batches = Vec::new();
        let mut suppressed = Vec::new();
        let mut opts = PipelineOptions {
            skip_notification: false,
            on_batch_complete: Some(Box::new(|n| batches.push(n))),
            on_record_suppressed: Some(Box::new(|bib: &Bib| {
                suppressed.push(bib.uri().to_string())
            })),
        };
        process_records(
            vec![research_bib("b1"), suppressed_bib("b2")],
            &fx.deps(),
            &mut opts,
        )
        .unwrap();
        drop(opts);
        assert_eq!(batches, vec![1]);
        assert_eq!(suppressed, vec!["b2"]);
    }

    #[test]
    fn process_uris_deletes_unfetchable_ids() {
        use crate::store::MemoryStore;

        let fx = Fixture::new();
        let store = MemoryStore::new(vec![research_bib("b1"), suppressed_bib("b2")]);
        let uris: Vec<String> = ["b1", "b2", "bmissing", "b1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result =
            process_uris(&uris, &store, &fx.deps(), &mut PipelineOptions::default()).unwrap();

        assert_eq!(result.saved_count, 1);
        assert_eq!(result.saved_uris, vec!["b1"]);
        assert_eq!(result.suppressed_count, 1);
        assert_eq!(result.deleted_count, 1);
        assert_eq!(result.deleted_uris, vec!["bmissing"]);
        // Unfetchable ids are deleted before suppression deletes
        assert_eq!(fx.index.deleted_uris(), vec!["bmissing", "b2"]);
    }

    #[test]
    fn batches_split_at_batch_size() {
        let fx = Fixture::new();
        let bibs: Vec<Bib> = (0..BATCH_SIZE + 5)
            .map(|i| research_bib(&format!("b{i}")))
            .collect();
        let mut batches = Vec::new();
        let mut opts = PipelineOptions {
            skip_notification: true,
            on_batch_complete: Some(Box::new(|n| batches.push(n))),
            ..Default::default()
        };
        let result = process_records(bibs, &fx.deps(), &mut opts).unwrap();
        drop(opts);
        assert_eq!(result.saved_count, BATCH_SIZE + 5);
        assert_eq!(batches, vec![BATCH_SIZE, 5]);
        assert_eq!(fx.index.save_calls(), 2);
    }
}
