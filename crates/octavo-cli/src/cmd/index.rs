//! Index subcommand - batch reindex with parallel workers

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use indicatif::ProgressBar;
use rustc_hash::FxHashMap;

use octavo_core::{fmt_num, SharedProgress};
use octavo_indexer::{
    process_records, process_uris, runner, JsonDirIndex, JsonLinesStore, JsonLinesStream,
    LogObserver, MessageStream, PipelineDeps, PipelineOptions, ProgressObserver, RecordStore,
    RunnerConfig, WorkerEvent,
};

use crate::cmd::print_summary;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Index a single record by uri and exit
    #[arg(long)]
    pub uri: Option<String>,

    /// Store file (json-lines, one bib's statement rows per line)
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// Directory the document index is written to
    #[arg(long)]
    pub index_dir: Option<PathBuf>,

    /// Number of worker ranges to partition into
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Maximum records to process
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Simultaneously active worker ceiling
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Seconds between worker range starts
    #[arg(long)]
    pub stagger_secs: Option<u64>,

    /// Skip notifying the processed-documents stream
    #[arg(long)]
    pub no_notify: bool,

    /// Plain log output instead of live progress bars
    #[arg(long)]
    pub no_screen: bool,
}

pub fn run(args: IndexArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let store_path = args.store.unwrap_or_else(|| config.store.path.clone());
    let store = JsonLinesStore::open(&store_path)?;

    let index_dir = args.index_dir.unwrap_or_else(|| config.index.dir.clone());
    let index = JsonDirIndex::new(&index_dir);

    let notify = config.stream.enabled && !args.no_notify;
    let stream = JsonLinesStream::new(&config.stream.path);
    let taxonomy = config.taxonomy.build()?;
    let mappings = config.mapping.build_cache()?;

    let deps = PipelineDeps {
        index: &index,
        index_name: config.index.name(),
        stream: notify.then_some(&stream as &dyn MessageStream),
        stream_name: &config.stream.name,
        taxonomy: &taxonomy,
        mappings: &mappings,
    };

    log::info!("Writing to {} ({})", config.index.name(), index_dir.display());

    // Single-record mode
    if let Some(uri) = args.uri {
        let mut opts = PipelineOptions {
            skip_notification: !notify,
            ..Default::default()
        };
        let result = process_uris(&[uri], &store, &deps, &mut opts)?;
        print_summary(
            "Index",
            &[
                ("Saved", result.saved_uris.join(", ")),
                ("Suppressed", result.suppressed_uris.join(", ")),
                ("Deleted", result.deleted_uris.join(", ")),
            ],
        );
        return Ok(());
    }

    let mut total = store.count()?;
    if let Some(limit) = args.limit {
        total = total.min(limit);
    }
    if total == 0 {
        log::warn!("Nothing to index");
        return Ok(());
    }

    let runner_config = RunnerConfig {
        total,
        workers: args.workers.unwrap_or(config.workers.default),
        concurrency: args.concurrency.unwrap_or(config.workers.concurrency),
        stagger: Duration::from_secs(args.stagger_secs.unwrap_or(config.workers.stagger_secs)),
    };

    let mut observer: Box<dyn ProgressObserver> = if args.no_screen || !progress.is_tty() {
        Box::new(LogObserver)
    } else {
        Box::new(VizObserver::new(progress.clone(), total as u64))
    };

    let store_ref = &store;
    let deps_ref = &deps;
    let summary = runner::run(
        &runner_config,
        move |handle, chunk| {
            let records = store_ref.bibs(chunk.start, chunk.limit)?;
            let mut opts = PipelineOptions {
                skip_notification: !notify,
                on_batch_complete: Some(Box::new(|n| handle.progress(n))),
                on_record_suppressed: Some(Box::new(|_| handle.skipped())),
            };
            process_records(records, deps_ref, &mut opts)?;
            Ok(())
        },
        observer.as_mut(),
    )?;
    drop(observer);

    print_summary(
        "Reindex",
        &[
            (
                "Records",
                format!(
                    "{}/{} processed ({} skipped)",
                    fmt_num(summary.processed),
                    fmt_num(summary.total),
                    fmt_num(summary.skipped)
                ),
            ),
            ("Workers", runner_config.workers.to_string()),
            ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
        ],
    );

    if summary.failed_workers > 0 {
        anyhow::bail!(
            "{} worker range(s) failed; rerun those offsets",
            summary.failed_workers
        );
    }
    Ok(())
}

/// Renders worker events as indicatif bars: one bar per active worker
/// plus an overall bar across the whole run.
struct VizObserver {
    progress: SharedProgress,
    overall: ProgressBar,
    workers: FxHashMap<usize, ProgressBar>,
}

impl VizObserver {
    fn new(progress: SharedProgress, total: u64) -> Self {
        let overall = progress.overall_bar(total);
        Self {
            progress,
            overall,
            workers: FxHashMap::default(),
        }
    }
}

impl ProgressObserver for VizObserver {
    fn on_event(&mut self, event: &WorkerEvent) {
        match event {
            WorkerEvent::Started {
                worker,
                start,
                limit,
            } => {
                let bar = self
                    .progress
                    .worker_bar(&format!("worker {worker}"), *limit as u64);
                bar.set_message(format!("seeking from offset {start}"));
                self.workers.insert(*worker, bar);
            }
            WorkerEvent::Progress { worker, records } => {
                if let Some(bar) = self.workers.get(worker) {
                    bar.set_message("building");
                    bar.inc(*records as u64);
                }
                self.overall.inc(*records as u64);
            }
            WorkerEvent::Skipped { worker } => {
                if let Some(bar) = self.workers.get(worker) {
                    bar.inc(1);
                }
                self.overall.inc(1);
            }
            WorkerEvent::Failed { worker, message } => {
                self.progress
                    .println(format!("worker {worker} failed: {message}"));
            }
            WorkerEvent::Finished { worker } => {
                if let Some(bar) = self.workers.remove(worker) {
                    bar.finish_and_clear();
                }
            }
        }
    }
}

impl Drop for VizObserver {
    fn drop(&mut self) {
        self.overall.finish_and_clear();
    }
}
