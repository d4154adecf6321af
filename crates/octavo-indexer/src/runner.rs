//! Batch orchestration: range partitioning and the bounded worker pool
//!
//! A reindex run partitions `[0, total)` into contiguous per-worker
//! ranges, then a fixed pool of threads claims ranges off a work queue.
//! The pool size is the concurrency ceiling (default 3) and successive
//! range starts are staggered by a fixed delay so workers do not issue
//! their opening range queries against the store simultaneously (a
//! rate-limiting policy, not a correctness requirement).
//!
//! Workers report structured events over a channel; an observer renders
//! them (terminal bars in the CLI, plain logs otherwise). A failed
//! worker's unfinished range is not redispatched: the summary shows
//! processed < total and the operator reruns the range.

use std::sync::mpsc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use octavo_core::{fmt_num, is_shutdown_requested, WorkQueue};

use crate::error::Error;

/// Default simultaneously-active worker ceiling.
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Default delay between successive range starts.
pub const DEFAULT_STAGGER: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Total records to cover.
    pub total: usize,
    /// Number of ranges to partition into.
    pub workers: usize,
    /// Simultaneously-active ceiling (independent of `workers`).
    pub concurrency: usize,
    /// Delay between successive range starts.
    pub stagger: Duration,
}

impl RunnerConfig {
    pub fn new(total: usize, workers: usize) -> Self {
        Self {
            total,
            workers,
            concurrency: DEFAULT_CONCURRENCY,
            stagger: DEFAULT_STAGGER,
        }
    }
}

/// A contiguous, non-overlapping record range assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub worker: usize,
    pub start: usize,
    pub limit: usize,
}

/// Partition `[0, total)` into `ceil(total/workers)`-sized chunks.
pub fn partition(total: usize, workers: usize) -> Vec<Chunk> {
    if total == 0 || workers == 0 {
        return Vec::new();
    }
    let per_worker = total.div_ceil(workers);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < total {
        chunks.push(Chunk {
            worker: chunks.len(),
            start,
            limit: per_worker.min(total - start),
        });
        start += per_worker;
    }
    chunks
}

/// Progress events emitted by workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// Worker claimed its range and is awaiting its first record.
    Started {
        worker: usize,
        start: usize,
        limit: usize,
    },
    /// A batch completed; `records` were written.
    Progress { worker: usize, records: usize },
    /// One record was filtered out before serialization.
    Skipped { worker: usize },
    /// The worker's range failed; the remainder is not redispatched.
    Failed { worker: usize, message: String },
    /// The worker is done with its range.
    Finished { worker: usize },
}

/// Receives every worker event in arrival order.
pub trait ProgressObserver {
    fn on_event(&mut self, event: &WorkerEvent);
}

/// Fallback observer that writes events to the log.
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn on_event(&mut self, event: &WorkerEvent) {
        match event {
            WorkerEvent::Started { worker, start, limit } => {
                log::info!("worker {worker}: start on {limit} record chunk at offset {start}")
            }
            WorkerEvent::Progress { .. } | WorkerEvent::Skipped { .. } => {}
            WorkerEvent::Failed { worker, message } => {
                log::error!("worker {worker}: failed: {message}")
            }
            WorkerEvent::Finished { worker } => log::info!("worker {worker}: finished"),
        }
    }
}

/// Worker-side handle for reporting progress.
pub struct WorkerHandle {
    worker: usize,
    tx: mpsc::Sender<WorkerEvent>,
}

impl WorkerHandle {
    pub fn worker(&self) -> usize {
        self.worker
    }

    /// Report a completed batch of `records`.
    pub fn progress(&self, records: usize) {
        let _ = self.tx.send(WorkerEvent::Progress {
            worker: self.worker,
            records,
        });
    }

    /// Report one record filtered out pre-serialization.
    pub fn skipped(&self) {
        let _ = self.tx.send(WorkerEvent::Skipped {
            worker: self.worker,
        });
    }
}

/// Spaces range starts at least `stagger` apart, pool-wide.
struct LaunchGate {
    stagger: Duration,
    last: Mutex<Option<Instant>>,
}

impl LaunchGate {
    fn new(stagger: Duration) -> Self {
        Self {
            stagger,
            last: Mutex::new(None),
        }
    }

    fn wait_turn(&self) {
        loop {
            let wait = {
                let mut last = self.last.lock().unwrap();
                let now = Instant::now();
                match *last {
                    Some(prev) if now < prev + self.stagger => prev + self.stagger - now,
                    _ => {
                        *last = Some(now);
                        return;
                    }
                }
            };
            std::thread::sleep(wait);
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed_workers: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn log(&self) {
        log::info!("=== Reindex Summary ===");
        log::info!(
            "Records: {}/{} processed ({} skipped)",
            fmt_num(self.processed),
            fmt_num(self.total),
            fmt_num(self.skipped)
        );
        if self.failed_workers > 0 {
            log::warn!(
                "{} worker range(s) failed; rerun those offsets",
                self.failed_workers
            );
        }
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
        if self.processed > 0 && !self.elapsed.is_zero() {
            let rate = self.processed as f64 / self.elapsed.as_secs_f64();
            log::info!("Throughput: {rate:.0} records/sec");
        }
    }
}

/// Run `worker_fn` over every partitioned chunk with the configured
/// concurrency ceiling and stagger. Events stream to `observer` from
/// the calling thread.
pub fn run<F>(
    config: &RunnerConfig,
    worker_fn: F,
    observer: &mut dyn ProgressObserver,
) -> Result<RunSummary, Error>
where
    F: Fn(&WorkerHandle, Chunk) -> Result<(), Error> + Send + Sync,
{
    let started_at = Instant::now();
    let chunks = partition(config.total, config.workers);
    log::info!(
        "Running with {} worker range(s), {} record(s)/range, {} concurrent, {:?} stagger",
        chunks.len(),
        chunks.first().map(|c| c.limit).unwrap_or(0),
        config.concurrency,
        config.stagger
    );

    let queue = WorkQueue::new(chunks);
    let gate = LaunchGate::new(config.stagger);
    let (tx, rx) = mpsc::channel::<WorkerEvent>();

    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut failed_workers = 0usize;

    let pool_size = config.concurrency.clamp(1, queue.total().max(1));
    std::thread::scope(|scope| {
        for _ in 0..pool_size {
            let tx = tx.clone();
            let queue = &queue;
            let gate = &gate;
            let worker_fn = &worker_fn;
            scope.spawn(move || {
                while let Some((_, chunk)) = queue.claim() {
                    if is_shutdown_requested() {
                        break;
                    }
                    gate.wait_turn();
                    let _ = tx.send(WorkerEvent::Started {
                        worker: chunk.worker,
                        start: chunk.start,
                        limit: chunk.limit,
                    });
                    let handle = WorkerHandle {
                        worker: chunk.worker,
                        tx: tx.clone(),
                    };
                    if let Err(e) = worker_fn(&handle, *chunk) {
                        let _ = tx.send(WorkerEvent::Failed {
                            worker: chunk.worker,
                            message: e.to_string(),
                        });
                    }
                    let _ = tx.send(WorkerEvent::Finished {
                        worker: chunk.worker,
                    });
                }
            });
        }
        drop(tx);

        // All senders live in worker threads; the loop ends when the
        // last worker drops its sender.
        for event in rx {
            match &event {
                WorkerEvent::Progress { records, .. } => processed += records,
                WorkerEvent::Skipped { .. } => {
                    skipped += 1;
                    processed += 1;
                }
                WorkerEvent::Failed { .. } => failed_workers += 1,
                _ => {}
            }
            observer.on_event(&event);
        }
    });

    let summary = RunSummary {
        total: config.total,
        processed,
        skipped,
        failed_workers,
        elapsed: started_at.elapsed(),
    };
    summary.log();
    Ok(summary)
}
