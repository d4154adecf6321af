//! Listen subcommand - index records one at a time from an event stream
//!
//! Reads json-lines events (`{"uri": "b1234"}`) from a file or stdin;
//! the wire framing upstream of this (Avro over the ingest stream) is
//! external plumbing. Each event triggers a single-record pipeline run.
//! A fatal pipeline error aborts the listener with a non-zero exit so
//! the invoking platform can redeliver the input.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use octavo_core::is_shutdown_requested;
use octavo_indexer::{
    process_uris, JsonDirIndex, JsonLinesStore, JsonLinesStream, MessageStream, PipelineDeps,
    PipelineOptions,
};

use crate::cmd::print_summary;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Event file to read, or "-" for stdin
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Store file (json-lines, one bib's statement rows per line)
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// Skip notifying the processed-documents stream
    #[arg(long)]
    pub no_notify: bool,
}

/// One record event from the ingest stream.
#[derive(Debug, Deserialize)]
struct RecordEvent {
    uri: String,
}

pub fn run(args: ListenArgs, config: &Config) -> Result<()> {
    let store_path = args.store.unwrap_or_else(|| config.store.path.clone());
    let store = JsonLinesStore::open(&store_path)?;
    let index = JsonDirIndex::new(&config.index.dir);
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

    let reader: Box<dyn BufRead> = if args.input == "-" {
        Box::new(std::io::stdin().lock())
    } else {
        let file = std::fs::File::open(&args.input)
            .with_context(|| format!("opening event input {}", args.input))?;
        Box::new(std::io::BufReader::new(file))
    };

    let mut events = 0usize;
    let mut saved = 0usize;
    let mut suppressed = 0usize;
    let mut deleted = 0usize;

    for line in reader.lines() {
        if is_shutdown_requested() {
            log::warn!("shutdown requested, stopping listener");
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: RecordEvent = serde_json::from_str(&line)
            .with_context(|| format!("malformed record event: {line}"))?;
        events += 1;
        log::info!("Processing record {}", event.uri);

        let mut opts = PipelineOptions {
            skip_notification: !notify,
            ..Default::default()
        };
        // Fatal errors propagate: the whole invocation must be reported
        // failed so the input gets redelivered.
        let result = process_uris(&[event.uri], &store, &deps, &mut opts)?;
        saved += result.saved_count;
        suppressed += result.suppressed_count;
        deleted += result.deleted_count;
    }

    print_summary(
        "Listener",
        &[
            ("Events", events.to_string()),
            ("Saved", saved.to_string()),
            ("Suppressed", suppressed.to_string()),
            ("Deleted", deleted.to_string()),
        ],
    );
    Ok(())
}
