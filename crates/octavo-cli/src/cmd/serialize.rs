//! Serialize subcommand - print a record's search document
//!
//! Debugging aid: fetches one bib from the store, runs the full
//! serializer, and prints the resulting document (and the suppression
//! verdict) without touching the index.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use octavo_indexer::{serialize_bib, suppression, JsonLinesStore, RecordStore};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct SerializeArgs {
    /// Record uri to serialize
    #[arg(long)]
    pub uri: String,

    /// Store file (json-lines, one bib's statement rows per line)
    #[arg(short, long)]
    pub store: Option<PathBuf>,
}

pub fn run(args: SerializeArgs, config: &Config) -> Result<()> {
    let store_path = args.store.unwrap_or_else(|| config.store.path.clone());
    let store = JsonLinesStore::open(&store_path)?;
    let taxonomy = config.taxonomy.build()?;
    let mappings = config.mapping.build_cache()?;

    let bib = store
        .bib(&args.uri)?
        .with_context(|| format!("no record {} in {}", args.uri, store_path.display()))?;

    if let Some(reason) = suppression::evaluate(&bib, &taxonomy) {
        log::warn!("{} would be suppressed ({reason})", args.uri);
    }

    let doc = serialize_bib(&bib, &mappings)?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
