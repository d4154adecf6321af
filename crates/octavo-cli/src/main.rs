//! octavo - Bibliographic record indexer
//!
//! Transforms statement-triple records from the discovery store into
//! denormalized search documents, writes them to the search index, and
//! notifies the processed-documents stream. Supports a parallel
//! reindex-everything batch mode and a one-record-at-a-time listener.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use octavo_core::request_shutdown;

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "octavo")]
#[command(about = "Bibliographic record indexer: triple store to search index")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./octavo.toml or ~/.config/octavo/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Reindex records in batch with parallel workers
    Index(cmd::index::IndexArgs),
    /// Listen to a json-lines stream of record events, indexing each
    Listen(cmd::listen::ListenArgs),
    /// Print a record's serialized search document
    Serialize(cmd::serialize::SerializeArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(octavo_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug; progress bars show activity
    //   non-TTY: info unless --debug; logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    octavo_core::init_logging(quiet, cli.debug, multi);

    setup_signal_handler();

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Index(args) => cmd::index::run(args, &config, &progress),
        Command::Listen(args) => cmd::listen::run(args, &config),
        Command::Serialize(args) => cmd::serialize::run(args, &config),
        Command::Config => {
            use comfy_table::{
                modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec!["Store path", &config.store.path.display().to_string()]);
            table.add_row(vec!["Index dir", &config.index.dir.display().to_string()]);
            table.add_row(vec!["Index name", config.index.name()]);
            table.add_row(vec![
                "Stream",
                &if config.stream.enabled {
                    format!("{} ({})", config.stream.name, config.stream.path.display())
                } else {
                    "disabled".to_string()
                },
            ]);
            table.add_row(vec!["Mapping source", &config.mapping.source]);
            table.add_row(vec![
                "Taxonomy",
                &config
                    .taxonomy
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "builtin".to_string()),
            ]);
            table.add_row(vec!["Workers", &config.workers.default.to_string()]);
            table.add_row(vec![
                "Concurrency",
                &config.workers.concurrency.to_string(),
            ]);
            table.add_row(vec![
                "Stagger",
                &format!("{}s", config.workers.stagger_secs),
            ]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}

fn setup_signal_handler() {
    // First signal: set graceful shutdown flag
    // Second signal: force exit (default SIGINT behavior restored)
    // SAFETY: AtomicBool::swap and process::exit are async-signal-safe
    unsafe {
        signal_hook::low_level::register(signal_hook::consts::SIGTERM, || {
            if request_shutdown() {
                std::process::exit(130);
            }
        })
        .expect("Failed to register SIGTERM handler");
        signal_hook::low_level::register(signal_hook::consts::SIGINT, || {
            if request_shutdown() {
                std::process::exit(130);
            }
        })
        .expect("Failed to register SIGINT handler");
    }
}
