//! Logging setup with indicatif integration
//!
//! In TTY mode log lines are routed through `MultiProgress::suspend` so
//! they print above the live worker bars instead of tearing them.

use indicatif::MultiProgress;
use log::{Level, LevelFilter};

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[31m",
        Level::Warn => "\x1b[33m",
        Level::Info => "\x1b[32m",
        Level::Debug => "\x1b[36m",
        Level::Trace => "\x1b[35m",
    }
}

/// Logger that prints through indicatif MultiProgress to avoid mixing with progress bars.
pub struct IndicatifLogger {
    filter: LevelFilter,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(filter: LevelFilter, multi: MultiProgress) -> Self {
        Self { filter, multi }
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = record.level();
        let line = if level >= Level::Debug {
            // Include the module path when debugging
            format!(
                "[{}{}\x1b[0m] {}: {}",
                level_color(level),
                level_label(level),
                record.target(),
                record.args()
            )
        } else {
            format!(
                "[{}{}\x1b[0m] {}",
                level_color(level),
                level_label(level),
                record.args()
            )
        };
        self.multi.suspend(|| eprintln!("{line}"));
    }

    fn flush(&self) {}
}

/// Resolve the default level: `--debug` wins, then quiet (TTY with bars),
/// then info. `RUST_LOG` overrides all of it.
fn default_filter(quiet: bool, debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    }
}

/// Initialize logging. With `multi` set (TTY mode) logs bridge through
/// indicatif; otherwise env_logger prints timestamp-free lines suitable
/// for log aggregation.
pub fn init_logging(quiet: bool, debug: bool, multi: Option<&MultiProgress>) {
    use std::io::Write;

    let fallback = default_filter(quiet, debug);

    if let Some(multi) = multi {
        let filter = match std::env::var("RUST_LOG") {
            Ok(spec) => spec.parse::<LevelFilter>().unwrap_or(fallback),
            Err(_) => fallback,
        };
        log::set_boxed_logger(Box::new(IndicatifLogger::new(filter, multi.clone())))
            .expect("failed to init logger");
        log::set_max_level(filter);
    } else {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(fallback.to_string()),
        )
        .format(|buf, record| {
            writeln!(buf, "[{}] {}", level_label(record.level()), record.args())
        })
        .init();
    }
}
