//! Octavo Core - Shared infrastructure for the octavo indexing pipelines
//!
//! Progress rendering, logging, work distribution, and shutdown handling
//! used by the indexer and the CLI.

pub mod logging;
pub mod progress;
pub mod shutdown;
pub mod work_queue;

// Re-exports for convenience
pub use logging::{init_logging, IndicatifLogger};
pub use progress::{fmt_num, ProgressContext, SharedProgress};
pub use shutdown::{is_shutdown_requested, request_shutdown};
pub use work_queue::WorkQueue;
