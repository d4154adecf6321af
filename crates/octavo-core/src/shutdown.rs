//! Graceful shutdown support via atomic flag
//!
//! Workers check the flag between chunks; the pipeline checks it between
//! batches. The CLI wires SIGINT/SIGTERM to `request_shutdown`.

use std::sync::atomic::{AtomicBool, Ordering};

static FLAG: AtomicBool = AtomicBool::new(false);

/// Check if shutdown was requested
pub fn is_shutdown_requested() -> bool {
    FLAG.load(Ordering::Relaxed)
}

/// Request shutdown (for signal handlers). Returns whether shutdown had
/// already been requested, so a second signal can force-exit.
pub fn request_shutdown() -> bool {
    FLAG.swap(true, Ordering::Relaxed)
}
