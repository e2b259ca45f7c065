//! Ctrl+C handling.
//!
//! The handler only flips a process-wide flag. The accept wait and the
//! streaming loop poll [`interrupted`] and unwind normally, so every
//! resource is released by its own `Drop`.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Whether Ctrl+C has been received.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Install the Ctrl+C handler. Call once at startup.
pub fn install() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        INTERRUPTED.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, shutting down...");
    })
}
