//! Handles that may be shared with other threads while a parse is running.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

/// Cooperative cancellation flag for a parse run.
///
/// The parser polls the flag once per character, so a cancellation requested
/// from another thread takes effect at the next character boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Asks the parser to stop. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Read-only view of the number of raw bytes decoded so far.
///
/// The counter only grows. It can be sampled from any thread for progress
/// reporting while [`CsvParser::parse`](crate::CsvParser::parse) runs.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    bytes_read: Arc<AtomicU64>,
}

impl Progress {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add(&self, bytes: u64) {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Total bytes consumed from the input so far.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }
}
