//! Global atomic counters for Callsheet.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single `tracing::info!`
//! event (e.g. before a CLI command exits).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    uploads_completed: AtomicU64,
    contacts_ingested: AtomicU64,
    rows_dropped: AtomicU64,
    rebalances_applied: AtomicU64,
    placeholder_agents_created: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            uploads_completed: AtomicU64::new(0),
            contacts_ingested: AtomicU64::new(0),
            rows_dropped: AtomicU64::new(0),
            rebalances_applied: AtomicU64::new(0),
            placeholder_agents_created: AtomicU64::new(0),
        }
    }

    /// Record one persisted upload.
    pub fn record_upload(&self, contacts: usize, dropped: usize) {
        self.uploads_completed.fetch_add(1, Ordering::Relaxed);
        self.contacts_ingested
            .fetch_add(contacts as u64, Ordering::Relaxed);
        self.rows_dropped.fetch_add(dropped as u64, Ordering::Relaxed);
        tracing::trace!(metric = "uploads_completed", "counter incremented");
    }

    pub fn inc_rebalances(&self) {
        self.rebalances_applied.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "rebalances_applied", "counter incremented");
    }

    pub fn add_placeholder_agents(&self, count: usize) {
        self.placeholder_agents_created
            .fetch_add(count as u64, Ordering::Relaxed);
        tracing::trace!(metric = "placeholder_agents_created", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            uploads_completed = self.uploads_completed(),
            contacts_ingested = self.contacts_ingested(),
            rows_dropped = self.rows_dropped(),
            rebalances_applied = self.rebalances_applied(),
            placeholder_agents_created = self.placeholder_agents_created(),
        );
    }

    pub fn uploads_completed(&self) -> u64 {
        self.uploads_completed.load(Ordering::Relaxed)
    }

    pub fn contacts_ingested(&self) -> u64 {
        self.contacts_ingested.load(Ordering::Relaxed)
    }

    pub fn rows_dropped(&self) -> u64 {
        self.rows_dropped.load(Ordering::Relaxed)
    }

    pub fn rebalances_applied(&self) -> u64 {
        self.rebalances_applied.load(Ordering::Relaxed)
    }

    pub fn placeholder_agents_created(&self) -> u64 {
        self.placeholder_agents_created.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.uploads_completed.store(0, Ordering::Relaxed);
        self.contacts_ingested.store(0, Ordering::Relaxed);
        self.rows_dropped.store(0, Ordering::Relaxed);
        self.rebalances_applied.store(0, Ordering::Relaxed);
        self.placeholder_agents_created.store(0, Ordering::Relaxed);
    }
}
