//! Structured observability hooks for upload and rebalance events.
//!
//! This module provides:
//! - A batch-scoped tracing span for each upload
//! - Emission functions for key events: upload start/finish, pool
//!   provisioning, rebalance, and failures
//!
//! Events are emitted at `info!` level (failures at `warn!`). Filter with
//! `RUST_LOG`; pass `--json` to the CLI for JSON output.

use tracing::info;

/// Span that groups every log line of one upload.
///
/// The `batch` field starts empty and is filled with the short digest once
/// the payload has been read.
///
/// # Example
///
/// ```ignore
/// let span = batch_span("leads.csv");
/// async { /* ... */ }.instrument(span).await;
/// ```
pub fn batch_span(file_name: &str) -> tracing::Span {
    tracing::info_span!(
        "callsheet.batch",
        file_name = %file_name,
        batch = tracing::field::Empty,
    )
}

/// Emit event: an upload was received and decoding begins.
pub fn emit_upload_started(file_name: &str) {
    info!(event = "upload.started", file_name = %file_name);
}

/// Emit event: an upload was distributed and persisted.
pub fn emit_upload_completed(batch: &str, contacts: usize, agents: usize, dropped_rows: usize) {
    info!(
        event = "upload.completed",
        batch = %batch,
        contacts = contacts,
        agents = agents,
        dropped_rows = dropped_rows,
    );
}

/// Emit event: an undersized pool was replaced with synthetic agents.
pub fn emit_pool_provisioned(replaced: usize, created: usize) {
    info!(
        event = "pool.provisioned",
        replaced = replaced,
        created = created,
    );
}

/// Emit event: a rebalance was applied.
pub fn emit_rebalance_completed(contacts: usize, agents: usize, base: usize, moved: usize) {
    info!(
        event = "rebalance.completed",
        contacts = contacts,
        agents = agents,
        base = base,
        moved = moved,
    );
}

/// Emit event: an operation failed (warning level).
pub fn emit_operation_failed(operation: &str, code: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(
        event = "operation.failed",
        operation = %operation,
        code = %code,
        error = %error,
    );
}
