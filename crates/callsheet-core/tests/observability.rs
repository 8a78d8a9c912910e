//! Observability tests for upload and rebalance tracing.
//!
//! These tests check that the structured events for each lifecycle step
//! reach the subscriber with the fields operators filter on.

use std::sync::Arc;

use callsheet_core::{
    batch_span, emit_operation_failed, emit_pool_provisioned, emit_rebalance_completed,
    emit_upload_completed, emit_upload_started, DistributionService, EngineConfig,
};
use callsheet_state::MemoryRoster;
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_emit_upload_started_logs_file_name() {
    emit_upload_started("q3-leads.csv");
    assert!(logs_contain("upload.started"));
    assert!(logs_contain("q3-leads.csv"));
}

#[traced_test]
#[test]
fn test_emit_upload_completed_logs_counts() {
    emit_upload_completed("3f2a9c0b11de", 12, 5, 2);
    assert!(logs_contain("upload.completed"));
    assert!(logs_contain("dropped_rows=2"));
}

#[traced_test]
#[test]
fn test_emit_pool_provisioned() {
    emit_pool_provisioned(2, 5);
    assert!(logs_contain("pool.provisioned"));
    assert!(logs_contain("created=5"));
}

#[traced_test]
#[test]
fn test_emit_rebalance_completed() {
    emit_rebalance_completed(7, 3, 2, 4);
    assert!(logs_contain("rebalance.completed"));
    assert!(logs_contain("moved=4"));
}

#[traced_test]
#[test]
fn test_emit_operation_failed_logs_warning() {
    let reason = "missing required columns: Phone";
    emit_operation_failed("upload", "missing_columns", &reason);
    assert!(logs_contain("WARN"));
    assert!(logs_contain("missing_columns"));
}

#[traced_test]
#[test]
fn test_batch_span_enter() {
    let span = batch_span("leads.csv");
    let _entered = span.enter();
    tracing::info!("inside batch");
    assert!(logs_contain("callsheet.batch"));
}

#[traced_test]
#[tokio::test]
async fn test_upload_logs_are_tagged_with_batch_digest() {
    let svc = DistributionService::new(Arc::new(MemoryRoster::new()), EngineConfig::default());
    let outcome = svc
        .upload("leads.csv", b"FirstName,Phone\nAnn,555-0101\n")
        .await
        .unwrap();

    assert!(logs_contain("upload.started"));
    assert!(logs_contain("pool.provisioned"));
    assert!(logs_contain("upload.completed"));
    assert!(logs_contain(&outcome.batch_digest[..12]));
}

#[traced_test]
#[tokio::test]
async fn test_failed_upload_logs_reason_code() {
    let svc = DistributionService::new(Arc::new(MemoryRoster::new()), EngineConfig::default());
    let _ = svc.upload("leads.txt", b"FirstName,Phone\n").await;

    assert!(logs_contain("operation.failed"));
    assert!(logs_contain("unsupported_format"));
}
