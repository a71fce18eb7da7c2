// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for doc-writer.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The parent process is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `doc_writer_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `outcome`: success, error
//! - `attempt`: retry attempt index (0 = first insert)

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record a document accepted onto the intake queue
pub fn record_enqueued() {
    counter!("doc_writer_documents_enqueued_total").increment(1);
}

/// Record a successful insert
pub fn record_written(attempt: u32) {
    counter!(
        "doc_writer_documents_written_total",
        "attempt" => attempt.to_string()
    )
    .increment(1);
}

/// Record a document skipped by the content filter
pub fn record_filtered() {
    counter!("doc_writer_documents_filtered_total").increment(1);
}

/// Record a document dropped after exhausting retries
pub fn record_dropped() {
    counter!("doc_writer_documents_dropped_total").increment(1);
}

/// Record a failed insert attempt
pub fn record_write_failure(attempt: u32, malformed_id: bool) {
    counter!(
        "doc_writer_write_failures_total",
        "attempt" => attempt.to_string(),
        "malformed_id" => malformed_id.to_string()
    )
    .increment(1);
}

/// Record time spent between the first failure and the final outcome
pub fn record_retry_duration(duration: Duration, outcome: &str) {
    histogram!(
        "doc_writer_retry_seconds",
        "outcome" => outcome.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a metadata registration attempt
pub fn record_registration(outcome: &str) {
    counter!(
        "doc_writer_database_registrations_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a write rejected because the queue is closed
pub fn record_rejected_closed() {
    counter!("doc_writer_rejected_closed_total").increment(1);
}

/// Set intake queue depth
pub fn set_queue_depth(depth: usize) {
    gauge!("doc_writer_queue_depth").set(depth as f64);
}

/// Set number of running workers
pub fn set_active_workers(count: usize) {
    gauge!("doc_writer_active_workers").set(count as f64);
}

/// Record how long a flush waited for the pool to drain
pub fn record_flush_duration(duration: Duration) {
    histogram!("doc_writer_flush_seconds").record(duration.as_secs_f64());
}
