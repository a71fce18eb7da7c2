// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Worker loop: filter, insert, retry.
//!
//! Each worker owns nothing but its queue receiver. Every insert attempt opens
//! a fresh session from the store and drops it when the attempt ends, so no
//! session is ever touched by two workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::document::Document;
use crate::filter::{ContentFilter, FilterDecision};
use crate::resilience::retry::{retry, RetryConfig};
use crate::storage::traits::{DocumentStore, StorageError};

use super::types::StatCounters;

pub(super) struct WorkerContext {
    pub store: Arc<dyn DocumentStore>,
    pub filter: ContentFilter,
    pub retry: RetryConfig,
    pub stats: StatCounters,
    pub active: AtomicUsize,
}

/// Consume the queue until it is closed and empty.
pub(super) async fn run(id: usize, rx: async_channel::Receiver<Document>, ctx: Arc<WorkerContext>) {
    let active = ctx.active.fetch_add(1, Ordering::AcqRel) + 1;
    crate::metrics::set_active_workers(active);
    debug!(worker = id, "Write loop started");

    while let Ok(doc) = rx.recv().await {
        debug!(worker = id, write_chan_count = rx.len(), "Write loop status");
        crate::metrics::set_queue_depth(rx.len());
        ctx.process(id, doc).await;
    }

    info!(worker = id, "Write loop got closed channel, exiting");
    let active = ctx.active.fetch_sub(1, Ordering::AcqRel) - 1;
    crate::metrics::set_active_workers(active);
}

impl WorkerContext {
    async fn process(&self, worker: usize, doc: Document) {
        match self.filter.decide(doc.source.as_deref()) {
            FilterDecision::Skip => {
                StatCounters::bump(&self.stats.filtered);
                crate::metrics::record_filtered();
                debug!(
                    worker,
                    database = %doc.database,
                    collection = %doc.collection,
                    source = ?doc.source,
                    "Skipping filtered document"
                );
                return;
            }
            FilterDecision::WriteOverridden => {
                debug!(worker, source = ?doc.source, "Importing filtered document");
            }
            FilterDecision::Write => {}
        }

        let started = Instant::now();
        let doc_ref = &doc;
        let result = retry("insert", &self.retry, move |attempt| {
            self.attempt_insert(worker, doc_ref, attempt)
        })
        .await;

        match result {
            Ok(0) => {
                StatCounters::bump(&self.stats.written);
                crate::metrics::record_written(0);
            }
            Ok(attempt) => {
                StatCounters::bump(&self.stats.written);
                StatCounters::bump(&self.stats.recovered);
                crate::metrics::record_written(attempt);
                crate::metrics::record_retry_duration(started.elapsed(), "success");
            }
            Err(e) => {
                StatCounters::bump(&self.stats.dropped);
                crate::metrics::record_dropped();
                crate::metrics::record_retry_duration(started.elapsed(), "exhausted");
                error!(
                    worker,
                    database = %doc.database,
                    collection = %doc.collection,
                    attempts = self.retry.max_attempts.max(1),
                    error = %e,
                    "Dropping document after exhausting retries"
                );
            }
        }
    }

    /// One insert on a fresh session. Returns the attempt index on success.
    async fn attempt_insert(&self, worker: usize, doc: &Document, attempt: u32) -> Result<u32, StorageError> {
        let result = {
            let mut session = self.store.session();
            session.insert(&doc.database, &doc.collection, &doc.payload).await
        };

        match result {
            Ok(()) => {
                if attempt > 0 {
                    info!(worker, attempt, database = %doc.database, "Write succeeded");
                }
                Ok(attempt)
            }
            Err(e) => {
                self.report_failure(worker, doc, &e, attempt);
                Err(e)
            }
        }
    }

    fn report_failure(&self, worker: usize, doc: &Document, err: &StorageError, attempt: u32) {
        StatCounters::bump(&self.stats.failed_attempts);
        crate::metrics::record_write_failure(attempt, err.is_malformed_id());

        if err.is_malformed_id() {
            error!(
                worker,
                database = %doc.database,
                collection = %doc.collection,
                payload = %doc.payload_dump(),
                "Malformed document identifier"
            );
        }

        error!(
            worker,
            database = %doc.database,
            collection = %doc.collection,
            error = %err,
            falloff = attempt,
            "Database write failure"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use crate::storage::memory::MemoryDocumentStore;
    use crate::storage::traits::DocumentSession;

    /// Fails the first `failures` inserts, then delegates
    struct FlakyStore {
        inner: MemoryDocumentStore,
        failures: Arc<AtomicU32>,
        error: StorageError,
    }

    struct FlakySession {
        inner: Box<dyn DocumentSession>,
        failures: Arc<AtomicU32>,
        error: StorageError,
    }

    impl DocumentStore for FlakyStore {
        fn session(&self) -> Box<dyn DocumentSession> {
            Box::new(FlakySession {
                inner: self.inner.session(),
                failures: self.failures.clone(),
                error: self.error.clone(),
            })
        }
    }

    #[async_trait]
    impl DocumentSession for FlakySession {
        async fn insert(&mut self, database: &str, collection: &str, document: &Value) -> Result<(), StorageError> {
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(self.error.clone());
            }
            self.inner.insert(database, collection, document).await
        }
    }

    fn context(store: Arc<dyn DocumentStore>, filter: ContentFilter) -> WorkerContext {
        WorkerContext {
            store,
            filter,
            retry: RetryConfig::test(),
            stats: StatCounters::default(),
            active: AtomicUsize::new(0),
        }
    }

    fn flaky(failures: u32, error: StorageError) -> (MemoryDocumentStore, Arc<FlakyStore>) {
        let inner = MemoryDocumentStore::new();
        let store = Arc::new(FlakyStore {
            inner: inner.clone(),
            failures: Arc::new(AtomicU32::new(failures)),
            error,
        });
        (inner, store)
    }

    #[tokio::test]
    async fn test_process_writes_document() {
        let store = MemoryDocumentStore::new();
        let ctx = context(Arc::new(store.clone()), ContentFilter::default());

        ctx.process(0, Document::new("db", "conn", json!({"n": 1}))).await;

        assert_eq!(store.documents("db", "conn").len(), 1);
        let stats = ctx.stats.snapshot();
        assert_eq!(stats.written, 1);
        assert_eq!(stats.failed_attempts, 0);
    }

    #[tokio::test]
    async fn test_process_skips_filtered_document() {
        let store = MemoryDocumentStore::new();
        let ctx = context(
            Arc::new(store.clone()),
            ContentFilter::new(vec!["blocked".into()], false),
        );

        ctx.process(0, Document::new("db", "c", json!({})).with_source("blocked.example")).await;

        assert!(store.is_empty());
        assert_eq!(store.sessions_opened(), 0);
        assert_eq!(ctx.stats.snapshot().filtered, 1);
    }

    #[tokio::test]
    async fn test_process_imports_filtered_with_override() {
        let store = MemoryDocumentStore::new();
        let ctx = context(
            Arc::new(store.clone()),
            ContentFilter::new(vec!["blocked".into()], true),
        );

        ctx.process(0, Document::new("db", "c", json!({})).with_source("blocked.example")).await;

        assert_eq!(store.len(), 1);
        let stats = ctx.stats.snapshot();
        assert_eq!(stats.written, 1);
        assert_eq!(stats.filtered, 0);
    }

    #[tokio::test]
    async fn test_transient_failure_recovers() {
        let (inner, store) = flaky(2, StorageError::Backend("connection reset".into()));
        let ctx = context(store, ContentFilter::default());

        ctx.process(0, Document::new("db", "c", json!({"n": 1}))).await;

        assert_eq!(inner.len(), 1);
        let stats = ctx.stats.snapshot();
        assert_eq!(stats.failed_attempts, 2);
        assert_eq!(stats.written, 1);
        assert_eq!(stats.recovered, 1);
        assert_eq!(stats.dropped, 0);
        // One fresh session per attempt
        assert_eq!(inner.sessions_opened(), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_drops_after_max_attempts() {
        let (inner, store) = flaky(u32::MAX, StorageError::Backend("rejected".into()));
        let ctx = context(store, ContentFilter::default());

        ctx.process(0, Document::new("db", "c", json!({"n": 1}))).await;

        assert!(inner.is_empty());
        let stats = ctx.stats.snapshot();
        assert_eq!(stats.failed_attempts, 5);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.written, 0);
    }

    #[tokio::test]
    async fn test_malformed_id_follows_retry_path() {
        let (inner, store) = flaky(1, StorageError::MalformedId("ObjectIDs must be exactly 12 bytes".into()));
        let ctx = context(store, ContentFilter::default());

        ctx.process(0, Document::new("db", "c", json!({"_id": "short"}))).await;

        assert_eq!(inner.len(), 1);
        assert_eq!(ctx.stats.snapshot().recovered, 1);
    }

    #[tokio::test]
    async fn test_run_exits_on_closed_empty_queue() {
        let store = MemoryDocumentStore::new();
        let ctx = Arc::new(context(Arc::new(store.clone()), ContentFilter::default()));
        let (tx, rx) = async_channel::bounded(4);

        for i in 0..3 {
            tx.send(Document::new("db", "c", json!({ "i": i }))).await.unwrap();
        }
        tx.close();

        run(0, rx, ctx.clone()).await;

        assert_eq!(store.len(), 3);
        assert_eq!(ctx.active.load(Ordering::SeqCst), 0);
    }
}
