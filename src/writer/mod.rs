// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Document writer: intake queue, writer pool and lifecycle.
//!
//! The [`DocWriter`] ties the components together:
//! - bounded intake queue shared by every producer and worker
//! - database registry cache consulted on every `write`
//! - content filter applied by workers before inserting
//! - worker pool with synchronous quadratic-backoff retry
//!
//! # Lifecycle
//!
//! ```text
//! Created → Running → Flushing → Stopped
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use doc_writer::{DocWriter, DocWriterConfig, Document, WriterState};
//! use doc_writer::storage::memory::{MemoryDocumentStore, MemoryMetadataRegistry};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = MemoryDocumentStore::new();
//! let registry = Arc::new(MemoryMetadataRegistry::new());
//! let writer = DocWriter::new(DocWriterConfig::default(), Arc::new(store.clone()), registry)
//!     .await
//!     .expect("registry reachable");
//!
//! writer.start(2);
//! writer.write(Document::new("dataset", "conn", json!({"src": "10.0.0.1"}))).await.unwrap();
//! writer.flush().await;
//!
//! assert_eq!(writer.state(), WriterState::Stopped);
//! assert_eq!(store.documents("dataset", "conn").len(), 1);
//! # }
//! ```

mod types;
mod api;
mod lifecycle;
mod worker;

pub use types::{DocWriterError, WriterState, WriterStats};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::watch;
use tokio_util::task::TaskTracker;

use crate::config::DocWriterConfig;
use crate::document::Document;
use crate::filter::ContentFilter;
use crate::registry::DatabaseRegistry;
use crate::resilience::retry::RetryConfig;
use crate::storage::traits::{DocumentStore, MetadataRegistry};

use types::StatCounters;
use worker::WorkerContext;

/// Concurrent document writer.
///
/// # Thread Safety
///
/// The writer is `Send + Sync`; share it behind an `Arc` and call
/// [`write()`](Self::write) from any number of tasks. Only the owner that
/// decides writing is over should call [`flush()`](Self::flush).
pub struct DocWriter {
    pub(super) config: DocWriterConfig,

    /// Producer side of the intake queue
    pub(super) tx: async_channel::Sender<Document>,

    /// Consumer side, cloned into every worker
    pub(super) rx: async_channel::Receiver<Document>,

    /// Known logical databases
    pub(super) registry: DatabaseRegistry,

    /// Everything a worker needs, shared read-only
    pub(super) ctx: Arc<WorkerContext>,

    /// Set once, by the first successful `start`
    pub(super) started: AtomicBool,

    /// Workers launched by `start`
    pub(super) pool_size: AtomicUsize,

    /// Completion tracker for worker tasks
    pub(super) workers: TaskTracker,

    pub(super) state: watch::Sender<WriterState>,
    pub(super) state_rx: watch::Receiver<WriterState>,
}

impl DocWriter {
    /// Create a writer, seeding the database cache from `registry`.
    ///
    /// The writer starts in `Created`; call [`start()`](Self::start) to launch workers.
    pub async fn new(
        config: DocWriterConfig,
        store: Arc<dyn DocumentStore>,
        registry: Arc<dyn MetadataRegistry>,
    ) -> Result<Self, DocWriterError> {
        let registry = DatabaseRegistry::seeded(registry).await?;
        Ok(Self::with_registry(config, store, registry))
    }

    /// Create a writer around an already-built registry cache.
    pub fn with_registry(
        config: DocWriterConfig,
        store: Arc<dyn DocumentStore>,
        registry: DatabaseRegistry,
    ) -> Self {
        // async-channel panics on a zero capacity bound
        let (tx, rx) = async_channel::bounded(config.queue_capacity.max(1));
        let (state_tx, state_rx) = watch::channel(WriterState::Created);

        let ctx = Arc::new(WorkerContext {
            store,
            filter: ContentFilter::new(config.filter_patterns.clone(), config.import_filtered),
            retry: RetryConfig::from_config(&config),
            stats: StatCounters::default(),
            active: AtomicUsize::new(0),
        });

        Self {
            config,
            tx,
            rx,
            registry,
            ctx,
            started: AtomicBool::new(false),
            pool_size: AtomicUsize::new(0),
            workers: TaskTracker::new(),
            state: state_tx,
            state_rx,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DocWriterConfig {
        &self.config
    }

    /// Get current writer state.
    #[must_use]
    pub fn state(&self) -> WriterState {
        *self.state_rx.borrow()
    }

    /// Get a receiver to watch state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<WriterState> {
        self.state_rx.clone()
    }

    /// Whether the pool has been started.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Number of workers launched by `start` (0 before start).
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool_size.load(Ordering::Acquire)
    }

    /// Workers currently inside their loop.
    #[must_use]
    pub fn active_workers(&self) -> usize {
        self.ctx.active.load(Ordering::Acquire)
    }

    /// Documents waiting in the intake queue.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.tx.len()
    }

    #[must_use]
    pub fn queue_capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(self.config.queue_capacity)
    }

    /// Whether `flush` has closed the queue.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    #[must_use]
    pub fn stats(&self) -> WriterStats {
        self.ctx.stats.snapshot()
    }

    /// Sorted snapshot of the databases this writer knows about.
    pub async fn known_databases(&self) -> Vec<String> {
        self.registry.known_databases().await
    }
}
