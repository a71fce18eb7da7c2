// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Doc Writer
//!
//! A concurrent document writer: many producers fan in through a bounded queue
//! to a pool of workers that insert into a document database.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Producers                             │
//! │  • write(doc): prefix database, register it, enqueue       │
//! │  • Blocks while the queue is full                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Intake Queue (bounded MPMC)                 │
//! │  • Default capacity 5000                                   │
//! │  • Closed by flush(); later writes get QueueClosed         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Writer Workers (N)                      │
//! │  • Content filter on the document source                   │
//! │  • Insert on a fresh session                               │
//! │  • Quadratic backoff retry: 0, 1, 4, 9, 16 units           │
//! │  • Exhausted → logged and dropped                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use doc_writer::{DocWriter, DocWriterConfig, Document};
//! use doc_writer::storage::memory::{MemoryDocumentStore, MemoryMetadataRegistry};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = DocWriterConfig {
//!         database_prefix: "site1-".into(),
//!         ..Default::default()
//!     };
//!     let store = Arc::new(MemoryDocumentStore::new());
//!     let registry = Arc::new(MemoryMetadataRegistry::new());
//!
//!     let writer = DocWriter::new(config, store, registry).await.expect("Failed to seed registry");
//!     writer.start(4);
//!
//!     writer
//!         .write(Document::new("dataset", "conn", json!({"src": "10.0.0.1"})))
//!         .await
//!         .expect("Queue closed");
//!
//!     // Blocks until every queued document is resolved
//!     writer.flush().await;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`writer`]: The [`DocWriter`] owning the queue, pool and lifecycle
//! - [`storage`]: Database and metadata registry seams, in-memory backends
//! - [`registry`]: Cache of known logical databases
//! - [`filter`]: Source-based content filtering
//! - [`resilience`]: Retry with quadratic backoff

pub mod config;
pub mod document;
pub mod storage;
pub mod registry;
pub mod filter;
pub mod resilience;
pub mod writer;
pub mod metrics;

pub use config::DocWriterConfig;
pub use document::Document;
pub use writer::{DocWriter, DocWriterError, WriterState, WriterStats};
pub use storage::traits::{DocumentStore, DocumentSession, MetadataRegistry, StorageError};
pub use registry::DatabaseRegistry;
pub use filter::{is_filtered, ContentFilter, FilterDecision};
pub use resilience::retry::RetryConfig;
