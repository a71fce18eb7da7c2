// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Public types for the document writer.

use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::storage::traits::StorageError;

/// Writer lifecycle state.
///
/// Use [`super::DocWriter::state()`] to check the current state or
/// [`super::DocWriter::state_receiver()`] to watch for changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Constructed, no workers yet
    Created,
    /// Workers are consuming the queue
    Running,
    /// Queue closed, waiting for workers to drain it
    Flushing,
    /// Every worker has exited
    Stopped,
}

impl std::fmt::Display for WriterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Running => write!(f, "Running"),
            Self::Flushing => write!(f, "Flushing"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DocWriterError {
    /// `write` was called after `flush` closed the queue.
    #[error("write queue is closed")]
    QueueClosed,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Point-in-time counters for one writer.
///
/// Once a flush has returned, every enqueued document is accounted for:
/// `enqueued == written + filtered + dropped`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Documents accepted onto the queue
    pub enqueued: u64,
    /// Documents inserted (first try or after retry)
    pub written: u64,
    /// Documents skipped by the content filter
    pub filtered: u64,
    /// Documents dropped after exhausting retries
    pub dropped: u64,
    /// Individual failed insert attempts
    pub failed_attempts: u64,
    /// Documents that needed at least one retry and then succeeded
    pub recovered: u64,
}

impl WriterStats {
    /// Documents that reached a final outcome
    #[must_use]
    pub fn resolved(&self) -> u64 {
        self.written + self.filtered + self.dropped
    }

    /// Documents still queued or in flight
    #[must_use]
    pub fn pending(&self) -> u64 {
        self.enqueued.saturating_sub(self.resolved())
    }
}

#[derive(Debug, Default)]
pub(super) struct StatCounters {
    pub enqueued: AtomicU64,
    pub written: AtomicU64,
    pub filtered: AtomicU64,
    pub dropped: AtomicU64,
    pub failed_attempts: AtomicU64,
    pub recovered: AtomicU64,
}

impl StatCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> WriterStats {
        WriterStats {
            enqueued: self.enqueued.load(Ordering::Acquire),
            written: self.written.load(Ordering::Acquire),
            filtered: self.filtered.load(Ordering::Acquire),
            dropped: self.dropped.load(Ordering::Acquire),
            failed_attempts: self.failed_attempts.load(Ordering::Acquire),
            recovered: self.recovered.load(Ordering::Acquire),
        }
    }
}
