// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Writer lifecycle management: start and flush.

use std::sync::atomic::Ordering;
use tracing::{debug, info, warn};

use super::{DocWriter, WriterState};
use super::worker;

impl DocWriter {
    /// Launch `worker_count` workers.
    ///
    /// Only the first call with a non-zero count does anything; later calls are
    /// no-ops. The started flag is claimed atomically, so concurrent calls launch
    /// one pool. Returns the number of workers launched by this call.
    ///
    /// Must be called from within a tokio runtime.
    #[tracing::instrument(skip(self))]
    pub fn start(&self, worker_count: usize) -> usize {
        if worker_count == 0 {
            warn!("Refusing to start writer pool with zero workers");
            return 0;
        }

        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(running = self.pool_size(), "Writer pool already started");
            return 0;
        }

        for id in 0..worker_count {
            let rx = self.rx.clone();
            let ctx = self.ctx.clone();
            self.workers.spawn(worker::run(id, rx, ctx));
        }

        self.pool_size.store(worker_count, Ordering::Release);
        self.state.send_replace(WriterState::Running);
        info!(workers = worker_count, queue_capacity = self.queue_capacity(), "Writer pool started");
        worker_count
    }

    /// Close the queue and wait for every worker to drain it and exit.
    ///
    /// Every document accepted before this call is written, dropped after
    /// exhausting retries, or skipped as filtered by the time it returns. If the
    /// pool was never started it is started with the configured worker count
    /// first, so nothing queued is stranded.
    ///
    /// Cannot fail; it can take as long as the slowest retry schedule. Later
    /// `write` calls fail with [`QueueClosed`](super::DocWriterError::QueueClosed).
    #[tracing::instrument(skip(self))]
    pub async fn flush(&self) {
        if !self.is_started() {
            warn!(pending = self.queue_len(), "Flush before start, starting pool to drain queue");
            self.start(self.config.worker_count.max(1));
        }

        let flush_start = std::time::Instant::now();
        self.state.send_replace(WriterState::Flushing);

        debug!("Closing write queue");
        self.tx.close();
        self.workers.close();

        debug!(pending = self.queue_len(), "Waiting for writes to finish");
        self.workers.wait().await;

        self.state.send_replace(WriterState::Stopped);
        crate::metrics::record_flush_duration(flush_start.elapsed());
        let stats = self.stats();
        info!(
            written = stats.written,
            filtered = stats.filtered,
            dropped = stats.dropped,
            "Writes completed, writer pool stopped"
        );
    }
}
