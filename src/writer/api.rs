// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Producer API: putting documents on the intake queue.

use serde::Serialize;
use tracing::{debug, warn};

use crate::document::Document;

use super::{DocWriter, DocWriterError};
use super::types::StatCounters;

impl DocWriter {
    /// Queue a document for writing.
    ///
    /// Prefixes the database name, makes sure the database is registered, then
    /// enqueues. Waits while the queue is full. The insert itself happens later
    /// on a worker; its outcome is only visible through logs, metrics and
    /// [`stats()`](Self::stats).
    ///
    /// # Errors
    ///
    /// [`DocWriterError::QueueClosed`] if called after [`flush()`](Self::flush).
    pub async fn write(&self, mut doc: Document) -> Result<(), DocWriterError> {
        if self.tx.is_closed() {
            return Err(self.reject_closed(&doc));
        }

        doc.database = format!("{}{}", self.config.database_prefix, doc.database);

        // Registration failures are logged by the cache and retried on the next write
        if let Err(e) = self.registry.ensure_registered(&doc.database).await {
            warn!(database = %doc.database, error = %e, "Queueing document for unregistered database");
        }

        if let Err(async_channel::SendError(doc)) = self.tx.send(doc).await {
            return Err(self.reject_closed(&doc));
        }

        StatCounters::bump(&self.ctx.stats.enqueued);
        crate::metrics::record_enqueued();
        crate::metrics::set_queue_depth(self.tx.len());
        Ok(())
    }

    /// Serialize `record` and queue it.
    pub async fn write_record<T: Serialize>(
        &self,
        database: &str,
        collection: &str,
        record: &T,
    ) -> Result<(), DocWriterError> {
        let doc = Document::from_serialize(database, collection, record)?;
        self.write(doc).await
    }

    fn reject_closed(&self, doc: &Document) -> DocWriterError {
        crate::metrics::record_rejected_closed();
        debug!(
            database = %doc.database,
            collection = %doc.collection,
            "Write rejected, queue is closed"
        );
        DocWriterError::QueueClosed
    }
}
