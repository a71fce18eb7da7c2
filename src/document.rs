// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Document data structure.
//!
//! A [`Document`] is one pending insert: an opaque JSON payload plus where it
//! should land. Documents are immutable once queued and consumed by exactly one
//! worker.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One item to be written to the database.
///
/// # Example
///
/// ```
/// use doc_writer::Document;
/// use serde_json::json;
///
/// let doc = Document::new("dataset", "conn", json!({"src": "10.0.0.1", "dst": "8.8.8.8"}))
///     .with_source("sensor-3.example.com");
///
/// assert_eq!(doc.database, "dataset");
/// assert_eq!(doc.collection, "conn");
/// assert_eq!(doc.source.as_deref(), Some("sensor-3.example.com"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Logical destination database (prefixed by the writer on `write`)
    pub database: String,
    /// Destination collection within the database
    pub collection: String,
    /// Where the document came from (host, URL). The content filter matches on this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// The thing to write
    pub payload: Value,
}

impl Document {
    pub fn new(database: impl Into<String>, collection: impl Into<String>, payload: Value) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
            source: None,
            payload,
        }
    }

    /// Build a document from any serializable record.
    pub fn from_serialize<T: Serialize>(
        database: impl Into<String>,
        collection: impl Into<String>,
        record: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(database, collection, serde_json::to_value(record)?))
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Payload rendered for diagnostics. Falls back to compact form if pretty printing fails.
    #[must_use]
    pub fn payload_dump(&self) -> String {
        serde_json::to_string_pretty(&self.payload).unwrap_or_else(|_| self.payload.to_string())
    }
}
