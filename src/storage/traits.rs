// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    /// The driver could not encode the document's identifier field.
    #[error("Malformed document identifier: {0}")]
    MalformedId(String),
    #[error("Metadata registry error: {0}")]
    Registry(String),
}

impl StorageError {
    /// Whether this failure points at the payload's identifier rather than the backend.
    #[must_use]
    pub fn is_malformed_id(&self) -> bool {
        matches!(self, Self::MalformedId(_))
    }
}

/// A document database the writer pool persists into.
///
/// `session()` must be cheap: every insert (and every retry) opens its own
/// session, so implementations should hand out a clone of a shared connection
/// context rather than dialling a new connection. Workers never share a session.
pub trait DocumentStore: Send + Sync {
    fn session(&self) -> Box<dyn DocumentSession>;
}

/// An independent handle to the database, exclusively owned by one in-flight insert.
///
/// Dropping the session releases it.
#[async_trait]
pub trait DocumentSession: Send {
    async fn insert(
        &mut self,
        database: &str,
        collection: &str,
        document: &Value,
    ) -> Result<(), StorageError>;
}

/// External registry recording which logical databases exist.
#[async_trait]
pub trait MetadataRegistry: Send + Sync {
    async fn add_new_database(&self, name: &str) -> Result<(), StorageError>;

    /// All databases the registry knows about. Used once to seed the writer's cache.
    async fn databases(&self) -> Result<Vec<String>, StorageError>;
}
