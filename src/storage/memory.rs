// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use super::traits::{DocumentSession, DocumentStore, MetadataRegistry, StorageError};

type Namespace = (String, String);

/// In-memory document store keyed by `(database, collection)`.
///
/// Cloning is cheap and every clone shares the same data, which is exactly what
/// a session is.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    data: Arc<DashMap<Namespace, Vec<Value>>>,
    sessions_opened: Arc<AtomicUsize>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents stored in one collection, in insert order
    #[must_use]
    pub fn documents(&self, database: &str, collection: &str) -> Vec<Value> {
        self.data
            .get(&(database.to_string(), collection.to_string()))
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Total documents across all collections
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.iter().map(|r| r.value().len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of databases that have received at least one document
    #[must_use]
    pub fn databases(&self) -> Vec<String> {
        let mut dbs: Vec<String> = self.data.iter().map(|r| r.key().0.clone()).collect();
        dbs.sort();
        dbs.dedup();
        dbs
    }

    /// Number of sessions handed out so far
    #[must_use]
    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        self.data.clear();
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn session(&self) -> Box<dyn DocumentSession> {
        self.sessions_opened.fetch_add(1, Ordering::AcqRel);
        Box::new(self.clone())
    }
}

#[async_trait]
impl DocumentSession for MemoryDocumentStore {
    async fn insert(
        &mut self,
        database: &str,
        collection: &str,
        document: &Value,
    ) -> Result<(), StorageError> {
        self.data
            .entry((database.to_string(), collection.to_string()))
            .or_default()
            .push(document.clone());
        Ok(())
    }
}

/// In-memory metadata registry. Records every `add_new_database` call so
/// duplicate registrations are observable.
#[derive(Default)]
pub struct MemoryMetadataRegistry {
    databases: Mutex<Vec<String>>,
    add_calls: AtomicUsize,
}

impl MemoryMetadataRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that already knows about `names`
    #[must_use]
    pub fn with_databases<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            databases: Mutex::new(names.into_iter().map(Into::into).collect()),
            add_calls: AtomicUsize::new(0),
        }
    }

    /// How many times `add_new_database` has been called
    #[must_use]
    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::Acquire)
    }

    /// How many times `name` was registered
    #[must_use]
    pub fn registrations_of(&self, name: &str) -> usize {
        self.databases.lock().iter().filter(|db| *db == name).count()
    }
}

#[async_trait]
impl MetadataRegistry for MemoryMetadataRegistry {
    async fn add_new_database(&self, name: &str) -> Result<(), StorageError> {
        self.add_calls.fetch_add(1, Ordering::AcqRel);
        self.databases.lock().push(name.to_string());
        Ok(())
    }

    async fn databases(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.databases.lock().clone())
    }
}
