// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Cache of logical databases known to the metadata registry.
//!
//! Every `write` passes through [`DatabaseRegistry::ensure_registered`] before
//! its document is queued, so a database is known to the metadata store before
//! any worker can write to it. Check-then-add runs under one lock: concurrent
//! producers addressing the same new database register it once.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::storage::traits::{MetadataRegistry, StorageError};

pub struct DatabaseRegistry {
    registry: Arc<dyn MetadataRegistry>,
    // tokio Mutex: the lock is held across the registry call
    known: Mutex<HashSet<String>>,
}

impl DatabaseRegistry {
    /// Empty cache in front of `registry`.
    pub fn new(registry: Arc<dyn MetadataRegistry>) -> Self {
        Self {
            registry,
            known: Mutex::new(HashSet::new()),
        }
    }

    /// Cache seeded with the databases the registry already knows about.
    pub async fn seeded(registry: Arc<dyn MetadataRegistry>) -> Result<Self, StorageError> {
        let existing = registry.databases().await?;
        info!(databases = existing.len(), "Seeded database registry cache");
        Ok(Self {
            registry,
            known: Mutex::new(existing.into_iter().collect()),
        })
    }

    /// Make sure `name` is registered. Returns `true` if this call registered it.
    ///
    /// A failed registration leaves the name uncached so the next call retries.
    pub async fn ensure_registered(&self, name: &str) -> Result<bool, StorageError> {
        let mut known = self.known.lock().await;
        if known.contains(name) {
            return Ok(false);
        }

        if let Err(e) = self.registry.add_new_database(name).await {
            error!(database = %name, error = %e, "Failed to register new database");
            crate::metrics::record_registration("error");
            return Err(e);
        }

        known.insert(name.to_string());
        crate::metrics::record_registration("success");
        debug!(database = %name, "Registered new database");
        Ok(true)
    }

    pub async fn is_known(&self, name: &str) -> bool {
        self.known.lock().await.contains(name)
    }

    /// Sorted snapshot of every known database
    pub async fn known_databases(&self) -> Vec<String> {
        let mut names: Vec<String> = self.known.lock().await.iter().cloned().collect();
        names.sort();
        names
    }
}
