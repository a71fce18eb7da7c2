// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for the document writer.
//!
//! # Example
//!
//! ```
//! use doc_writer::DocWriterConfig;
//!
//! // Minimal config (uses defaults)
//! let config = DocWriterConfig::default();
//! assert_eq!(config.queue_capacity, 5000);
//! assert_eq!(config.retry_max_attempts, 5);
//!
//! // Full config
//! let config = DocWriterConfig {
//!     database_prefix: "site1-".into(),
//!     filter_patterns: vec!["internal.example.com".into()],
//!     import_filtered: false,
//!     worker_count: 8,
//!     ..Default::default()
//! };
//! assert_eq!(config.worker_count, 8);
//! ```

use serde::Deserialize;

/// Configuration for the document writer.
///
/// Loading it (from TOML, env, flags) is the embedding process's job; the
/// writer only needs the values.
#[derive(Debug, Clone, Deserialize)]
pub struct DocWriterConfig {
    /// Prepended to every document's database name on `write`
    #[serde(default)]
    pub database_prefix: String,

    /// Substrings that mark a document's source as filtered
    #[serde(default)]
    pub filter_patterns: Vec<String>,

    /// Write filtered documents anyway instead of skipping them
    #[serde(default)]
    pub import_filtered: bool,

    /// Intake queue capacity; `write` waits once this many documents are queued
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Workers launched when the pool is started implicitly by `flush`
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Insert attempts per document, including the first one
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Backoff time unit; attempt `i` waits `i² × unit`
    #[serde(default = "default_retry_backoff_unit_ms")]
    pub retry_backoff_unit_ms: u64,
}

fn default_queue_capacity() -> usize { 5000 }
fn default_worker_count() -> usize { 4 }
fn default_retry_max_attempts() -> u32 { 5 }
fn default_retry_backoff_unit_ms() -> u64 { 1000 }

impl Default for DocWriterConfig {
    fn default() -> Self {
        Self {
            database_prefix: String::new(),
            filter_patterns: Vec::new(),
            import_filtered: false,
            queue_capacity: default_queue_capacity(),
            worker_count: default_worker_count(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_backoff_unit_ms: default_retry_backoff_unit_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DocWriterConfig::default();
        assert!(config.database_prefix.is_empty());
        assert!(config.filter_patterns.is_empty());
        assert!(!config.import_filtered);
        assert_eq!(config.queue_capacity, 5000);
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.retry_max_attempts, 5);
        assert_eq!(config.retry_backoff_unit_ms, 1000);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: DocWriterConfig = serde_json::from_str(
            r#"{"database_prefix": "rita-", "filter_patterns": ["cdn."], "worker_count": 2}"#,
        )
        .unwrap();

        assert_eq!(config.database_prefix, "rita-");
        assert_eq!(config.filter_patterns, vec!["cdn.".to_string()]);
        assert_eq!(config.worker_count, 2);
        // Unset fields fall back to defaults
        assert_eq!(config.queue_capacity, 5000);
        assert_eq!(config.retry_max_attempts, 5);
    }

    #[test]
    fn test_deserialize_empty_object() {
        let config: DocWriterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.queue_capacity, default_queue_capacity());
        assert!(!config.import_filtered);
    }
}
