// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Content filtering for documents from suppressed sources.
//!
//! A document is *filtered* when its source contains any configured pattern.
//! Filtered documents are skipped unless the import override is on.
//!
//! # Example
//!
//! ```
//! use doc_writer::{ContentFilter, FilterDecision};
//!
//! let filter = ContentFilter::new(vec!["cdn.example.com".into()], false);
//! assert_eq!(filter.decide(Some("img.cdn.example.com")), FilterDecision::Skip);
//! assert_eq!(filter.decide(Some("mail.example.org")), FilterDecision::Write);
//! assert_eq!(filter.decide(None), FilterDecision::Write);
//!
//! let importing = ContentFilter::new(vec!["cdn.example.com".into()], true);
//! assert_eq!(importing.decide(Some("img.cdn.example.com")), FilterDecision::WriteOverridden);
//! ```

/// True if `subject` contains any of `patterns` (case-sensitive).
///
/// An empty pattern list filters nothing.
#[must_use]
pub fn is_filtered<S: AsRef<str>>(patterns: &[S], subject: &str) -> bool {
    patterns.iter().any(|p| subject.contains(p.as_ref()))
}

/// What a worker should do with a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// Not filtered
    Write,
    /// Filtered, but the import override is on
    WriteOverridden,
    /// Filtered and dropped without an insert
    Skip,
}

impl FilterDecision {
    #[must_use]
    pub fn should_write(&self) -> bool {
        !matches!(self, Self::Skip)
    }
}

/// Static filter state shared read-only by all workers.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    patterns: Vec<String>,
    import_filtered: bool,
}

impl ContentFilter {
    #[must_use]
    pub fn new(patterns: Vec<String>, import_filtered: bool) -> Self {
        Self { patterns, import_filtered }
    }

    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    #[must_use]
    pub fn import_filtered(&self) -> bool {
        self.import_filtered
    }

    /// Decide on a document by its source. No source means nothing to match.
    #[must_use]
    pub fn decide(&self, source: Option<&str>) -> FilterDecision {
        match source {
            Some(s) if is_filtered(&self.patterns, s) => {
                if self.import_filtered {
                    FilterDecision::WriteOverridden
                } else {
                    FilterDecision::Skip
                }
            }
            _ => FilterDecision::Write,
        }
    }
}
