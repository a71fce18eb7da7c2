// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Storage seams: the document database and the metadata registry.
//!
//! The writer only talks to these traits. In-memory implementations live in
//! [`memory`] for embedding and tests.

pub mod traits;
pub mod memory;
