// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic doc-writer usage example.
//!
//! Demonstrates:
//! 1. Building a writer over in-memory backends
//! 2. Fanning in documents from several producers
//! 3. Filtering documents by source
//! 4. Flushing and reading the outcome back
//! 5. Displaying captured metrics
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use std::sync::Arc;
use serde_json::json;
use doc_writer::{DocWriter, DocWriterConfig, Document, WriterState};
use doc_writer::storage::memory::{MemoryDocumentStore, MemoryMetadataRegistry};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doc_writer=info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Configure and start the writer
    // ─────────────────────────────────────────────────────────────────────────
    println!("📦 Configuring doc-writer...");

    let config = DocWriterConfig {
        database_prefix: "site1-".into(),
        filter_patterns: vec!["cdn.example.com".into()],
        import_filtered: false,
        queue_capacity: 64,
        retry_backoff_unit_ms: 10,
        ..Default::default()
    };

    let store = MemoryDocumentStore::new();
    let registry = Arc::new(MemoryMetadataRegistry::with_databases(["site1-archive"]));
    let writer = Arc::new(DocWriter::new(config, Arc::new(store.clone()), registry.clone()).await?);

    println!("   State: {}", writer.state());
    writer.start(4);
    println!("   ✅ Pool started with {} workers", writer.pool_size());

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Fan in from several producers
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📝 Writing from 3 producers...");

    let sources = ["sensor-a.example.org", "img.cdn.example.com", "sensor-b.example.org"];
    let mut producers = Vec::new();
    for (p, source) in sources.iter().enumerate() {
        let writer = writer.clone();
        let source = source.to_string();
        producers.push(tokio::spawn(async move {
            for i in 0..10 {
                let doc = Document::new(
                    "dataset",
                    if i % 2 == 0 { "conn" } else { "dns" },
                    json!({"producer": p, "seq": i, "host": source}),
                )
                .with_source(source.clone());
                writer.write(doc).await?;
            }
            Ok::<_, doc_writer::DocWriterError>(())
        }));
    }
    for producer in producers {
        producer.await??;
    }
    println!("   └─ Queued: {} (queue depth now {})", writer.stats().enqueued, writer.queue_len());

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Flush: close the queue and wait for the pool to drain it
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n⏳ Flushing...");
    writer.flush().await;
    assert_eq!(writer.state(), WriterState::Stopped);

    let stats = writer.stats();
    println!("   ✅ Flush complete! State: {}", writer.state());
    println!("   ├─ Written:  {}", stats.written);
    println!("   ├─ Filtered: {}", stats.filtered);
    println!("   └─ Dropped:  {}", stats.dropped);

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Read back
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📖 Stored documents:");
    for db in store.databases() {
        for collection in ["conn", "dns"] {
            let count = store.documents(&db, collection).len();
            println!("   └─ {}.{}: {}", db, collection, count);
        }
    }
    println!("   Known databases: {:?}", writer.known_databases().await);
    println!("   Registry add calls: {}", registry.add_calls());

    // Writes after flush are a programming error, reported as such
    let late = writer.write(Document::new("dataset", "conn", json!({}))).await;
    println!("\n🛑 Write after flush: {:?}", late.err());

    println!("\n📈 Metrics:");
    dump_metrics(&snapshotter);

    Ok(())
}

/// Print captured metrics sorted by name
fn dump_metrics(snapshotter: &Snapshotter) {
    let mut lines = Vec::new();

    for (composite_key, _, _, value) in snapshotter.snapshot().into_vec() {
        let (_, key) = composite_key.into_parts();
        let labels: Vec<_> = key.labels().map(|l| format!("{}={}", l.key(), l.value())).collect();
        let labels = if labels.is_empty() { String::new() } else { format!("{{{}}}", labels.join(",")) };

        let rendered = match value {
            DebugValue::Counter(v) => v.to_string(),
            DebugValue::Gauge(v) => format!("{:.2}", v.into_inner()),
            DebugValue::Histogram(samples) => {
                let sum: f64 = samples.iter().map(|v| v.into_inner()).sum();
                format!("count={} sum={:.4}", samples.len(), sum)
            }
        };
        lines.push(format!("{}{} = {}", key.name(), labels, rendered));
    }

    lines.sort();
    if lines.is_empty() {
        println!("   └─ (no metrics recorded)");
    }
    for line in lines {
        println!("   └─ {}", line);
    }
}
