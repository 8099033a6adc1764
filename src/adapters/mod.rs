//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the engine to external systems:
//! - `kv` - Key/value persistence (in-memory, JSON files)
//! - `counters` - Named counters on top of a key/value store
//! - `analytics` - Analytics sinks (recording, tracing)

pub mod analytics;
pub mod counters;
pub mod kv;

pub use analytics::{RecordingAnalyticsSink, TracingAnalyticsSink};
pub use counters::KeyValueCounterStore;
pub use kv::{FileKeyValueStore, InMemoryKeyValueStore};
