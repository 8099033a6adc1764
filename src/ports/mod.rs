//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the engine and the outside world. Adapters implement these ports.
//!
//! - `KeyValueStore` - Persistence of context, dismissals and achievements
//! - `CounterStore` - External numeric counters read by predicates
//! - `AnalyticsSink` - Fire-and-forget analytics records

mod analytics_sink;
mod counter_store;
mod key_value_store;

pub use analytics_sink::AnalyticsSink;
pub use counter_store::CounterStore;
pub use key_value_store::{load_json, save_json, storage_keys, KeyValueStore, StorageError};
