//! Key/value store adapters.
//!
//! - `InMemoryKeyValueStore` - Process-local records for tests and ephemeral hosts
//! - `FileKeyValueStore` - One JSON file per key

mod file;
mod in_memory;

pub use file::FileKeyValueStore;
pub use in_memory::InMemoryKeyValueStore;
