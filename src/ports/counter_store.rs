//! CounterStore port - Interface for external numeric counters.
//!
//! Counters live outside the user context (e.g. how many images the
//! processing pipeline has handled) and are read by completion predicates.

use super::StorageError;

/// Port for reading and bumping named counters.
pub trait CounterStore: Send + Sync {
    /// Current value. Missing counters read as zero.
    fn get(&self, name: &str) -> Result<u64, StorageError>;

    /// Adds `by` and returns the new value.
    fn increment(&self, name: &str, by: u64) -> Result<u64, StorageError>;
}
