//! KeyValueStore port - Interface for persisting engine state.
//!
//! Every persisted record is one JSON document under a fixed key. Writes are
//! synchronous and small; the in-memory state stays authoritative, so callers
//! log and swallow failures rather than retrying.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Fixed storage keys for engine state.
pub mod storage_keys {
    /// Full `UserContext` record.
    pub const USER_CONTEXT: &str = "user-context";
    /// Array of permanently dismissed hint ids.
    pub const DISMISSED_HINTS: &str = "dismissed-hints";
    /// Achievement catalog including completion flags.
    pub const ACHIEVEMENTS: &str = "achievements";
}

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Failed to serialize record: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize record '{key}': {reason}")]
    DeserializationFailed { key: String, reason: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for reading and writing raw records by key.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw record, or `None` if nothing is stored under `key`.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous record.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes the record. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Loads and deserializes a JSON record.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.load(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorageError::DeserializationFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

/// Serializes and stores a JSON record.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw =
        serde_json::to_string(value).map_err(|e| StorageError::SerializationFailed(e.to_string()))?;
    store.save(key, &raw)
}
