//! Counter store backed by a key/value store.
//!
//! Each counter lives under `counter-<name>` as a JSON number, so counters
//! share whatever persistence backend the engine is configured with.

use std::sync::{Arc, Mutex, PoisonError};

use crate::ports::{load_json, save_json, CounterStore, KeyValueStore, StorageError};

const KEY_PREFIX: &str = "counter-";

pub struct KeyValueCounterStore {
    store: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write increments.
    write_lock: Mutex<()>,
}

impl KeyValueCounterStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    fn key(name: &str) -> String {
        format!("{KEY_PREFIX}{name}")
    }
}

impl CounterStore for KeyValueCounterStore {
    fn get(&self, name: &str) -> Result<u64, StorageError> {
        Ok(load_json::<u64>(self.store.as_ref(), &Self::key(name))?.unwrap_or(0))
    }

    fn increment(&self, name: &str, by: u64) -> Result<u64, StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let next = self.get(name)?.saturating_add(by);
        save_json(self.store.as_ref(), &Self::key(name), &next)?;
        Ok(next)
    }
}
