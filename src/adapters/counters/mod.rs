//! Counter store adapters.

mod stored;

pub use stored::KeyValueCounterStore;
