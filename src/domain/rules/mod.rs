//! Rule evaluation module.
//!
//! One interpreter for every declarative condition in the engine.
//!
//! - `condition` - `Condition` descriptors and `EvaluationInput`
//! - `registry` - Named predicates referenced by hints and achievements

mod condition;
mod registry;

pub use condition::{Condition, Counters, EvaluationInput};
pub use registry::{predicates, PredicateRegistry};

/// External counter incremented for every processed image.
pub const PROCESSED_IMAGE_COUNT: &str = "processed-image-count";
