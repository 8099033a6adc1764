//! Contextual hints domain module.
//!
//! - `definition` - `HintDefinition`, priority and placement
//! - `catalog` - The static hint catalog
//! - `evaluator` - `TriggerEvaluator`, the pure eligibility scan

pub mod catalog;
mod definition;
mod evaluator;

pub use catalog::HintCatalog;
pub use definition::{HintDefinition, HintPlacement, HintPriority};
pub use evaluator::TriggerEvaluator;
