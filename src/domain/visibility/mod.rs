//! Feature visibility module.
//!
//! - `rule_table` - Static per-feature defaults
//! - `resolver` - `FeatureVisibilityResolver` combining reveals, preferences and rules

mod resolver;
mod rule_table;

pub use resolver::{FeatureVisibilityResolver, VisibilityReason};
pub use rule_table::VisibilityRuleTable;
