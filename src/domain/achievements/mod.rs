//! Achievements domain module.
//!
//! - `definition` - `AchievementDefinition`
//! - `catalog` - The static catalog and persisted-progress merge
//! - `tracker` - Pure completion check

pub mod catalog;
mod definition;
mod tracker;

pub use catalog::AchievementCatalog;
pub use definition::AchievementDefinition;
pub use tracker::{check, AchievementCheck};
