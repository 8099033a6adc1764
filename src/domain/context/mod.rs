//! User context domain module.
//!
//! The evolving model of who the user is and what they have done.
//!
//! # Module Structure
//!
//! - `user_context` - The `UserContext` snapshot and `ContextPatch`
//! - `usage` - Behavioral usage counters
//! - `experience` - Experience tiers and the classifier
//! - `preferences` - User-editable preferences
//! - `intent` - Onboarding intents

mod experience;
pub mod intent;
mod preferences;
mod usage;
mod user_context;

pub use experience::{classify, ExperienceLevel};
pub use intent::{IntentCatalog, IntentDefinition};
pub use preferences::{Preferences, PreferencesPatch, PreferredView};
pub use usage::Usage;
pub use user_context::{ContextPatch, Intent, UserContext};
