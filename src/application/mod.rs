//! Application layer - stateful services around the pure domain.
//!
//! This layer owns mutable state, persistence and analytics side effects,
//! and wires the domain decisions together.
//!
//! - `context_store` - `UserContextStore`: get/patch/subscribe over the context
//! - `hint_scheduler` - Active hint and notification queues, expiry timers
//! - `hint_service` - Trigger evaluation, dismissal, direct hint requests
//! - `achievement_service` - `AchievementTracker`: completion, unlocks, notifications
//! - `navigation_composer` - Navigation composition with analytics
//! - `engine` - `PersonalizationEngine`, the wired-up whole

mod achievement_service;
mod context_store;
mod engine;
mod hint_scheduler;
mod hint_service;
mod navigation_composer;

pub use achievement_service::AchievementTracker;
pub use context_store::{ChangeKind, ContextChange, SubscriptionId, UserContextStore};
pub use engine::{
    EngineCatalogs, EnginePorts, EngineSettings, PersonalizationEngine, RefreshOutcome,
};
pub use hint_scheduler::{AchievementNotification, ActiveHint, HintScheduler, HintSource};
pub use hint_service::HintService;
pub use navigation_composer::NavigationComposer;
