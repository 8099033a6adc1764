//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, analytics records and error types
//! that form the vocabulary of the personalization engine.

mod errors;
mod events;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{categories, event_names, AnalyticsEvent};
pub use ids::{AchievementId, EventId, FeatureKey, HintId, IntentId, NavItemId};
pub use timestamp::Timestamp;
