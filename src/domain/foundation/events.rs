//! Analytics event records emitted by the personalization engine.
//!
//! The engine never depends on what happens to these records. They are
//! handed to an [`AnalyticsSink`](crate::ports::AnalyticsSink) and forgotten.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::{EventId, Timestamp};

/// Well-known analytics event names.
pub mod event_names {
    pub const HINT_SHOWN: &str = "hint_shown";
    pub const HINT_DISMISSED: &str = "hint_dismissed";
    pub const ACHIEVEMENT_UNLOCKED: &str = "achievement_unlocked";
    pub const NAVIGATION_COMPOSED: &str = "navigation_composed";
    pub const FEATURE_USED: &str = "feature_used";
    pub const INTENT_SELECTED: &str = "intent_selected";
    pub const ONBOARDING_COMPLETED: &str = "onboarding_completed";
    pub const ONBOARDING_RESET: &str = "onboarding_reset";
}

/// Analytics categories used to group events downstream.
pub mod categories {
    pub const CONTEXTUAL_HELP: &str = "contextual_help";
    pub const ENGAGEMENT: &str = "engagement";
    pub const NAVIGATION: &str = "navigation";
    pub const USAGE: &str = "usage";
    pub const ONBOARDING: &str = "onboarding";
}

/// A single fire-and-forget analytics record.
///
/// Mirrors the `{event, category, label, properties}` shape expected by the
/// analytics collaborator, plus an id and timestamp for downstream dedup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub event_id: EventId,
    pub event: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub properties: Map<String, JsonValue>,
    pub occurred_at: Timestamp,
}

impl AnalyticsEvent {
    /// Creates an event with no label and no properties.
    pub fn new(event: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            event_id: EventId::new(),
            event: event.into(),
            category: category.into(),
            label: None,
            properties: Map::new(),
            occurred_at: Timestamp::now(),
        }
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adds a property. Values that fail to serialize are recorded as null.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(JsonValue::Null);
        self.properties.insert(key.into(), value);
        self
    }

    /// Returns a property by key.
    pub fn property(&self, key: &str) -> Option<&JsonValue> {
        self.properties.get(key)
    }
}
