//! Contextual hint definitions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{FeatureKey, HintId};

/// Display priority. High-priority hints bypass the concurrency cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl HintPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            HintPriority::Low => "low",
            HintPriority::Medium => "medium",
            HintPriority::High => "high",
        }
    }
}

/// Where the hint is anchored relative to its target element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintPlacement {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    Center,
}

/// A catalog entry describing when and how a hint is offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintDefinition {
    pub id: HintId,
    pub title: String,
    pub content: String,
    /// Name of the trigger predicate in the predicate registry.
    pub trigger: String,
    #[serde(default)]
    pub placement: HintPlacement,
    #[serde(default)]
    pub priority: HintPriority,
    /// Every key must be visible for the hint to be offered.
    #[serde(default)]
    pub required_features: Vec<FeatureKey>,
    #[serde(default = "default_dismissible")]
    pub dismissible: bool,
    /// Plan tag the hint advertises, if it is an upsell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_gate: Option<String>,
}

fn default_dismissible() -> bool {
    true
}

impl HintDefinition {
    pub fn is_high_priority(&self) -> bool {
        self.priority == HintPriority::High
    }
}
