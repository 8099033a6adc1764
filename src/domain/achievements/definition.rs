//! Achievement definitions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AchievementId, FeatureKey, Timestamp};

/// A milestone that unlocks features once its predicate holds.
///
/// `completed` moves from false to true exactly once and is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementDefinition {
    pub id: AchievementId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Name of the completion predicate in the predicate registry.
    pub predicate: String,
    /// Revealed when the achievement completes.
    #[serde(default)]
    pub unlocks: Vec<FeatureKey>,
    /// Celebratory message shown in the notification.
    pub message: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl AchievementDefinition {
    /// Marks the achievement complete. Returns false if it already was.
    pub(crate) fn complete(&mut self, at: Timestamp) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(at);
        true
    }
}
