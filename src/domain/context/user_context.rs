//! The `UserContext` snapshot: who the user is and what they have done.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{classify, ExperienceLevel, Preferences, PreferencesPatch, Usage};
use crate::domain::foundation::{FeatureKey, IntentId, Timestamp};

/// The onboarding goal the user picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub id: IntentId,
    #[serde(default)]
    pub selected_at: Timestamp,
}

impl Intent {
    pub fn new(id: IntentId) -> Self {
        Self {
            id,
            selected_at: Timestamp::now(),
        }
    }
}

/// Single source of truth for personalization decisions.
///
/// `experience_level` is private: it is always `classify(&usage)` and only
/// the classifier writes it. Every field defaults, so persisted records
/// written by older versions deserialize with new fields filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    experience_level: ExperienceLevel,
    pub revealed_features: BTreeSet<FeatureKey>,
    pub completed_onboarding: bool,
    pub preferences: Preferences,
    pub usage: Usage,
}

impl UserContext {
    /// Returns the classifier-derived experience tier.
    pub fn experience_level(&self) -> ExperienceLevel {
        self.experience_level
    }

    /// Returns the selected intent id, if any.
    pub fn intent_id(&self) -> Option<&IntentId> {
        self.intent.as_ref().map(|intent| &intent.id)
    }

    /// Whether the key was explicitly revealed.
    pub fn is_revealed(&self, key: &str) -> bool {
        self.revealed_features.contains(key)
    }

    /// Recomputes the experience tier from usage.
    ///
    /// Returns true if the stored tier changed.
    pub(crate) fn reclassify(&mut self) -> bool {
        let level = classify(&self.usage);
        if level == self.experience_level {
            return false;
        }
        self.experience_level = level;
        true
    }

    /// Unions `keys` into the revealed set. Returns the keys that were new.
    pub(crate) fn reveal<I>(&mut self, keys: I) -> Vec<FeatureKey>
    where
        I: IntoIterator<Item = FeatureKey>,
    {
        keys.into_iter()
            .filter(|key| self.revealed_features.insert(key.clone()))
            .collect()
    }

    /// Clears the onboarding state, leaving usage and preferences untouched.
    pub(crate) fn reset_onboarding(&mut self) {
        self.intent = None;
        self.completed_onboarding = false;
        self.revealed_features.clear();
    }

    // === Snapshot builders ===

    /// Replaces usage and reclassifies.
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self.reclassify();
        self
    }

    /// Sets the intent.
    pub fn with_intent(mut self, id: impl Into<IntentId>) -> Self {
        self.intent = Some(Intent::new(id.into()));
        self
    }

    /// Adds revealed features.
    pub fn with_revealed<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<FeatureKey>,
    {
        self.reveal(keys.into_iter().map(Into::into));
        self
    }

    /// Replaces preferences.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }
}

/// Partial update of a [`UserContext`].
///
/// Only user-editable fields are patchable. The experience level belongs to
/// the classifier, and intent and onboarding completion change only through
/// the store's onboarding operations.
#[derive(Debug, Clone, Default)]
pub struct ContextPatch {
    pub preferences: Option<PreferencesPatch>,
}

impl ContextPatch {
    pub fn is_empty(&self) -> bool {
        self.preferences.as_ref().map_or(true, PreferencesPatch::is_empty)
    }

    pub fn apply_to(&self, context: &mut UserContext) {
        if let Some(preferences) = &self.preferences {
            preferences.apply_to(&mut context.preferences);
        }
    }
}
