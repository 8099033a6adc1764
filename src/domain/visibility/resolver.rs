//! Per-feature visibility decisions.

use std::sync::Arc;

use super::VisibilityRuleTable;
use crate::domain::context::{ExperienceLevel, UserContext};
use crate::domain::foundation::FeatureKey;
use crate::domain::rules::EvaluationInput;

/// Why a feature ended up visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityReason {
    /// The key is in `revealed_features`.
    Revealed,
    /// The user opted into advanced features and is past beginner.
    AdvancedPreference,
    /// The rule table admits it for this context.
    Rule,
}

/// Decides whether a feature is shown for a context.
///
/// Evaluation order, first match wins:
/// 1. explicit reveal
/// 2. `show_advanced_features` preference on a non-beginner
/// 3. the rule table entry, hidden when absent
#[derive(Debug, Clone)]
pub struct FeatureVisibilityResolver {
    rules: Arc<VisibilityRuleTable>,
}

impl Default for FeatureVisibilityResolver {
    fn default() -> Self {
        Self::new(VisibilityRuleTable::builtin().clone())
    }
}

impl FeatureVisibilityResolver {
    pub fn new(rules: VisibilityRuleTable) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    pub fn should_show(&self, feature: &str, context: &UserContext) -> bool {
        self.reason(feature, context).is_some()
    }

    /// Returns the first rule that makes the feature visible, or `None` when hidden.
    pub fn reason(&self, feature: &str, context: &UserContext) -> Option<VisibilityReason> {
        if context.is_revealed(feature) {
            return Some(VisibilityReason::Revealed);
        }

        if context.preferences.show_advanced_features
            && context.experience_level() != ExperienceLevel::Beginner
        {
            return Some(VisibilityReason::AdvancedPreference);
        }

        let rule = self.rules.rule_for(feature)?;
        rule.evaluate(&EvaluationInput::new(context))
            .then_some(VisibilityReason::Rule)
    }

    /// Whether every key in `features` is visible. True for an empty list.
    pub fn all_visible(&self, features: &[FeatureKey], context: &UserContext) -> bool {
        features
            .iter()
            .all(|feature| self.should_show(feature.as_str(), context))
    }

    pub fn rules(&self) -> &VisibilityRuleTable {
        &self.rules
    }
}
