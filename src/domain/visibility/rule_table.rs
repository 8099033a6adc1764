//! Static per-feature visibility defaults.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::context::{intent, ExperienceLevel};
use crate::domain::features;
use crate::domain::foundation::FeatureKey;
use crate::domain::rules::Condition;

/// Map from feature key to the condition under which it is shown by default.
///
/// Entries are expressions over the experience level and the intent id.
/// Keys missing from the table are hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibilityRuleTable {
    rules: BTreeMap<FeatureKey, Condition>,
}

static BUILTIN: Lazy<VisibilityRuleTable> = Lazy::new(|| {
    let intermediate = || Condition::experience_at_least(ExperienceLevel::Intermediate);
    let expert = || Condition::ExperienceIs {
        level: ExperienceLevel::Expert,
    };

    VisibilityRuleTable::default()
        .with(features::SINGLE_UPLOAD, Condition::Always)
        .with(features::EXIF_VIEWER, Condition::Always)
        .with(features::GPS_MAP, Condition::Always)
        .with(features::METADATA_EXPORT, Condition::Always)
        .with(
            features::BATCH_UPLOAD,
            Condition::any(vec![
                intermediate(),
                Condition::intent_is(intent::PROFESSIONAL_ANALYSIS),
                Condition::intent_is(intent::ENTERPRISE_EVALUATION),
            ]),
        )
        .with(features::CSV_EXPORT, intermediate())
        .with(features::PDF_REPORT, intermediate())
        .with(features::COMPARISON_VIEW, intermediate())
        .with(features::KEYBOARD_SHORTCUTS, intermediate())
        .with(features::ADVANCED_FILTERS, expert())
        .with(features::BULK_PROCESSING, expert())
        .with(
            features::HASH_VERIFICATION,
            Condition::any(vec![
                Condition::intent_is(intent::FORENSIC_INVESTIGATION),
                expert(),
            ]),
        )
        .with(
            features::FORENSIC_TIMELINE,
            Condition::intent_is(intent::FORENSIC_INVESTIGATION),
        )
        .with(
            features::CUSTOM_REPORTS,
            Condition::any(vec![
                Condition::intent_is(intent::ENTERPRISE_EVALUATION),
                expert(),
            ]),
        )
        .with(
            features::API_ACCESS,
            Condition::intent_is(intent::ENTERPRISE_EVALUATION),
        )
        .with(
            features::TEAM_WORKSPACE,
            Condition::intent_is(intent::ENTERPRISE_EVALUATION),
        )
        .with(
            features::AUDIT_LOG,
            Condition::intent_is(intent::ENTERPRISE_EVALUATION),
        )
});

impl VisibilityRuleTable {
    pub fn builtin() -> &'static VisibilityRuleTable {
        &BUILTIN
    }

    /// Adds or replaces the rule for a feature.
    pub fn with(mut self, feature: impl Into<FeatureKey>, condition: Condition) -> Self {
        self.rules.insert(feature.into(), condition);
        self
    }

    /// Merges `other` over this table. Rules in `other` win.
    pub fn merged(mut self, other: &VisibilityRuleTable) -> Self {
        for (feature, condition) in &other.rules {
            self.rules.insert(feature.clone(), condition.clone());
        }
        self
    }

    pub fn rule_for(&self, feature: &str) -> Option<&Condition> {
        self.rules.get(feature)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
