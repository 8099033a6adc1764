//! Onboarding intents and the features each one reveals on selection.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::features;
use crate::domain::foundation::{FeatureKey, IntentId};

pub const QUICK_ANALYSIS: &str = "quick_analysis";
pub const PROFESSIONAL_ANALYSIS: &str = "professional_analysis";
pub const ENTERPRISE_EVALUATION: &str = "enterprise_evaluation";
pub const FORENSIC_INVESTIGATION: &str = "forensic_investigation";

/// A goal the user can pick during onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub id: IntentId,
    pub label: String,
    /// Revealed when the intent is selected.
    #[serde(default)]
    pub starter_features: Vec<FeatureKey>,
}

/// The set of selectable intents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentCatalog {
    pub intents: Vec<IntentDefinition>,
}

static BUILTIN: Lazy<IntentCatalog> = Lazy::new(|| {
    fn intent(id: &str, label: &str, starters: &[&str]) -> IntentDefinition {
        IntentDefinition {
            id: IntentId::from(id),
            label: label.to_string(),
            starter_features: starters.iter().map(|key| FeatureKey::from(*key)).collect(),
        }
    }

    IntentCatalog {
        intents: vec![
            intent(
                QUICK_ANALYSIS,
                "Check a few photos quickly",
                &[features::SINGLE_UPLOAD, features::EXIF_VIEWER],
            ),
            intent(
                PROFESSIONAL_ANALYSIS,
                "Analyze image collections for work",
                &[features::BATCH_UPLOAD, features::CSV_EXPORT],
            ),
            intent(
                ENTERPRISE_EVALUATION,
                "Evaluate Metascope for my organization",
                &[features::API_ACCESS, features::TEAM_WORKSPACE, features::AUDIT_LOG],
            ),
            intent(
                FORENSIC_INVESTIGATION,
                "Investigate image authenticity",
                &[features::HASH_VERIFICATION, features::FORENSIC_TIMELINE],
            ),
        ],
    }
});

impl IntentCatalog {
    /// The built-in intents.
    pub fn builtin() -> &'static IntentCatalog {
        &BUILTIN
    }

    pub fn find(&self, id: &str) -> Option<&IntentDefinition> {
        self.intents.iter().find(|intent| intent.id.as_str() == id)
    }
}
