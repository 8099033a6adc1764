//! The static catalog of contextual hints.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{HintDefinition, HintPlacement, HintPriority};
use crate::domain::features;
use crate::domain::foundation::{FeatureKey, HintId};
use crate::domain::rules::predicates;

pub const BATCH_PROCESSING_HINT: &str = "batch_processing_hint";
pub const EXPORT_OPTIONS_HINT: &str = "export_options_hint";
pub const GPS_MAP_HINT: &str = "gps_map_hint";
pub const KEYBOARD_SHORTCUTS_HINT: &str = "keyboard_shortcuts_hint";
pub const ADVANCED_FILTERS_HINT: &str = "advanced_filters_hint";
pub const API_ACCESS_HINT: &str = "api_access_hint";

/// Ordered list of hints. Order breaks ties between equal priorities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HintCatalog {
    hints: Vec<HintDefinition>,
}

struct Entry<'a> {
    id: &'a str,
    title: &'a str,
    content: &'a str,
    trigger: &'a str,
    placement: HintPlacement,
    priority: HintPriority,
    required: &'a [&'a str],
    upgrade_gate: Option<&'a str>,
}

impl From<Entry<'_>> for HintDefinition {
    fn from(entry: Entry<'_>) -> Self {
        HintDefinition {
            id: HintId::from(entry.id),
            title: entry.title.to_string(),
            content: entry.content.to_string(),
            trigger: entry.trigger.to_string(),
            placement: entry.placement,
            priority: entry.priority,
            required_features: entry.required.iter().map(|k| FeatureKey::from(*k)).collect(),
            dismissible: true,
            upgrade_gate: entry.upgrade_gate.map(str::to_string),
        }
    }
}

static BUILTIN: Lazy<HintCatalog> = Lazy::new(|| {
    HintCatalog::new(vec![
        Entry {
            id: BATCH_PROCESSING_HINT,
            title: "Upload many images at once",
            content: "Drop a folder or several files to extract metadata from all of them in one go.",
            trigger: predicates::REPEATED_SINGLE_UPLOADS,
            placement: HintPlacement::Bottom,
            priority: HintPriority::Medium,
            required: &[],
            upgrade_gate: None,
        }
        .into(),
        Entry {
            id: EXPORT_OPTIONS_HINT,
            title: "Take your metadata with you",
            content: "Export the fields you are looking at as JSON, CSV or a PDF report.",
            trigger: predicates::EXPORT_CURIOSITY,
            placement: HintPlacement::Left,
            priority: HintPriority::Low,
            required: &[features::METADATA_EXPORT],
            upgrade_gate: None,
        }
        .into(),
        Entry {
            id: GPS_MAP_HINT,
            title: "See where it was taken",
            content: "This image carries GPS coordinates. Open the map view to plot them.",
            trigger: predicates::LOCATION_DATA_SEEN,
            placement: HintPlacement::Right,
            priority: HintPriority::Low,
            required: &[features::GPS_MAP],
            upgrade_gate: None,
        }
        .into(),
        Entry {
            id: KEYBOARD_SHORTCUTS_HINT,
            title: "Work faster with shortcuts",
            content: "Press ? anywhere to list keyboard shortcuts.",
            trigger: predicates::RETURNING_USER,
            placement: HintPlacement::Top,
            priority: HintPriority::Low,
            required: &[features::KEYBOARD_SHORTCUTS],
            upgrade_gate: None,
        }
        .into(),
        Entry {
            id: ADVANCED_FILTERS_HINT,
            title: "Filter by any tag",
            content: "Combine camera model, lens, date and location filters across your library.",
            trigger: predicates::FILTERING_READY,
            placement: HintPlacement::Bottom,
            priority: HintPriority::Medium,
            required: &[features::ADVANCED_FILTERS],
            upgrade_gate: None,
        }
        .into(),
        Entry {
            id: API_ACCESS_HINT,
            title: "Automate with the API",
            content: "Integrate metadata extraction into your pipeline with the REST API.",
            trigger: predicates::ENTERPRISE_INTEREST,
            placement: HintPlacement::Center,
            priority: HintPriority::High,
            required: &[],
            upgrade_gate: Some("enterprise"),
        }
        .into(),
    ])
});

impl HintCatalog {
    pub fn new(hints: Vec<HintDefinition>) -> Self {
        Self { hints }
    }

    pub fn builtin() -> &'static HintCatalog {
        &BUILTIN
    }

    pub fn get(&self, id: &str) -> Option<&HintDefinition> {
        self.hints.iter().find(|hint| hint.id.as_str() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HintDefinition> {
        self.hints.iter()
    }

    pub fn len(&self) -> usize {
        self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::PredicateRegistry;

    #[test]
    fn builtin_contains_batch_processing_hint() {
        let hint = HintCatalog::builtin().get(BATCH_PROCESSING_HINT).unwrap();
        assert_eq!(hint.trigger, predicates::REPEATED_SINGLE_UPLOADS);
        assert!(hint.dismissible);
    }

    #[test]
    fn every_builtin_trigger_is_registered() {
        let registry = PredicateRegistry::builtin();
        for hint in HintCatalog::builtin().iter() {
            assert!(registry.contains(&hint.trigger), "missing trigger {}", hint.trigger);
        }
    }

    #[test]
    fn api_hint_is_high_priority_upsell() {
        let hint = HintCatalog::builtin().get(API_ACCESS_HINT).unwrap();
        assert!(hint.is_high_priority());
        assert_eq!(hint.upgrade_gate.as_deref(), Some("enterprise"));
    }
}
