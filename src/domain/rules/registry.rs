//! Named predicate registry.
//!
//! Hints and achievements refer to their conditions by name. An unknown name
//! never fires.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{Condition, EvaluationInput, PROCESSED_IMAGE_COUNT};
use crate::domain::context::{intent, ExperienceLevel};
use crate::domain::features;

/// Built-in predicate names.
pub mod predicates {
    pub const REPEATED_SINGLE_UPLOADS: &str = "repeated_single_uploads";
    pub const RETURNING_USER: &str = "returning_user";
    pub const EXPORT_CURIOSITY: &str = "export_curiosity";
    pub const LOCATION_DATA_SEEN: &str = "location_data_seen";
    pub const ENTERPRISE_INTEREST: &str = "enterprise_interest";
    pub const FILTERING_READY: &str = "filtering_ready";
    pub const FIRST_UPLOAD: &str = "first_upload";
    pub const FIRST_EXPORT: &str = "first_export";
    pub const FIRST_BATCH: &str = "first_batch";
    pub const TEN_IMAGES_PROCESSED: &str = "ten_images_processed";
    pub const WIDE_EXPLORATION: &str = "wide_exploration";
    pub const TEN_SESSIONS: &str = "ten_sessions";
}

/// Map from predicate name to condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredicateRegistry {
    predicates: BTreeMap<String, Condition>,
}

static BUILTIN: Lazy<PredicateRegistry> = Lazy::new(|| {
    use predicates::*;

    PredicateRegistry::default()
        .with(
            REPEATED_SINGLE_UPLOADS,
            Condition::feature_count_at_least(features::SINGLE_UPLOAD, 3),
        )
        .with(RETURNING_USER, Condition::SessionCountAtLeast { count: 5 })
        .with(
            EXPORT_CURIOSITY,
            Condition::any(vec![
                Condition::feature_count_at_least(features::EXIF_VIEWER, 5),
                Condition::feature_used(features::METADATA_EXPORT),
            ]),
        )
        .with(
            LOCATION_DATA_SEEN,
            Condition::all(vec![
                Condition::feature_used(features::EXIF_VIEWER),
                Condition::not(Condition::feature_used(features::GPS_MAP)),
            ]),
        )
        .with(
            ENTERPRISE_INTEREST,
            Condition::any(vec![
                Condition::intent_is(intent::ENTERPRISE_EVALUATION),
                Condition::feature_count_at_least(features::BATCH_UPLOAD, 3),
            ]),
        )
        .with(
            FILTERING_READY,
            Condition::all(vec![
                Condition::experience_at_least(ExperienceLevel::Intermediate),
                Condition::feature_count_at_least(features::EXIF_VIEWER, 3),
            ]),
        )
        .with(FIRST_UPLOAD, Condition::feature_used(features::SINGLE_UPLOAD))
        .with(
            FIRST_EXPORT,
            Condition::any(vec![
                Condition::feature_used(features::METADATA_EXPORT),
                Condition::feature_used(features::CSV_EXPORT),
                Condition::feature_used(features::PDF_REPORT),
            ]),
        )
        .with(FIRST_BATCH, Condition::feature_used(features::BATCH_UPLOAD))
        .with(
            TEN_IMAGES_PROCESSED,
            Condition::CounterAtLeast {
                counter: PROCESSED_IMAGE_COUNT.to_string(),
                value: 10,
            },
        )
        .with(WIDE_EXPLORATION, Condition::DistinctFeaturesAtLeast { count: 5 })
        .with(TEN_SESSIONS, Condition::SessionCountAtLeast { count: 10 })
});

impl PredicateRegistry {
    /// The built-in predicates.
    pub fn builtin() -> &'static PredicateRegistry {
        &BUILTIN
    }

    /// Adds or replaces a predicate.
    pub fn with(mut self, name: impl Into<String>, condition: Condition) -> Self {
        self.predicates.insert(name.into(), condition);
        self
    }

    /// Merges `other` over this registry. Entries in `other` win.
    pub fn merged(mut self, other: &PredicateRegistry) -> Self {
        for (name, condition) in &other.predicates {
            self.predicates.insert(name.clone(), condition.clone());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Condition> {
        self.predicates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Evaluates a named predicate. Unknown names are not satisfied.
    pub fn evaluate(&self, name: &str, input: &EvaluationInput<'_>) -> bool {
        match self.predicates.get(name) {
            Some(condition) => condition.evaluate(input),
            None => {
                tracing::debug!(predicate = name, "Unknown predicate treated as unsatisfied");
                false
            }
        }
    }

    /// Names of every external counter any predicate reads.
    pub fn counter_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for condition in self.predicates.values() {
            condition.collect_counters(&mut names);
        }
        names
    }
}
