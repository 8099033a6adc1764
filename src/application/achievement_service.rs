//! AchievementTracker - completion checks with their side effects.
//!
//! On every completion: the flag flips once, the unlock list is revealed
//! through the context store, one `achievement_unlocked` event is emitted and
//! a notification is queued. The whole catalog, flags included, is persisted.

use std::sync::{Arc, PoisonError, RwLock};

use super::context_store::UserContextStore;
use super::hint_scheduler::HintScheduler;
use crate::domain::achievements::{self, AchievementCatalog, AchievementDefinition};
use crate::domain::foundation::{categories, event_names, AnalyticsEvent};
use crate::domain::rules::{EvaluationInput, PredicateRegistry};
use crate::ports::{load_json, save_json, storage_keys, AnalyticsSink, KeyValueStore};

pub struct AchievementTracker {
    registry: Arc<PredicateRegistry>,
    storage: Arc<dyn KeyValueStore>,
    analytics: Arc<dyn AnalyticsSink>,
    catalog: RwLock<AchievementCatalog>,
}

impl AchievementTracker {
    /// Creates the tracker, merging persisted completion flags over `definitions`.
    ///
    /// An unreadable record is logged and every achievement starts incomplete.
    pub fn load(
        definitions: &AchievementCatalog,
        registry: Arc<PredicateRegistry>,
        storage: Arc<dyn KeyValueStore>,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        let catalog =
            match load_json::<AchievementCatalog>(storage.as_ref(), storage_keys::ACHIEVEMENTS) {
                Ok(Some(persisted)) => definitions.merged_with(&persisted),
                Ok(None) => definitions.clone(),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable achievements");
                    definitions.clone()
                }
            };

        tracing::debug!(
            total = catalog.len(),
            completed = catalog.completed_count(),
            "Achievements loaded"
        );

        Self {
            registry,
            storage,
            analytics,
            catalog: RwLock::new(catalog),
        }
    }

    /// Snapshot of the catalog with completion flags.
    pub fn catalog(&self) -> AchievementCatalog {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Evaluates incomplete achievements and applies every new completion.
    ///
    /// Returns the newly completed achievements in catalog order. Running it
    /// again with the same input returns nothing.
    pub fn check(
        &self,
        input: &EvaluationInput<'_>,
        store: &UserContextStore,
        scheduler: &HintScheduler,
    ) -> Vec<AchievementDefinition> {
        let newly_completed = {
            let mut catalog = self
                .catalog
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let result = achievements::check(&catalog, &self.registry, input);
            if !result.has_changes() {
                return Vec::new();
            }
            *catalog = result.catalog;
            self.persist(&catalog);
            result.newly_completed
        };

        for achievement in &newly_completed {
            let revealed = store.reveal_features(achievement.unlocks.iter().cloned());
            tracing::info!(
                achievement = %achievement.id,
                revealed = revealed.len(),
                "Achievement unlocked"
            );

            self.analytics.track(
                AnalyticsEvent::new(event_names::ACHIEVEMENT_UNLOCKED, categories::ENGAGEMENT)
                    .with_label(achievement.id.as_str())
                    .with_property("unlocks", &achievement.unlocks)
                    .with_property("newly_revealed", &revealed),
            );
            scheduler.notify_achievement(achievement.clone());
        }

        newly_completed
    }

    fn persist(&self, catalog: &AchievementCatalog) {
        if let Err(e) = save_json(self.storage.as_ref(), storage_keys::ACHIEVEMENTS, catalog) {
            tracing::warn!(error = %e, "Failed to persist achievements");
        }
    }
}
