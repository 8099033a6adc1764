//! HintService - trigger evaluation with its side effects.
//!
//! Wraps the pure [`TriggerEvaluator`] with the persisted dismissed set, the
//! active queue owned by the [`HintScheduler`], and analytics.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::hint_scheduler::{HintScheduler, HintSource};
use crate::domain::foundation::{
    categories, event_names, AnalyticsEvent, DomainError, ErrorCode, HintId,
};
use crate::domain::hints::{HintCatalog, HintDefinition, TriggerEvaluator};
use crate::domain::rules::EvaluationInput;
use crate::ports::{load_json, save_json, storage_keys, AnalyticsSink, KeyValueStore};

pub struct HintService {
    catalog: Arc<HintCatalog>,
    evaluator: TriggerEvaluator,
    storage: Arc<dyn KeyValueStore>,
    analytics: Arc<dyn AnalyticsSink>,
    dismissed: RwLock<BTreeSet<HintId>>,
    // ids that already emitted `hint_shown` in this session
    announced: Mutex<BTreeSet<HintId>>,
}

impl HintService {
    /// Creates the service and loads the dismissed set.
    ///
    /// An unreadable dismissed set is logged and treated as empty.
    pub fn load(
        catalog: Arc<HintCatalog>,
        evaluator: TriggerEvaluator,
        storage: Arc<dyn KeyValueStore>,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        let dismissed =
            match load_json::<BTreeSet<HintId>>(storage.as_ref(), storage_keys::DISMISSED_HINTS) {
                Ok(ids) => ids.unwrap_or_default(),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable dismissed hints");
                    BTreeSet::new()
                }
            };

        Self {
            catalog,
            evaluator,
            storage,
            analytics,
            dismissed: RwLock::new(dismissed),
            announced: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn catalog(&self) -> &HintCatalog {
        &self.catalog
    }

    pub fn evaluator(&self) -> &TriggerEvaluator {
        &self.evaluator
    }

    pub fn dismissed(&self) -> BTreeSet<HintId> {
        self.dismissed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_dismissed(&self, id: &str) -> bool {
        self.dismissed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// Admits newly eligible hints into the active queue.
    ///
    /// A hint emits `hint_shown` the first time it joins the queue in this
    /// session; later re-admissions after a prune stay silent. Returns the
    /// admitted hints in admission order.
    pub fn evaluate(
        &self,
        input: &EvaluationInput<'_>,
        scheduler: &HintScheduler,
    ) -> Vec<HintDefinition> {
        let active = scheduler.active_hint_ids();
        let dismissed = self.dismissed();
        let eligible = self
            .evaluator
            .evaluate(&self.catalog, input, &active, &dismissed);

        let mut admitted = Vec::with_capacity(eligible.len());
        for hint in eligible {
            if scheduler.is_active(hint.id.as_str()) {
                continue;
            }
            self.track_shown(&hint, HintSource::Triggered);
            if scheduler.push_hint(hint.clone(), HintSource::Triggered) {
                admitted.push(hint);
            }
        }

        if !admitted.is_empty() {
            tracing::debug!(count = admitted.len(), "Hints admitted");
        }
        admitted
    }

    /// Removes active hints whose backing condition no longer holds.
    ///
    /// Removed hints are not dismissed and may be offered again later.
    pub fn prune(&self, input: &EvaluationInput<'_>, scheduler: &HintScheduler) -> Vec<HintId> {
        let removed = scheduler.retain_hints(|hint| {
            let requested = hint.source == HintSource::Requested;
            self.evaluator.still_holds(&hint.definition, input, requested)
        });
        for id in &removed {
            tracing::debug!(hint = %id, "Pruned hint whose condition no longer holds");
        }
        removed
    }

    /// Shows a catalog hint on direct request, even if dismissed or untriggered.
    ///
    /// Returns false if the hint was already on screen.
    ///
    /// # Errors
    ///
    /// `HintNotFound` if no catalog hint has this id.
    pub fn show(&self, id: &str, scheduler: &HintScheduler) -> Result<bool, DomainError> {
        let hint = self.find(id)?.clone();
        if scheduler.is_active(id) {
            return Ok(false);
        }
        self.track_shown(&hint, HintSource::Requested);
        Ok(scheduler.push_hint(hint, HintSource::Requested))
    }

    /// Removes the hint from the queue and remembers the dismissal for good.
    ///
    /// # Errors
    ///
    /// `HintNotFound` for unknown ids, `HintNotDismissible` for hints the
    /// catalog marks as not dismissible.
    pub fn dismiss(&self, id: &str, scheduler: &HintScheduler) -> Result<(), DomainError> {
        let hint = self.find(id)?;
        if !hint.dismissible {
            return Err(DomainError::new(
                ErrorCode::HintNotDismissible,
                format!("Hint '{id}' cannot be dismissed"),
            ));
        }

        let was_active = scheduler.remove_hint(id).is_some();
        let newly_dismissed = {
            let mut dismissed = self
                .dismissed
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let inserted = dismissed.insert(hint.id.clone());
            if inserted {
                self.persist(&dismissed);
            }
            inserted
        };

        if was_active || newly_dismissed {
            self.analytics.track(
                AnalyticsEvent::new(event_names::HINT_DISMISSED, categories::CONTEXTUAL_HELP)
                    .with_label(hint.id.as_str())
                    .with_property("was_active", was_active),
            );
        }
        Ok(())
    }

    fn find(&self, id: &str) -> Result<&HintDefinition, DomainError> {
        self.catalog.get(id).ok_or_else(|| {
            DomainError::new(ErrorCode::HintNotFound, format!("Unknown hint '{id}'"))
        })
    }

    fn track_shown(&self, hint: &HintDefinition, source: HintSource) {
        let first_showing = self
            .announced
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(hint.id.clone());
        if !first_showing {
            tracing::debug!(hint = %hint.id, "Hint shown again, already announced");
            return;
        }

        let mut event = AnalyticsEvent::new(event_names::HINT_SHOWN, categories::CONTEXTUAL_HELP)
            .with_label(hint.id.as_str())
            .with_property("priority", hint.priority.as_str())
            .with_property("trigger", &hint.trigger)
            .with_property("source", source);
        if let Some(gate) = &hint.upgrade_gate {
            event = event.with_property("upgrade_gate", gate);
        }
        self.analytics.track(event);
    }

    fn persist(&self, dismissed: &BTreeSet<HintId>) {
        if let Err(e) = save_json(self.storage.as_ref(), storage_keys::DISMISSED_HINTS, dismissed) {
            tracing::warn!(error = %e, "Failed to persist dismissed hints");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::analytics::RecordingAnalyticsSink;
    use crate::adapters::kv::InMemoryKeyValueStore;
    use crate::domain::context::{Usage, UserContext};
    use crate::domain::features;
    use crate::domain::foundation::FeatureKey;
    use crate::domain::hints::catalog::{BATCH_PROCESSING_HINT, GPS_MAP_HINT};
    use crate::domain::hints::{HintPlacement, HintPriority};
    use crate::domain::rules::PredicateRegistry;
    use crate::domain::visibility::FeatureVisibilityResolver;
    use std::time::Duration;

    struct Fixture {
        kv: Arc<InMemoryKeyValueStore>,
        analytics: Arc<RecordingAnalyticsSink>,
        service: HintService,
        scheduler: HintScheduler,
    }

    fn fixture_with(catalog: HintCatalog) -> Fixture {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let analytics = Arc::new(RecordingAnalyticsSink::new());
        let evaluator = TriggerEvaluator::new(
            Arc::new(PredicateRegistry::builtin().clone()),
            FeatureVisibilityResolver::default(),
            2,
        );
        let service = HintService::load(Arc::new(catalog), evaluator, kv.clone(), analytics.clone());
        Fixture {
            kv,
            analytics,
            service,
            scheduler: HintScheduler::new(Duration::from_secs(5)),
        }
    }

    fn fixture() -> Fixture {
        fixture_with(HintCatalog::builtin().clone())
    }

    fn three_single_uploads() -> UserContext {
        let mut usage = Usage::default();
        for _ in 0..3 {
            usage.record_feature(FeatureKey::from(features::SINGLE_UPLOAD));
        }
        UserContext::default().with_usage(usage)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Evaluation
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn triggered_hint_is_admitted_once_with_one_event() {
        let f = fixture();
        let ctx = three_single_uploads();
        let input = EvaluationInput::new(&ctx);

        let first = f.service.evaluate(&input, &f.scheduler);
        let second = f.service.evaluate(&input, &f.scheduler);

        assert!(first.iter().any(|h| h.id.as_str() == BATCH_PROCESSING_HINT));
        assert!(second.is_empty());
        assert!(f.scheduler.is_active(BATCH_PROCESSING_HINT));
        assert_eq!(
            f.analytics
                .events_named(event_names::HINT_SHOWN)
                .iter()
                .filter(|e| e.label.as_deref() == Some(BATCH_PROCESSING_HINT))
                .count(),
            1
        );
    }

    #[test]
    fn readmitted_hint_is_announced_once() {
        let f = fixture();
        let triggered = three_single_uploads();
        f.service.evaluate(&EvaluationInput::new(&triggered), &f.scheduler);

        let quiet = UserContext::default();
        let pruned = f.service.prune(&EvaluationInput::new(&quiet), &f.scheduler);
        assert_eq!(pruned, vec![HintId::from(BATCH_PROCESSING_HINT)]);

        let again = f
            .service
            .evaluate(&EvaluationInput::new(&triggered), &f.scheduler);
        assert!(again.iter().any(|h| h.id.as_str() == BATCH_PROCESSING_HINT));
        assert_eq!(
            f.analytics
                .events_named(event_names::HINT_SHOWN)
                .iter()
                .filter(|e| e.label.as_deref() == Some(BATCH_PROCESSING_HINT))
                .count(),
            1
        );
    }

    #[test]
    fn dismissed_hint_never_returns() {
        let f = fixture();
        let ctx = three_single_uploads();
        let input = EvaluationInput::new(&ctx);

        f.service.evaluate(&input, &f.scheduler);
        f.service.dismiss(BATCH_PROCESSING_HINT, &f.scheduler).unwrap();

        assert!(!f.scheduler.is_active(BATCH_PROCESSING_HINT));
        for _ in 0..3 {
            let admitted = f.service.evaluate(&input, &f.scheduler);
            assert!(admitted.iter().all(|h| h.id.as_str() != BATCH_PROCESSING_HINT));
        }
        assert!(f.analytics.has_event(event_names::HINT_DISMISSED, BATCH_PROCESSING_HINT));
    }

    #[test]
    fn dismissed_set_survives_reload() {
        let f = fixture();
        f.service.dismiss(GPS_MAP_HINT, &f.scheduler).unwrap();

        let evaluator = f.service.evaluator().clone();
        let reloaded = HintService::load(
            Arc::new(HintCatalog::builtin().clone()),
            evaluator,
            f.kv.clone(),
            f.analytics.clone(),
        );
        assert!(reloaded.is_dismissed(GPS_MAP_HINT));
    }

    #[test]
    fn corrupt_dismissed_record_is_ignored() {
        let kv = Arc::new(InMemoryKeyValueStore::new().with_record("dismissed-hints", "42"));
        let service = HintService::load(
            Arc::new(HintCatalog::builtin().clone()),
            fixture().service.evaluator().clone(),
            kv,
            Arc::new(RecordingAnalyticsSink::new()),
        );
        assert!(service.dismissed().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Direct requests and dismissal errors
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn dismissed_hint_can_still_be_requested() {
        let f = fixture();
        f.service.dismiss(GPS_MAP_HINT, &f.scheduler).unwrap();

        assert!(f.service.show(GPS_MAP_HINT, &f.scheduler).unwrap());
        assert!(!f.service.show(GPS_MAP_HINT, &f.scheduler).unwrap());
        assert_eq!(f.scheduler.active_hints()[0].source, HintSource::Requested);
    }

    #[test]
    fn unknown_hint_is_not_found() {
        let f = fixture();
        let err = f.service.show("nope", &f.scheduler).unwrap_err();
        assert_eq!(err.code, ErrorCode::HintNotFound);
        let err = f.service.dismiss("nope", &f.scheduler).unwrap_err();
        assert_eq!(err.code, ErrorCode::HintNotFound);
    }

    #[test]
    fn non_dismissible_hint_is_rejected() {
        let pinned = HintDefinition {
            id: HintId::from("pinned"),
            title: "Pinned".to_string(),
            content: "Always here".to_string(),
            trigger: "always".to_string(),
            placement: HintPlacement::Top,
            priority: HintPriority::Low,
            required_features: vec![],
            dismissible: false,
            upgrade_gate: None,
        };
        let f = fixture_with(HintCatalog::new(vec![pinned]));
        f.service.show("pinned", &f.scheduler).unwrap();

        let err = f.service.dismiss("pinned", &f.scheduler).unwrap_err();
        assert_eq!(err.code, ErrorCode::HintNotDismissible);
        assert!(f.scheduler.is_active("pinned"));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Pruning
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn requested_hint_is_pruned_when_required_feature_is_hidden() {
        let f = fixture();
        let ctx = UserContext::default();
        // advanced_filters is expert-only
        f.service.show("advanced_filters_hint", &f.scheduler).unwrap();

        let removed = f.service.prune(&EvaluationInput::new(&ctx), &f.scheduler);
        assert_eq!(removed, vec![HintId::from("advanced_filters_hint")]);
        assert!(!f.service.is_dismissed("advanced_filters_hint"));
    }

    #[test]
    fn requested_hint_survives_false_trigger() {
        let f = fixture();
        let ctx = UserContext::default();
        f.service.show(GPS_MAP_HINT, &f.scheduler).unwrap();

        let removed = f.service.prune(&EvaluationInput::new(&ctx), &f.scheduler);
        assert!(removed.is_empty());
    }
}
