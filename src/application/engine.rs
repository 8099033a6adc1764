//! PersonalizationEngine - the wired-up engine collaborators talk to.
//!
//! Instantiated once at process start and passed by reference. The engine
//! subscribes to its context store, so every effective mutation is followed by
//! a re-evaluation pass (achievements first, since unlocks can change hint
//! visibility, then hint pruning and admission) no matter who made it.
//! Re-evaluation is idempotent.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::achievement_service::AchievementTracker;
use super::context_store::{ContextChange, SubscriptionId, UserContextStore};
use super::hint_scheduler::{AchievementNotification, ActiveHint, HintScheduler};
use super::hint_service::HintService;
use super::navigation_composer::NavigationComposer;
use crate::domain::achievements::{AchievementCatalog, AchievementDefinition};
use crate::domain::context::{ContextPatch, IntentCatalog, PreferencesPatch, UserContext};
use crate::domain::foundation::{
    categories, event_names, AchievementId, AnalyticsEvent, DomainError, ErrorCode, FeatureKey,
    HintId, Timestamp,
};
use crate::domain::hints::{HintCatalog, HintDefinition, TriggerEvaluator};
use crate::domain::navigation::{resolve_user_tier, ComposedNavigation, NavCatalog, UserTier};
use crate::domain::rules::{Counters, EvaluationInput, PredicateRegistry, PROCESSED_IMAGE_COUNT};
use crate::domain::visibility::{FeatureVisibilityResolver, VisibilityReason, VisibilityRuleTable};
use crate::ports::{AnalyticsSink, CounterStore, KeyValueStore};

/// Static catalogs the engine evaluates against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCatalogs {
    pub predicates: PredicateRegistry,
    pub visibility: VisibilityRuleTable,
    pub hints: HintCatalog,
    pub achievements: AchievementCatalog,
    pub navigation: NavCatalog,
    pub intents: IntentCatalog,
}

impl Default for EngineCatalogs {
    fn default() -> Self {
        Self {
            predicates: PredicateRegistry::builtin().clone(),
            visibility: VisibilityRuleTable::builtin().clone(),
            hints: HintCatalog::builtin().clone(),
            achievements: AchievementCatalog::builtin().clone(),
            navigation: NavCatalog::builtin().clone(),
            intents: IntentCatalog::builtin().clone(),
        }
    }
}

/// Tunables for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Max simultaneously active low/medium-priority hints.
    pub hint_concurrency_cap: usize,
    /// Lifetime of an achievement notification.
    pub notification_auto_dismiss: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            hint_concurrency_cap: 2,
            notification_auto_dismiss: Duration::from_millis(5000),
        }
    }
}

/// External collaborators the engine depends on.
#[derive(Clone)]
pub struct EnginePorts {
    pub storage: Arc<dyn KeyValueStore>,
    pub counters: Arc<dyn CounterStore>,
    pub analytics: Arc<dyn AnalyticsSink>,
}

/// What one re-evaluation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub completed: Vec<AchievementDefinition>,
    pub shown: Vec<HintDefinition>,
    pub pruned: Vec<HintId>,
}

impl RefreshOutcome {
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.shown.is_empty() && self.pruned.is_empty()
    }

    fn absorb(&mut self, other: RefreshOutcome) {
        self.completed.extend(other.completed);
        self.shown.extend(other.shown);
        self.pruned.extend(other.pruned);
    }
}

#[derive(Debug, Default)]
struct GateState {
    running: bool,
    dirty: bool,
}

/// Serializes re-evaluation passes.
///
/// A change reported while a pass is running marks the gate dirty; the running
/// pass then repeats instead of a second pass nesting inside it.
#[derive(Debug, Default)]
struct RefreshGate {
    state: Mutex<GateState>,
}

impl RefreshGate {
    /// Claims the gate, or marks it dirty and returns `None` if a pass is
    /// already running.
    fn enter(&self) -> Option<GateClaim<'_>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.running {
            state.dirty = true;
            return None;
        }
        state.running = true;
        state.dirty = false;
        Some(GateClaim {
            gate: self,
            released: Cell::new(false),
        })
    }
}

struct GateClaim<'a> {
    gate: &'a RefreshGate,
    released: Cell<bool>,
}

impl GateClaim<'_> {
    /// Returns true if changes arrived during the last pass. Otherwise
    /// releases the gate in the same critical section.
    fn needs_another_pass(&self) -> bool {
        let mut state = self
            .gate
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if state.dirty {
            state.dirty = false;
            return true;
        }
        state.running = false;
        self.released.set(true);
        false
    }
}

impl Drop for GateClaim<'_> {
    fn drop(&mut self) {
        if !self.released.get() {
            self.gate
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .running = false;
        }
    }
}

/// The wired-up engine. Dropping it detaches it from the store.
pub struct PersonalizationEngine {
    core: Arc<EngineCore>,
    subscription: SubscriptionId,
}

struct EngineCore {
    store: Arc<UserContextStore>,
    counters: Arc<dyn CounterStore>,
    analytics: Arc<dyn AnalyticsSink>,
    intents: Arc<IntentCatalog>,
    resolver: FeatureVisibilityResolver,
    counter_names: BTreeSet<String>,
    hints: HintService,
    achievements: AchievementTracker,
    navigation: NavigationComposer,
    scheduler: HintScheduler,
    gate: RefreshGate,
}

impl PersonalizationEngine {
    /// Hydrates all persisted state and wires the components.
    ///
    /// Does not start a session and does not run a re-evaluation pass.
    pub fn new(ports: EnginePorts, catalogs: EngineCatalogs, settings: EngineSettings) -> Self {
        let EngineCatalogs {
            predicates,
            visibility,
            hints,
            achievements,
            navigation,
            intents,
        } = catalogs;

        let registry = Arc::new(predicates);
        let resolver = FeatureVisibilityResolver::new(visibility);
        let counter_names = registry.counter_names();

        let store = Arc::new(UserContextStore::load(ports.storage.clone()));
        let evaluator = TriggerEvaluator::new(
            registry.clone(),
            resolver.clone(),
            settings.hint_concurrency_cap,
        );
        let hints = HintService::load(
            Arc::new(hints),
            evaluator,
            ports.storage.clone(),
            ports.analytics.clone(),
        );
        let achievements = AchievementTracker::load(
            &achievements,
            registry,
            ports.storage.clone(),
            ports.analytics.clone(),
        );
        let navigation = NavigationComposer::new(
            Arc::new(navigation),
            resolver.clone(),
            ports.analytics.clone(),
        );

        tracing::info!(
            concurrency_cap = settings.hint_concurrency_cap,
            auto_dismiss_ms = settings.notification_auto_dismiss.as_millis() as u64,
            "Personalization engine ready"
        );

        let core = Arc::new(EngineCore {
            store,
            counters: ports.counters,
            analytics: ports.analytics,
            intents: Arc::new(intents),
            resolver,
            counter_names,
            hints,
            achievements,
            navigation,
            scheduler: HintScheduler::new(settings.notification_auto_dismiss),
            gate: RefreshGate::default(),
        });

        let weak = Arc::downgrade(&core);
        let subscription = core.store.subscribe(move |change: &ContextChange| {
            if let Some(core) = weak.upgrade() {
                tracing::trace!(kind = ?change.kind, "Context changed, re-evaluating");
                core.refresh();
            }
        });

        Self { core, subscription }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Context
    // ════════════════════════════════════════════════════════════════════════

    /// The shared context store.
    ///
    /// Mutations made directly on the store re-evaluate achievements and hints
    /// like the engine's own wrappers do; only the [`RefreshOutcome`] is not
    /// reported back.
    pub fn store(&self) -> &Arc<UserContextStore> {
        &self.core.store
    }

    pub fn context(&self) -> UserContext {
        self.core.store.get()
    }

    /// Counts a new session and re-evaluates.
    pub fn start_session(&self) -> RefreshOutcome {
        let core = &self.core;
        let (sessions, outcome) = core.drive(|| core.store.start_session());
        tracing::info!(sessions, "Session started");
        outcome
    }

    /// Records a usage event and re-evaluates.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for a blank key.
    pub fn mark_feature_used(&self, key: &str) -> Result<RefreshOutcome, DomainError> {
        let key = FeatureKey::new(key)?;
        let core = &self.core;
        let ((), outcome) = core.drive(|| {
            let first_use = core.store.mark_feature_used(key.clone());
            let level = core.store.with_context(|ctx| ctx.experience_level());

            core.analytics.track(
                AnalyticsEvent::new(event_names::FEATURE_USED, categories::USAGE)
                    .with_label(key.as_str())
                    .with_property("first_use", first_use)
                    .with_property("experience_level", level),
            );
        });
        Ok(outcome)
    }

    pub fn record_processing_time(&self, millis: u64) -> RefreshOutcome {
        let core = &self.core;
        core.drive(|| core.store.record_processing_time(millis)).1
    }

    /// Bumps the processed-image counter and re-evaluates.
    pub fn record_processed_images(&self, count: u64) -> RefreshOutcome {
        let core = &self.core;
        core.drive(|| match core.counters.increment(PROCESSED_IMAGE_COUNT, count) {
            Ok(total) => tracing::debug!(total, "Processed image count updated"),
            Err(e) => tracing::warn!(error = %e, "Failed to update processed image count"),
        })
        .1
    }

    /// Applies a partial update of the user-editable fields and re-evaluates.
    pub fn patch(&self, patch: ContextPatch) -> RefreshOutcome {
        let core = &self.core;
        core.drive(|| {
            core.store.patch(patch);
        })
        .1
    }

    pub fn update_preferences(&self, patch: PreferencesPatch) -> RefreshOutcome {
        let core = &self.core;
        core.drive(|| core.store.update_preferences(patch)).1
    }

    // ════════════════════════════════════════════════════════════════════════
    // Onboarding
    // ════════════════════════════════════════════════════════════════════════

    /// Selects the onboarding intent, revealing its starter features.
    ///
    /// # Errors
    ///
    /// `UnknownIntent` if the id is not in the intent catalog,
    /// `IntentAlreadySelected` if an intent is already set.
    pub fn select_intent(&self, id: &str) -> Result<RefreshOutcome, DomainError> {
        let core = &self.core;
        let intent = core.intents.find(id).ok_or_else(|| {
            DomainError::new(ErrorCode::UnknownIntent, format!("Unknown intent '{id}'"))
        })?;
        let (selected, outcome) = core.drive(|| {
            let revealed = core.store.select_intent(intent)?;
            core.analytics.track(
                AnalyticsEvent::new(event_names::INTENT_SELECTED, categories::ONBOARDING)
                    .with_label(intent.id.as_str())
                    .with_property("revealed", &revealed),
            );
            Ok::<(), DomainError>(())
        });
        selected.map(|()| outcome)
    }

    pub fn complete_onboarding(&self) {
        let core = &self.core;
        core.drive(|| {
            if core.store.complete_onboarding() {
                core.analytics.track(AnalyticsEvent::new(
                    event_names::ONBOARDING_COMPLETED,
                    categories::ONBOARDING,
                ));
            }
        });
    }

    /// Clears intent, completion and reveals, then re-evaluates so hints whose
    /// features disappeared are pruned.
    pub fn reset_onboarding(&self) -> RefreshOutcome {
        let core = &self.core;
        core.drive(|| {
            core.store.reset_onboarding();
            core.analytics.track(AnalyticsEvent::new(
                event_names::ONBOARDING_RESET,
                categories::ONBOARDING,
            ));
        })
        .1
    }

    // ════════════════════════════════════════════════════════════════════════
    // Re-evaluation
    // ════════════════════════════════════════════════════════════════════════

    /// Runs achievements, then prunes and admits hints.
    ///
    /// Returns an empty outcome if another pass is already running; that pass
    /// repeats and picks up whatever changed.
    pub fn refresh(&self) -> RefreshOutcome {
        self.core.refresh()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Visibility and navigation
    // ════════════════════════════════════════════════════════════════════════

    pub fn should_show(&self, feature: &str) -> bool {
        self.core
            .store
            .with_context(|ctx| self.core.resolver.should_show(feature, ctx))
    }

    pub fn visibility_reason(&self, feature: &str) -> Option<VisibilityReason> {
        self.core
            .store
            .with_context(|ctx| self.core.resolver.reason(feature, ctx))
    }

    pub fn resolve_tier(&self, email: Option<&str>) -> UserTier {
        self.core
            .store
            .with_context(|ctx| resolve_user_tier(ctx, email))
    }

    /// Composes navigation for the tier resolved from the context and email.
    pub fn compose_navigation(&self, email: Option<&str>) -> ComposedNavigation {
        let context = self.core.store.get();
        let tier = resolve_user_tier(&context, email);
        self.core.navigation.compose(tier, &context)
    }

    pub fn compose_navigation_for(&self, tier: UserTier) -> ComposedNavigation {
        let context = self.core.store.get();
        self.core.navigation.compose(tier, &context)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Hints and notifications
    // ════════════════════════════════════════════════════════════════════════

    pub fn active_hints(&self) -> Vec<ActiveHint> {
        self.core.scheduler.active_hints()
    }

    pub fn dismissed_hints(&self) -> BTreeSet<HintId> {
        self.core.hints.dismissed()
    }

    /// # Errors
    ///
    /// `HintNotFound` for ids missing from the catalog.
    pub fn show_hint(&self, id: &str) -> Result<bool, DomainError> {
        self.core.hints.show(id, &self.core.scheduler)
    }

    /// # Errors
    ///
    /// `HintNotFound` or `HintNotDismissible`.
    pub fn dismiss_hint(&self, id: &str) -> Result<(), DomainError> {
        self.core.hints.dismiss(id, &self.core.scheduler)
    }

    pub fn notifications(&self) -> Vec<AchievementNotification> {
        self.core.scheduler.notifications()
    }

    pub fn dismiss_notification(&self, id: &str) -> bool {
        self.core.scheduler.dismiss_notification(id)
    }

    pub fn prune_expired_notifications(&self, now: Timestamp) -> Vec<AchievementId> {
        self.core.scheduler.prune_expired(now)
    }

    pub fn achievements(&self) -> AchievementCatalog {
        self.core.achievements.catalog()
    }

    /// Cancels pending timers and clears the transient queues.
    pub fn teardown(&self) {
        self.core.scheduler.teardown();
    }
}

impl Drop for PersonalizationEngine {
    fn drop(&mut self) {
        self.core.store.unsubscribe(self.subscription);
    }
}

impl EngineCore {
    /// Runs `mutation` while holding the refresh gate, then re-evaluates until
    /// no further changes are reported.
    ///
    /// Store notifications raised by `mutation` only mark the gate dirty, so
    /// the outcome of the whole sequence is returned here.
    fn drive<R>(&self, mutation: impl FnOnce() -> R) -> (R, RefreshOutcome) {
        match self.gate.enter() {
            Some(claim) => {
                let value = mutation();
                (value, self.run_passes(&claim))
            }
            None => {
                // another pass is running; make sure it sees this change
                let value = mutation();
                (value, self.refresh())
            }
        }
    }

    fn refresh(&self) -> RefreshOutcome {
        match self.gate.enter() {
            Some(claim) => self.run_passes(&claim),
            None => RefreshOutcome::default(),
        }
    }

    fn run_passes(&self, claim: &GateClaim<'_>) -> RefreshOutcome {
        let mut outcome = self.refresh_pass();
        while claim.needs_another_pass() {
            outcome.absorb(self.refresh_pass());
        }
        outcome
    }

    fn refresh_pass(&self) -> RefreshOutcome {
        let counters = self.read_counters();

        let context = self.store.get();
        let completed = self.achievements.check(
            &EvaluationInput::with_counters(&context, &counters),
            &self.store,
            &self.scheduler,
        );

        let context = if completed.is_empty() {
            context
        } else {
            self.store.get()
        };
        let input = EvaluationInput::with_counters(&context, &counters);
        let pruned = self.hints.prune(&input, &self.scheduler);
        let shown = self.hints.evaluate(&input, &self.scheduler);

        RefreshOutcome {
            completed,
            shown,
            pruned,
        }
    }

    fn read_counters(&self) -> Counters {
        let mut counters = Counters::new();
        for name in &self.counter_names {
            match self.counters.get(name) {
                Ok(value) => {
                    counters.insert(name.clone(), value);
                }
                Err(e) => tracing::warn!(counter = %name, error = %e, "Counter unavailable"),
            }
        }
        counters
    }
}
