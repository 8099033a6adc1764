//! UserContextStore - owner of the single `UserContext` for a process.
//!
//! Every mutation goes through one path: apply the change under the write
//! lock, reclassify when usage changed, persist the full context, release the
//! lock, then notify subscribers. Readers observe the new value as soon as the
//! mutating call returns.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::context::{ContextPatch, Intent, IntentDefinition, PreferencesPatch, UserContext};
use crate::domain::foundation::{DomainError, ErrorCode, FeatureKey, Timestamp};
use crate::ports::{load_json, save_json, storage_keys, KeyValueStore};

/// What kind of mutation produced a [`ContextChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Usage,
    Preferences,
    Onboarding,
    Reveal,
}

/// Delivered to subscribers after every effective mutation.
#[derive(Debug, Clone)]
pub struct ContextChange {
    pub kind: ChangeKind,
    pub context: UserContext,
    /// True when the classifier moved the user to a different tier.
    pub level_changed: bool,
}

/// Handle returned by [`UserContextStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&ContextChange) + Send + Sync>;

/// Explicit store object replacing an ambient global context.
///
/// The only constructor is [`UserContextStore::load`], so a store is always
/// hydrated before anyone can read from it.
pub struct UserContextStore {
    storage: Arc<dyn KeyValueStore>,
    context: RwLock<UserContext>,
    listeners: Mutex<BTreeMap<SubscriptionId, Listener>>,
    next_subscription: AtomicU64,
}

impl UserContextStore {
    /// Hydrates the context from storage.
    ///
    /// Missing records start from defaults. Unreadable or unparseable records
    /// are logged and replaced by defaults. The experience level is always
    /// recomputed from the loaded usage.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let mut context =
            match load_json::<UserContext>(storage.as_ref(), storage_keys::USER_CONTEXT) {
                Ok(Some(context)) => context,
                Ok(None) => UserContext::default(),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable user context, using defaults");
                    UserContext::default()
                }
            };
        context.reclassify();

        tracing::debug!(
            level = %context.experience_level(),
            sessions = context.usage.session_count,
            "User context hydrated"
        );

        Self {
            storage,
            context: RwLock::new(context),
            listeners: Mutex::new(BTreeMap::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Current snapshot.
    pub fn get(&self) -> UserContext {
        self.read().clone()
    }

    /// Runs `f` against the current context without cloning it.
    pub fn with_context<R>(&self, f: impl FnOnce(&UserContext) -> R) -> R {
        f(&self.read())
    }

    /// Applies a partial update of the user-editable fields.
    ///
    /// Intent and onboarding completion are written only by
    /// [`select_intent`](Self::select_intent),
    /// [`complete_onboarding`](Self::complete_onboarding) and
    /// [`reset_onboarding`](Self::reset_onboarding).
    pub fn patch(&self, patch: ContextPatch) -> UserContext {
        if patch.is_empty() {
            return self.get();
        }
        self.mutate(ChangeKind::Preferences, |context| {
            let before = context.clone();
            patch.apply_to(context);
            *context != before
        });
        self.get()
    }

    /// Records one usage event for `key` and reclassifies.
    ///
    /// Returns true if this was the first use of the key.
    pub fn mark_feature_used(&self, key: FeatureKey) -> bool {
        let mut first_use = false;
        self.mutate(ChangeKind::Usage, |context| {
            first_use = context.usage.record_feature(key);
            context.usage.last_active_date = Some(Timestamp::now());
            true
        });
        first_use
    }

    /// Counts a new session. Called once per process start.
    pub fn start_session(&self) -> u32 {
        let mut sessions = 0;
        self.mutate(ChangeKind::Usage, |context| {
            context.usage.session_count = context.usage.session_count.saturating_add(1);
            context.usage.last_active_date = Some(Timestamp::now());
            sessions = context.usage.session_count;
            true
        });
        sessions
    }

    /// Adds processing time in milliseconds.
    pub fn record_processing_time(&self, millis: u64) {
        if millis == 0 {
            return;
        }
        self.mutate(ChangeKind::Usage, |context| {
            context.usage.total_processing_time =
                context.usage.total_processing_time.saturating_add(millis);
            true
        });
    }

    /// Unions `keys` into the revealed set and returns the keys that were new.
    ///
    /// Revealing only known keys is a no-op: nothing is persisted and no
    /// subscriber is notified.
    pub fn reveal_features<I>(&self, keys: I) -> Vec<FeatureKey>
    where
        I: IntoIterator<Item = FeatureKey>,
    {
        let mut added = Vec::new();
        self.mutate(ChangeKind::Reveal, |context| {
            added = context.reveal(keys);
            !added.is_empty()
        });
        added
    }

    /// Selects the onboarding intent and reveals its starter features.
    ///
    /// # Errors
    ///
    /// `IntentAlreadySelected` if an intent was picked earlier in this
    /// onboarding cycle.
    pub fn select_intent(&self, intent: &IntentDefinition) -> Result<Vec<FeatureKey>, DomainError> {
        let mut existing = None;
        let mut revealed = Vec::new();
        self.mutate(ChangeKind::Onboarding, |context| {
            if let Some(current) = &context.intent {
                existing = Some(current.id.clone());
                return false;
            }
            context.intent = Some(Intent::new(intent.id.clone()));
            revealed = context.reveal(intent.starter_features.iter().cloned());
            true
        });

        match existing {
            Some(current) => Err(DomainError::new(
                ErrorCode::IntentAlreadySelected,
                "An intent was already selected in this onboarding cycle",
            )
            .with_detail("current", current.as_str())
            .with_detail("requested", intent.id.as_str())),
            None => Ok(revealed),
        }
    }

    /// Sets `completedOnboarding`. Returns false if it already was set.
    pub fn complete_onboarding(&self) -> bool {
        self.mutate(ChangeKind::Onboarding, |context| {
            if context.completed_onboarding {
                return false;
            }
            context.completed_onboarding = true;
            true
        })
        .is_some()
    }

    /// Clears intent, onboarding completion and revealed features in one write.
    pub fn reset_onboarding(&self) {
        self.mutate(ChangeKind::Onboarding, |context| {
            context.reset_onboarding();
            true
        });
    }

    /// Nested merge into the preference record.
    pub fn update_preferences(&self, patch: PreferencesPatch) {
        if patch.is_empty() {
            return;
        }
        self.mutate(ChangeKind::Preferences, |context| {
            let before = context.preferences.clone();
            patch.apply_to(&mut context.preferences);
            context.preferences != before
        });
    }

    /// Registers a listener invoked after every effective mutation.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ContextChange) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(listener));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    // === Internals ===

    fn read(&self) -> RwLockReadGuard<'_, UserContext> {
        self.context.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserContext> {
        self.context.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `apply`; when it reports a change, reclassifies (usage only),
    /// persists and notifies.
    fn mutate<F>(&self, kind: ChangeKind, apply: F) -> Option<ContextChange>
    where
        F: FnOnce(&mut UserContext) -> bool,
    {
        let change = {
            let mut context = self.write();
            if !apply(&mut context) {
                return None;
            }
            let level_changed = kind == ChangeKind::Usage && context.reclassify();
            if level_changed {
                tracing::info!(level = %context.experience_level(), "Experience level changed");
            }
            self.persist(&context);
            ContextChange {
                kind,
                context: context.clone(),
                level_changed,
            }
        };

        self.notify(&change);
        Some(change)
    }

    fn persist(&self, context: &UserContext) {
        if let Err(e) = save_json(self.storage.as_ref(), storage_keys::USER_CONTEXT, context) {
            tracing::warn!(error = %e, "Failed to persist user context");
        }
    }

    fn notify(&self, change: &ContextChange) {
        // listeners may call back into the store
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(change);
        }
    }
}

impl std::fmt::Debug for UserContextStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserContextStore")
            .field("context", &*self.read())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::kv::InMemoryKeyValueStore;
    use crate::domain::context::intent::{ENTERPRISE_EVALUATION, QUICK_ANALYSIS};
    use crate::domain::context::{ExperienceLevel, IntentCatalog};
    use crate::ports::StorageError;
    use std::sync::atomic::AtomicUsize;

    fn fresh_store() -> (Arc<InMemoryKeyValueStore>, UserContextStore) {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = UserContextStore::load(kv.clone());
        (kv, store)
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::IoError("unavailable".to_string()))
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::IoError("read-only".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Hydration
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn load_without_record_uses_defaults() {
        let (_, store) = fresh_store();
        assert_eq!(store.get(), UserContext::default());
    }

    #[test]
    fn load_with_corrupt_record_falls_back_to_defaults() {
        let kv = Arc::new(InMemoryKeyValueStore::new().with_record("user-context", "{oops"));
        let store = UserContextStore::load(kv);
        assert_eq!(store.get(), UserContext::default());
    }

    #[test]
    fn load_recomputes_experience_level() {
        let record = r#"{
            "experienceLevel": "expert",
            "usage": {"sessionCount": 3, "featuresUsed": ["a", "b"]}
        }"#;
        let kv = Arc::new(InMemoryKeyValueStore::new().with_record("user-context", record));
        let store = UserContextStore::load(kv);
        assert_eq!(store.get().experience_level(), ExperienceLevel::Intermediate);
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let store = UserContextStore::load(Arc::new(FailingStore));
        assert!(store.mark_feature_used(FeatureKey::from("single_upload")));
        assert!(store.get().usage.has_used("single_upload"));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Mutations
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn every_mutation_persists_full_context() {
        let (kv, store) = fresh_store();
        store.mark_feature_used(FeatureKey::from("single_upload"));

        let reloaded = UserContextStore::load(kv);
        assert_eq!(reloaded.get(), store.get());
    }

    #[test]
    fn mark_feature_used_has_set_semantics() {
        let (_, store) = fresh_store();
        assert!(store.mark_feature_used(FeatureKey::from("single_upload")));
        assert!(!store.mark_feature_used(FeatureKey::from("single_upload")));

        let context = store.get();
        assert_eq!(context.usage.distinct_features(), 1);
        assert_eq!(context.usage.occurrences("single_upload"), 2);
        assert!(context.usage.last_active_date.is_some());
    }

    #[test]
    fn usage_updates_reclassify() {
        let (_, store) = fresh_store();
        for _ in 0..3 {
            store.start_session();
        }
        store.mark_feature_used(FeatureKey::from("single_upload"));
        assert_eq!(store.get().experience_level(), ExperienceLevel::Beginner);

        store.mark_feature_used(FeatureKey::from("csv_export"));
        assert_eq!(store.get().experience_level(), ExperienceLevel::Intermediate);
    }

    #[test]
    fn reveal_features_is_idempotent() {
        let (_, store) = fresh_store();
        let first = store.reveal_features(vec![FeatureKey::from("gps_map")]);
        let second = store.reveal_features(vec![FeatureKey::from("gps_map")]);

        assert_eq!(first, vec![FeatureKey::from("gps_map")]);
        assert!(second.is_empty());
        assert_eq!(store.get().revealed_features.len(), 1);
    }

    #[test]
    fn select_intent_only_once_per_cycle() {
        let (_, store) = fresh_store();
        let intents = IntentCatalog::builtin();
        let enterprise = intents.find(ENTERPRISE_EVALUATION).unwrap();
        let quick = intents.find(QUICK_ANALYSIS).unwrap();

        let revealed = store.select_intent(enterprise).unwrap();
        assert!(revealed.contains(&FeatureKey::from("api_access")));

        let err = store.select_intent(quick).unwrap_err();
        assert_eq!(err.code, ErrorCode::IntentAlreadySelected);
        assert_eq!(store.get().intent_id().unwrap().as_str(), ENTERPRISE_EVALUATION);

        store.reset_onboarding();
        assert!(store.select_intent(quick).is_ok());
    }

    #[test]
    fn reset_onboarding_clears_exactly_three_fields() {
        let (_, store) = fresh_store();
        store.start_session();
        store.mark_feature_used(FeatureKey::from("single_upload"));
        store.update_preferences(PreferencesPatch {
            compact_mode: Some(true),
            ..PreferencesPatch::default()
        });
        store
            .select_intent(IntentCatalog::builtin().find(QUICK_ANALYSIS).unwrap())
            .unwrap();
        store.complete_onboarding();
        let before = store.get();

        store.reset_onboarding();
        let after = store.get();

        assert!(after.intent.is_none());
        assert!(!after.completed_onboarding);
        assert!(after.revealed_features.is_empty());
        assert_eq!(after.usage, before.usage);
        assert_eq!(after.preferences, before.preferences);
    }

    #[test]
    fn complete_onboarding_reports_first_transition() {
        let (_, store) = fresh_store();
        assert!(store.complete_onboarding());
        assert!(!store.complete_onboarding());
    }

    #[test]
    fn patch_cannot_touch_experience_level_but_merges_preferences() {
        let (_, store) = fresh_store();
        let context = store.patch(ContextPatch {
            preferences: Some(PreferencesPatch {
                show_advanced_features: Some(true),
                ..PreferencesPatch::default()
            }),
        });
        assert!(context.preferences.show_advanced_features);
        assert_eq!(context.experience_level(), ExperienceLevel::Beginner);
    }

    #[test]
    fn patch_keeps_selected_intent_and_its_reveals() {
        let (_, store) = fresh_store();
        store
            .select_intent(IntentCatalog::builtin().find(QUICK_ANALYSIS).unwrap())
            .unwrap();
        store.complete_onboarding();
        let before = store.get();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |change| sink.lock().unwrap().push(change.kind));

        let after = store.patch(ContextPatch {
            preferences: Some(PreferencesPatch {
                compact_mode: Some(true),
                ..PreferencesPatch::default()
            }),
        });

        assert_eq!(after.intent_id().unwrap().as_str(), QUICK_ANALYSIS);
        assert!(after.completed_onboarding);
        assert_eq!(after.revealed_features, before.revealed_features);
        assert_eq!(*seen.lock().unwrap(), vec![ChangeKind::Preferences]);

        let err = store
            .select_intent(IntentCatalog::builtin().find(ENTERPRISE_EVALUATION).unwrap())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::IntentAlreadySelected);
    }

    #[test]
    fn empty_patch_does_not_notify() {
        let (_, store) = fresh_store();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.patch(ContextPatch::default());
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Subscriptions
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn subscribers_see_changes_until_unsubscribed() {
        let (_, store) = fresh_store();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let id = store.subscribe(move |change| {
            assert_eq!(change.kind, ChangeKind::Usage);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.start_session();
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        assert!(store.unsubscribe(id));
        store.start_session();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn no_op_reveal_does_not_notify() {
        let (_, store) = fresh_store();
        store.reveal_features(vec![FeatureKey::from("gps_map")]);

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        store.reveal_features(vec![FeatureKey::from("gps_map")]);
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn listener_can_read_store_during_notification() {
        let (_, store) = fresh_store();
        let store = Arc::new(store);
        let observed = Arc::new(Mutex::new(None));

        let inner = Arc::downgrade(&store);
        let sink = observed.clone();
        store.subscribe(move |change| {
            if let Some(store) = inner.upgrade() {
                *sink.lock().unwrap() = Some(store.get().usage.session_count);
            }
            assert!(!change.level_changed);
        });

        store.start_session();
        assert_eq!(*observed.lock().unwrap(), Some(1));
    }

    #[test]
    fn level_change_is_reported() {
        let (_, store) = fresh_store();
        for _ in 0..3 {
            store.start_session();
        }
        store.mark_feature_used(FeatureKey::from("a"));

        let changed = Arc::new(Mutex::new(Vec::new()));
        let sink = changed.clone();
        store.subscribe(move |change| sink.lock().unwrap().push(change.level_changed));

        store.mark_feature_used(FeatureKey::from("b"));
        store.mark_feature_used(FeatureKey::from("c"));
        assert_eq!(*changed.lock().unwrap(), vec![true, false]);
    }
}
