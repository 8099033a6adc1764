use std::collections::BTreeSet;
use std::sync::Arc;

use metascope::adapters::InMemoryKeyValueStore;
use metascope::application::UserContextStore;
use metascope::domain::achievements::{check, AchievementCatalog};
use metascope::domain::context::{classify, ExperienceLevel, Usage, UserContext};
use metascope::domain::features;
use metascope::domain::foundation::{FeatureKey, HintId};
use metascope::domain::hints::{
    HintCatalog, HintDefinition, HintPlacement, HintPriority, TriggerEvaluator,
};
use metascope::domain::rules::{Condition, EvaluationInput, PredicateRegistry};
use metascope::domain::visibility::FeatureVisibilityResolver;
use proptest::prelude::*;

const GATED: &[&str] = &[
    features::SINGLE_UPLOAD,
    features::BATCH_UPLOAD,
    features::EXIF_VIEWER,
    features::GPS_MAP,
    features::CSV_EXPORT,
    features::PDF_REPORT,
    features::COMPARISON_VIEW,
    features::ADVANCED_FILTERS,
    features::HASH_VERIFICATION,
    features::BULK_PROCESSING,
    features::API_ACCESS,
    features::AUDIT_LOG,
];

fn usage(sessions: u32, distinct: usize) -> Usage {
    let mut usage = Usage {
        session_count: sessions,
        ..Usage::default()
    };
    for i in 0..distinct {
        usage.record_feature(FeatureKey::from(format!("feature_{i}").as_str()));
    }
    usage
}

fn feature_subset() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::sample::subsequence(GATED.to_vec(), 0..GATED.len())
}

fn priority() -> impl Strategy<Value = HintPriority> {
    prop_oneof![
        Just(HintPriority::Low),
        Just(HintPriority::Medium),
        Just(HintPriority::High),
    ]
}

fn always_hint(i: usize, priority: HintPriority) -> HintDefinition {
    HintDefinition {
        id: HintId::from(format!("hint_{i}").as_str()),
        title: format!("Hint {i}"),
        content: String::new(),
        trigger: "always".to_string(),
        placement: HintPlacement::Bottom,
        priority,
        required_features: vec![],
        dismissible: true,
        upgrade_gate: None,
    }
}

proptest! {
    #[test]
    fn classifier_matches_threshold_table(sessions in 0u32..30, distinct in 0usize..12) {
        let level = classify(&usage(sessions, distinct));
        let expected = if sessions >= 10 && distinct >= 5 {
            ExperienceLevel::Expert
        } else if sessions >= 3 && distinct >= 2 {
            ExperienceLevel::Intermediate
        } else {
            ExperienceLevel::Beginner
        };
        prop_assert_eq!(level, expected);
    }

    #[test]
    fn classifier_is_monotone_in_sessions(sessions in 0u32..30, distinct in 0usize..12) {
        let before = classify(&usage(sessions, distinct));
        let after = classify(&usage(sessions + 1, distinct));
        prop_assert!(after >= before);
    }

    #[test]
    fn revealing_twice_changes_nothing(keys in feature_subset()) {
        let store = UserContextStore::load(Arc::new(InMemoryKeyValueStore::new()));
        let first = store.reveal_features(keys.iter().map(|k| FeatureKey::from(*k)));
        let snapshot = store.get();
        let second = store.reveal_features(keys.iter().map(|k| FeatureKey::from(*k)));

        prop_assert_eq!(first.len(), keys.len());
        prop_assert!(second.is_empty());
        prop_assert_eq!(store.get(), snapshot);
    }

    #[test]
    fn reset_clears_only_onboarding_fields(
        sessions in 0u32..15,
        keys in feature_subset(),
        advanced in any::<bool>(),
    ) {
        let store = UserContextStore::load(Arc::new(InMemoryKeyValueStore::new()));
        for _ in 0..sessions {
            store.start_session();
        }
        store.mark_feature_used(FeatureKey::from(features::EXIF_VIEWER));
        store.reveal_features(keys.iter().map(|k| FeatureKey::from(*k)));
        store.update_preferences(metascope::domain::context::PreferencesPatch {
            show_advanced_features: Some(advanced),
            ..Default::default()
        });
        store.complete_onboarding();
        let before = store.get();

        store.reset_onboarding();
        let after = store.get();

        prop_assert!(after.intent.is_none());
        prop_assert!(!after.completed_onboarding);
        prop_assert!(after.revealed_features.is_empty());
        prop_assert_eq!(&after.usage, &before.usage);
        prop_assert_eq!(&after.preferences, &before.preferences);
        prop_assert_eq!(after.experience_level(), before.experience_level());
    }

    #[test]
    fn reveals_never_hide_a_feature(
        sessions in 0u32..15,
        distinct in 0usize..8,
        keys in feature_subset(),
    ) {
        let resolver = FeatureVisibilityResolver::default();
        let base = UserContext::default().with_usage(usage(sessions, distinct));
        let revealed = base.clone().with_revealed(keys.iter().copied());

        for feature in GATED {
            if resolver.should_show(feature, &base) {
                prop_assert!(resolver.should_show(feature, &revealed));
            }
        }
        for key in &keys {
            prop_assert!(resolver.should_show(key, &revealed));
        }
    }

    #[test]
    fn evaluator_respects_cap_but_admits_every_high_priority(
        priorities in proptest::collection::vec(priority(), 0..10),
        cap in 0usize..5,
    ) {
        let catalog = HintCatalog::new(
            priorities
                .iter()
                .enumerate()
                .map(|(i, p)| always_hint(i, *p))
                .collect(),
        );
        let registry = PredicateRegistry::default().with("always", Condition::Always);
        let evaluator = TriggerEvaluator::new(
            Arc::new(registry),
            FeatureVisibilityResolver::default(),
            cap,
        );
        let ctx = UserContext::default();

        let admitted = evaluator.evaluate(
            &catalog,
            &EvaluationInput::new(&ctx),
            &[],
            &BTreeSet::new(),
        );

        let high = priorities.iter().filter(|p| **p == HintPriority::High).count();
        let other = priorities.len() - high;
        let admitted_high = admitted.iter().filter(|h| h.is_high_priority()).count();
        let admitted_other = admitted.len() - admitted_high;

        prop_assert_eq!(admitted_high, high);
        prop_assert_eq!(admitted_other, other.min(cap.saturating_sub(high)));
        prop_assert!(admitted
            .windows(2)
            .all(|pair| pair[0].priority >= pair[1].priority));
    }

    #[test]
    fn achievements_complete_at_most_once(
        sessions in 0u32..15,
        keys in feature_subset(),
    ) {
        let mut usage = usage(sessions, 0);
        for key in &keys {
            usage.record_feature(FeatureKey::from(*key));
        }
        let ctx = UserContext::default().with_usage(usage);
        let input = EvaluationInput::new(&ctx);
        let registry = PredicateRegistry::builtin();

        let first = check(AchievementCatalog::builtin(), registry, &input);
        let second = check(&first.catalog, registry, &input);

        prop_assert!(!second.has_changes());
        prop_assert_eq!(&second.catalog, &first.catalog);
        prop_assert_eq!(
            first.catalog.completed_count(),
            first.newly_completed.len()
        );
    }
}
