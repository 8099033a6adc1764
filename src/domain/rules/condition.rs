//! Predicate descriptors and the interpreter that evaluates them.
//!
//! Triggers, achievement completions and visibility rules are all plain data
//! (`Condition` trees) evaluated by [`Condition::evaluate`]. Nothing here
//! mutates state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::context::{ExperienceLevel, UserContext};
use crate::domain::foundation::{FeatureKey, IntentId};

/// Snapshot of external numeric counters keyed by counter name.
pub type Counters = BTreeMap<String, u64>;

static NO_COUNTERS: Counters = BTreeMap::new();

/// Everything a condition may look at.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    pub context: &'a UserContext,
    pub counters: &'a Counters,
}

impl<'a> EvaluationInput<'a> {
    /// Input with no external counters. Counter conditions evaluate false.
    pub fn new(context: &'a UserContext) -> Self {
        Self {
            context,
            counters: &NO_COUNTERS,
        }
    }

    pub fn with_counters(context: &'a UserContext, counters: &'a Counters) -> Self {
        Self { context, counters }
    }

    fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }
}

/// A boolean expression over usage, context and external counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Always,
    Never,
    FeatureUsed { feature: FeatureKey },
    FeatureCountAtLeast { feature: FeatureKey, count: u32 },
    DistinctFeaturesAtLeast { count: usize },
    SessionCountAtLeast { count: u32 },
    ProcessingTimeAtLeast { millis: u64 },
    CounterAtLeast { counter: String, value: u64 },
    ExperienceIs { level: ExperienceLevel },
    ExperienceAtLeast { level: ExperienceLevel },
    IntentIs { intent: IntentId },
    OnboardingCompleted,
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
}

impl Condition {
    pub fn feature_used(feature: &str) -> Self {
        Condition::FeatureUsed {
            feature: FeatureKey::from(feature),
        }
    }

    pub fn feature_count_at_least(feature: &str, count: u32) -> Self {
        Condition::FeatureCountAtLeast {
            feature: FeatureKey::from(feature),
            count,
        }
    }

    pub fn intent_is(intent: &str) -> Self {
        Condition::IntentIs {
            intent: IntentId::from(intent),
        }
    }

    pub fn experience_at_least(level: ExperienceLevel) -> Self {
        Condition::ExperienceAtLeast { level }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Any { conditions }
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::All { conditions }
    }

    pub fn not(condition: Condition) -> Self {
        Condition::Not {
            condition: Box::new(condition),
        }
    }

    /// Evaluates the expression. Empty `All` is true, empty `Any` is false.
    pub fn evaluate(&self, input: &EvaluationInput<'_>) -> bool {
        let context = input.context;
        let usage = &context.usage;

        match self {
            Condition::Always => true,
            Condition::Never => false,
            Condition::FeatureUsed { feature } => usage.has_used(feature.as_str()),
            Condition::FeatureCountAtLeast { feature, count } => {
                usage.occurrences(feature.as_str()) >= *count
            }
            Condition::DistinctFeaturesAtLeast { count } => usage.distinct_features() >= *count,
            Condition::SessionCountAtLeast { count } => usage.session_count >= *count,
            Condition::ProcessingTimeAtLeast { millis } => usage.total_processing_time >= *millis,
            Condition::CounterAtLeast { counter, value } => input.counter(counter) >= *value,
            Condition::ExperienceIs { level } => context.experience_level() == *level,
            Condition::ExperienceAtLeast { level } => context.experience_level() >= *level,
            Condition::IntentIs { intent } => context.intent_id() == Some(intent),
            Condition::OnboardingCompleted => context.completed_onboarding,
            Condition::All { conditions } => conditions.iter().all(|c| c.evaluate(input)),
            Condition::Any { conditions } => conditions.iter().any(|c| c.evaluate(input)),
            Condition::Not { condition } => !condition.evaluate(input),
        }
    }

    /// Collects the names of external counters this expression reads.
    pub fn collect_counters(&self, out: &mut BTreeSet<String>) {
        match self {
            Condition::CounterAtLeast { counter, .. } => {
                out.insert(counter.clone());
            }
            Condition::All { conditions } | Condition::Any { conditions } => {
                for condition in conditions {
                    condition.collect_counters(out);
                }
            }
            Condition::Not { condition } => condition.collect_counters(out),
            _ => {}
        }
    }
}
