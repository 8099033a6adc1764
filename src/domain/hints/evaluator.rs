//! Trigger evaluation: which hints became eligible for this context.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::{HintCatalog, HintDefinition};
use crate::domain::foundation::HintId;
use crate::domain::rules::{EvaluationInput, PredicateRegistry};
use crate::domain::visibility::FeatureVisibilityResolver;

/// Pure scan of the hint catalog against a context.
///
/// Candidates are visited by priority (high first) and then in catalog order.
/// The cap counts active hints plus hints admitted earlier in the same pass.
#[derive(Debug, Clone)]
pub struct TriggerEvaluator {
    registry: Arc<PredicateRegistry>,
    resolver: FeatureVisibilityResolver,
    concurrency_cap: usize,
}

impl TriggerEvaluator {
    pub fn new(
        registry: Arc<PredicateRegistry>,
        resolver: FeatureVisibilityResolver,
        concurrency_cap: usize,
    ) -> Self {
        Self {
            registry,
            resolver,
            concurrency_cap,
        }
    }

    pub fn concurrency_cap(&self) -> usize {
        self.concurrency_cap
    }

    /// Returns hints that should be added to the active queue, in admission order.
    pub fn evaluate(
        &self,
        catalog: &HintCatalog,
        input: &EvaluationInput<'_>,
        already_active: &[HintId],
        dismissed: &BTreeSet<HintId>,
    ) -> Vec<HintDefinition> {
        let mut candidates: Vec<&HintDefinition> = catalog.iter().collect();
        // stable: equal priorities keep catalog order
        candidates.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut active_count = already_active.len();
        let mut eligible = Vec::new();

        for hint in candidates {
            if dismissed.contains(&hint.id) || already_active.contains(&hint.id) {
                continue;
            }
            if !self
                .resolver
                .all_visible(&hint.required_features, input.context)
            {
                continue;
            }
            if active_count >= self.concurrency_cap && !hint.is_high_priority() {
                tracing::debug!(hint = %hint.id, active_count, "Hint held back by concurrency cap");
                continue;
            }
            if !self.registry.evaluate(&hint.trigger, input) {
                continue;
            }

            active_count += 1;
            eligible.push(hint.clone());
        }

        eligible
    }

    /// Whether an active hint's backing condition still holds.
    ///
    /// Requested hints only need their required features to stay visible.
    pub fn still_holds(
        &self,
        hint: &HintDefinition,
        input: &EvaluationInput<'_>,
        requested: bool,
    ) -> bool {
        if !self
            .resolver
            .all_visible(&hint.required_features, input.context)
        {
            return false;
        }
        requested || self.registry.evaluate(&hint.trigger, input)
    }
}
