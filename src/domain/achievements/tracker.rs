//! Pure achievement completion check.

use super::{AchievementCatalog, AchievementDefinition};
use crate::domain::foundation::Timestamp;
use crate::domain::rules::{EvaluationInput, PredicateRegistry};

/// Result of one scan of the achievement catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementCheck {
    pub catalog: AchievementCatalog,
    /// Achievements that completed during this scan, in catalog order.
    pub newly_completed: Vec<AchievementDefinition>,
}

impl AchievementCheck {
    pub fn has_changes(&self) -> bool {
        !self.newly_completed.is_empty()
    }
}

/// Evaluates every incomplete achievement and marks the satisfied ones.
///
/// Already-completed achievements are skipped, so rerunning on the returned
/// catalog yields no new completions.
pub fn check(
    catalog: &AchievementCatalog,
    registry: &PredicateRegistry,
    input: &EvaluationInput<'_>,
) -> AchievementCheck {
    let now = Timestamp::now();
    let mut updated = catalog.clone();
    let mut newly_completed = Vec::new();

    let pending: Vec<_> = catalog
        .iter()
        .filter(|a| !a.completed && registry.evaluate(&a.predicate, input))
        .map(|a| a.id.clone())
        .collect();

    for id in pending {
        if let Some(achievement) = updated.get_mut(&id) {
            if achievement.complete(now) {
                newly_completed.push(achievement.clone());
            }
        }
    }

    AchievementCheck {
        catalog: updated,
        newly_completed,
    }
}
