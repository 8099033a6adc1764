//! Behavioral usage counters.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::{FeatureKey, Timestamp};

/// Usage counters accumulated across sessions.
///
/// `features_used` has set semantics. `feature_counts` records every
/// occurrence so that "used X at least N times" conditions can be answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Usage {
    /// Incremented once per process start.
    pub session_count: u32,
    pub features_used: BTreeSet<FeatureKey>,
    pub feature_counts: BTreeMap<FeatureKey, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_date: Option<Timestamp>,
    /// Accumulated processing time in milliseconds.
    pub total_processing_time: u64,
}

impl Usage {
    /// Records one occurrence of a usage event.
    ///
    /// Returns true if the key was not in `features_used` before.
    pub fn record_feature(&mut self, key: FeatureKey) -> bool {
        *self.feature_counts.entry(key.clone()).or_insert(0) += 1;
        self.features_used.insert(key)
    }

    /// Number of distinct usage-event keys seen.
    pub fn distinct_features(&self) -> usize {
        self.features_used.len()
    }

    /// Whether the key has been recorded at least once.
    pub fn has_used(&self, key: &str) -> bool {
        self.features_used.contains(key)
    }

    /// Number of recorded occurrences of the key.
    ///
    /// Falls back to set membership for contexts persisted before
    /// occurrence counting existed.
    pub fn occurrences(&self, key: &str) -> u32 {
        match self.feature_counts.get(key) {
            Some(count) => *count,
            None if self.has_used(key) => 1,
            None => 0,
        }
    }
}
