//! Experience tiers and the classifier that derives them from usage.

use serde::{Deserialize, Serialize};

use super::Usage;

/// Discrete experience-level bucket derived from usage.
///
/// Ordered: `Beginner < Intermediate < Expert`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Expert,
}

impl ExperienceLevel {
    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "Beginner",
            ExperienceLevel::Intermediate => "Intermediate",
            ExperienceLevel::Expert => "Expert",
        }
    }
}

impl std::fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

const EXPERT_MIN_SESSIONS: u32 = 10;
const EXPERT_MIN_FEATURES: usize = 5;
const INTERMEDIATE_MIN_SESSIONS: u32 = 3;
const INTERMEDIATE_MIN_FEATURES: usize = 2;

/// Maps usage counters to an experience tier.
///
/// | Tier | Sessions | Distinct features |
/// |------|----------|-------------------|
/// | Expert | >= 10 | >= 5 |
/// | Intermediate | >= 3 | >= 2 |
/// | Beginner | otherwise | |
pub fn classify(usage: &Usage) -> ExperienceLevel {
    let sessions = usage.session_count;
    let features = usage.distinct_features();

    if sessions >= EXPERT_MIN_SESSIONS && features >= EXPERT_MIN_FEATURES {
        ExperienceLevel::Expert
    } else if sessions >= INTERMEDIATE_MIN_SESSIONS && features >= INTERMEDIATE_MIN_FEATURES {
        ExperienceLevel::Intermediate
    } else {
        ExperienceLevel::Beginner
    }
}
