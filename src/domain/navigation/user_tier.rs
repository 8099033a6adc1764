//! User tiers used for navigation layout, and how a context resolves to one.

use serde::{Deserialize, Serialize};

use crate::domain::context::{intent, ExperienceLevel, UserContext};

/// Navigation persona. Distinct from [`ExperienceLevel`]: it blends the
/// experience tier with the selected intent and the account email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserTier {
    QuickUser,
    PowerUser,
    BusinessUser,
}

impl UserTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserTier::QuickUser => "quick_user",
            UserTier::PowerUser => "power_user",
            UserTier::BusinessUser => "business_user",
        }
    }
}

impl std::fmt::Display for UserTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const PUBLIC_SUFFIXES: [&str; 5] = [".com", ".net", ".org", ".edu", ".io"];

/// Heuristic business-email check.
///
/// A domain counts as business when it does NOT end in one of
/// `.com`, `.net`, `.org`, `.edu`, `.io`. Addresses without a domain
/// part are not business.
pub fn is_business_email(email: &str) -> bool {
    let domain = match email.trim().rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            domain.to_ascii_lowercase()
        }
        _ => return false,
    };

    !PUBLIC_SUFFIXES
        .iter()
        .any(|suffix| domain.ends_with(suffix))
}

/// Resolves the navigation tier for a context.
///
/// - `BusinessUser`: enterprise intent, or a business email
/// - `PowerUser`: expert, or a professional/forensic intent
/// - `QuickUser`: everyone else
pub fn resolve_user_tier(context: &UserContext, email: Option<&str>) -> UserTier {
    let intent = context.intent_id().map(|id| id.as_str());

    if intent == Some(intent::ENTERPRISE_EVALUATION) || email.is_some_and(is_business_email) {
        return UserTier::BusinessUser;
    }

    let power_intent = matches!(
        intent,
        Some(intent::PROFESSIONAL_ANALYSIS) | Some(intent::FORENSIC_INVESTIGATION)
    );
    if context.experience_level() == ExperienceLevel::Expert || power_intent {
        return UserTier::PowerUser;
    }

    UserTier::QuickUser
}
