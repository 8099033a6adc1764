//! Navigation item definitions.

use serde::{Deserialize, Serialize};

use super::UserTier;
use crate::domain::foundation::{FeatureKey, NavItemId};

/// Visual tone of a nav badge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    #[default]
    Info,
    New,
    Pro,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavBadge {
    pub text: String,
    #[serde(default)]
    pub tone: BadgeTone,
}

/// A navigation entry. The engine only produces ids and URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub id: NavItemId,
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub required_features: Vec<FeatureKey>,
    /// `None` admits every tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tiers: Option<Vec<UserTier>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<NavBadge>,
}

impl NavItem {
    pub fn allows(&self, tier: UserTier) -> bool {
        self.allowed_tiers
            .as_ref()
            .map_or(true, |tiers| tiers.contains(&tier))
    }
}
