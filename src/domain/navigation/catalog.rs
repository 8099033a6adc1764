//! Navigation item catalog and per-tier layouts.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{BadgeTone, NavBadge, NavItem, UserTier};
use crate::domain::features;
use crate::domain::foundation::{FeatureKey, NavItemId};

/// Which items a tier lists where. `hidden` overrides the other three.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierNavConfig {
    #[serde(default)]
    pub primary: Vec<NavItemId>,
    #[serde(default)]
    pub secondary: Vec<NavItemId>,
    #[serde(default)]
    pub prominent: Vec<NavItemId>,
    #[serde(default)]
    pub hidden: Vec<NavItemId>,
}

impl TierNavConfig {
    pub fn hides(&self, id: &NavItemId) -> bool {
        self.hidden.contains(id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavCatalog {
    pub items: Vec<NavItem>,
    pub tiers: BTreeMap<UserTier, TierNavConfig>,
}

fn item(id: &str, label: &str, href: &str, required: &[&str]) -> NavItem {
    NavItem {
        id: NavItemId::from(id),
        label: label.to_string(),
        href: href.to_string(),
        required_features: required.iter().map(|k| FeatureKey::from(*k)).collect(),
        allowed_tiers: None,
        badge: None,
    }
}

fn ids(list: &[&str]) -> Vec<NavItemId> {
    list.iter().map(|id| NavItemId::from(*id)).collect()
}

static BUILTIN: Lazy<NavCatalog> = Lazy::new(|| {
    let business_only = Some(vec![UserTier::BusinessUser]);

    let items = vec![
        item("upload", "Upload", "/upload", &[features::SINGLE_UPLOAD]),
        item("library", "Library", "/library", &[]),
        item("metadata", "Metadata", "/metadata", &[features::EXIF_VIEWER]),
        item("map", "Map", "/map", &[features::GPS_MAP]),
        item("export", "Export", "/export", &[features::METADATA_EXPORT]),
        NavItem {
            badge: Some(NavBadge {
                text: "New".to_string(),
                tone: BadgeTone::New,
            }),
            ..item("batch", "Batch processing", "/batch", &[features::BATCH_UPLOAD])
        },
        item("compare", "Compare", "/compare", &[features::COMPARISON_VIEW]),
        item("reports", "Reports", "/reports", &[features::PDF_REPORT]),
        NavItem {
            allowed_tiers: Some(vec![UserTier::PowerUser, UserTier::BusinessUser]),
            ..item(
                "forensics",
                "Forensics",
                "/forensics",
                &[features::HASH_VERIFICATION],
            )
        },
        NavItem {
            allowed_tiers: business_only.clone(),
            badge: Some(NavBadge {
                text: "Pro".to_string(),
                tone: BadgeTone::Pro,
            }),
            ..item("api", "API", "/developers", &[features::API_ACCESS])
        },
        NavItem {
            allowed_tiers: business_only.clone(),
            ..item("team", "Team", "/team", &[features::TEAM_WORKSPACE])
        },
        NavItem {
            allowed_tiers: business_only,
            ..item("audit", "Audit log", "/audit", &[features::AUDIT_LOG])
        },
        item("settings", "Settings", "/settings", &[]),
        item("help", "Help", "/help", &[]),
    ];

    let mut tiers = BTreeMap::new();
    tiers.insert(
        UserTier::QuickUser,
        TierNavConfig {
            primary: ids(&["upload", "library", "metadata", "batch"]),
            secondary: ids(&["map", "export", "settings", "help"]),
            prominent: ids(&["upload"]),
            hidden: ids(&["batch", "compare", "forensics", "api", "team", "audit"]),
        },
    );
    tiers.insert(
        UserTier::PowerUser,
        TierNavConfig {
            primary: ids(&["upload", "library", "batch", "metadata", "compare"]),
            secondary: ids(&["map", "export", "reports", "forensics", "settings", "help"]),
            prominent: ids(&["batch"]),
            hidden: ids(&["team", "audit"]),
        },
    );
    tiers.insert(
        UserTier::BusinessUser,
        TierNavConfig {
            primary: ids(&["upload", "library", "batch", "reports", "team"]),
            secondary: ids(&[
                "metadata", "map", "export", "compare", "api", "audit", "settings", "help",
            ]),
            prominent: ids(&["api"]),
            hidden: vec![],
        },
    );

    NavCatalog { items, tiers }
});

impl NavCatalog {
    pub fn builtin() -> &'static NavCatalog {
        &BUILTIN
    }

    pub fn item(&self, id: &NavItemId) -> Option<&NavItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn tier(&self, tier: UserTier) -> Option<&TierNavConfig> {
        self.tiers.get(&tier)
    }
}
