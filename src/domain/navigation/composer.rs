//! Pure navigation composition for a tier and context.

use serde::{Deserialize, Serialize};

use super::{NavCatalog, NavItem, TierNavConfig, UserTier};
use crate::domain::context::UserContext;
use crate::domain::foundation::NavItemId;
use crate::domain::visibility::FeatureVisibilityResolver;

/// The three navigation lists handed to the routing collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedNavigation {
    pub primary: Vec<NavItem>,
    pub secondary: Vec<NavItem>,
    pub prominent: Vec<NavItem>,
}

impl ComposedNavigation {
    pub fn primary_ids(&self) -> Vec<&str> {
        Self::ids(&self.primary)
    }

    pub fn secondary_ids(&self) -> Vec<&str> {
        Self::ids(&self.secondary)
    }

    pub fn prominent_ids(&self) -> Vec<&str> {
        Self::ids(&self.prominent)
    }

    fn ids(items: &[NavItem]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }
}

/// Builds the navigation lists for `tier`.
///
/// Every list goes through the same filter: required features visible,
/// tier allowed by the item, id not in the tier's hidden list. Unknown ids
/// are dropped. A tier with no layout yields empty lists.
pub fn compose(
    tier: UserTier,
    context: &UserContext,
    catalog: &NavCatalog,
    resolver: &FeatureVisibilityResolver,
) -> ComposedNavigation {
    let Some(config) = catalog.tier(tier) else {
        tracing::warn!(tier = %tier, "No navigation layout configured for tier");
        return ComposedNavigation::default();
    };

    let resolve = |ids: &[NavItemId]| -> Vec<NavItem> {
        ids.iter()
            .filter_map(|id| {
                let item = catalog.item(id);
                if item.is_none() {
                    tracing::warn!(item = %id, tier = %tier, "Dropping unresolved navigation item");
                }
                item
            })
            .filter(|item| is_visible(item, tier, config, context, resolver))
            .cloned()
            .collect()
    };

    ComposedNavigation {
        primary: resolve(&config.primary),
        secondary: resolve(&config.secondary),
        prominent: resolve(&config.prominent),
    }
}

fn is_visible(
    item: &NavItem,
    tier: UserTier,
    config: &TierNavConfig,
    context: &UserContext,
    resolver: &FeatureVisibilityResolver,
) -> bool {
    resolver.all_visible(&item.required_features, context)
        && item.allows(tier)
        && !config.hides(&item.id)
}
