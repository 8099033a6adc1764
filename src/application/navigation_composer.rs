//! NavigationComposer - navigation composition plus its analytics record.

use std::sync::Arc;

use crate::domain::context::UserContext;
use crate::domain::foundation::{categories, event_names, AnalyticsEvent};
use crate::domain::navigation::{self, ComposedNavigation, NavCatalog, UserTier};
use crate::domain::visibility::FeatureVisibilityResolver;
use crate::ports::AnalyticsSink;

pub struct NavigationComposer {
    catalog: Arc<NavCatalog>,
    resolver: FeatureVisibilityResolver,
    analytics: Arc<dyn AnalyticsSink>,
}

impl NavigationComposer {
    pub fn new(
        catalog: Arc<NavCatalog>,
        resolver: FeatureVisibilityResolver,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        Self {
            catalog,
            resolver,
            analytics,
        }
    }

    pub fn catalog(&self) -> &NavCatalog {
        &self.catalog
    }

    /// Composes the three lists for `tier` and emits one `navigation_composed` event.
    pub fn compose(&self, tier: UserTier, context: &UserContext) -> ComposedNavigation {
        let composed = navigation::compose(tier, context, &self.catalog, &self.resolver);

        self.analytics.track(
            AnalyticsEvent::new(event_names::NAVIGATION_COMPOSED, categories::NAVIGATION)
                .with_label(tier.as_str())
                .with_property("primary", composed.primary_ids())
                .with_property("secondary", composed.secondary_ids())
                .with_property("prominent", composed.prominent_ids()),
        );

        composed
    }
}
