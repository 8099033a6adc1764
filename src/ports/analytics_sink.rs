//! AnalyticsSink port - Interface for fire-and-forget analytics.
//!
//! The engine hands records to the sink and never looks at a result.
//! Implementations must not block and must not fail loudly.

use crate::domain::foundation::AnalyticsEvent;

/// Port for recording analytics events.
pub trait AnalyticsSink: Send + Sync {
    /// Records one event.
    fn track(&self, event: AnalyticsEvent);
}
