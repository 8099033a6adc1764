//! Analytics sink that forwards events to the tracing subscriber.
//!
//! Useful when no analytics backend is wired up: every event becomes a
//! structured log line under the `metascope::analytics` target.

use crate::domain::foundation::AnalyticsEvent;
use crate::ports::AnalyticsSink;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalyticsSink;

impl TracingAnalyticsSink {
    pub fn new() -> Self {
        Self
    }
}

impl AnalyticsSink for TracingAnalyticsSink {
    fn track(&self, event: AnalyticsEvent) {
        let properties = serde_json::Value::Object(event.properties.clone());
        tracing::info!(
            target: "metascope::analytics",
            event_id = %event.event_id,
            event = %event.event,
            category = %event.category,
            label = event.label.as_deref().unwrap_or(""),
            properties = %properties,
            "analytics event"
        );
    }
}
