//! In-memory analytics sink for testing.
//!
//! Captures every tracked event so tests can assert on what the engine
//! reported.
//!
//! # Security Note
//!
//! This adapter is for **testing only**. It uses `.expect()` on lock
//! operations which will panic if locks are poisoned.

use std::sync::RwLock;

use crate::domain::foundation::AnalyticsEvent;
use crate::ports::AnalyticsSink;

/// Analytics sink that records events in order.
///
/// # Panics
///
/// Methods may panic if the internal lock is poisoned.
#[derive(Debug, Default)]
pub struct RecordingAnalyticsSink {
    events: RwLock<Vec<AnalyticsEvent>>,
}

impl RecordingAnalyticsSink {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Returns all recorded events.
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events
            .read()
            .expect("RecordingAnalyticsSink: events lock poisoned")
            .clone()
    }

    /// Returns events with the given name.
    pub fn events_named(&self, event: &str) -> Vec<AnalyticsEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event == event)
            .collect()
    }

    /// Returns true if an event with this name and label was recorded.
    pub fn has_event(&self, event: &str, label: &str) -> bool {
        self.events()
            .iter()
            .any(|e| e.event == event && e.label.as_deref() == Some(label))
    }

    pub fn count(&self) -> usize {
        self.events
            .read()
            .expect("RecordingAnalyticsSink: events lock poisoned")
            .len()
    }

    /// Clears recorded events.
    pub fn clear(&self) {
        self.events
            .write()
            .expect("RecordingAnalyticsSink: events lock poisoned")
            .clear();
    }
}

impl AnalyticsSink for RecordingAnalyticsSink {
    fn track(&self, event: AnalyticsEvent) {
        self.events
            .write()
            .expect("RecordingAnalyticsSink: events lock poisoned")
            .push(event);
    }
}
