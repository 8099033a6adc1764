//! Personalization tunables

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::EngineSettings;

const MAX_AUTO_DISMISS_MS: u64 = 60_000;

/// Personalization configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PersonalizationConfig {
    /// Max simultaneously active low/medium-priority hints
    #[serde(default = "default_concurrency_cap")]
    pub hint_concurrency_cap: usize,

    /// Achievement notification lifetime in milliseconds
    #[serde(default = "default_auto_dismiss_ms")]
    pub notification_auto_dismiss_ms: u64,
}

impl PersonalizationConfig {
    pub fn auto_dismiss(&self) -> Duration {
        Duration::from_millis(self.notification_auto_dismiss_ms)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            hint_concurrency_cap: self.hint_concurrency_cap,
            notification_auto_dismiss: self.auto_dismiss(),
        }
    }

    /// Validate personalization configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hint_concurrency_cap == 0 {
            return Err(ValidationError::InvalidConcurrencyCap);
        }
        if self.notification_auto_dismiss_ms == 0
            || self.notification_auto_dismiss_ms > MAX_AUTO_DISMISS_MS
        {
            return Err(ValidationError::InvalidAutoDismiss);
        }
        Ok(())
    }
}

impl Default for PersonalizationConfig {
    fn default() -> Self {
        Self {
            hint_concurrency_cap: default_concurrency_cap(),
            notification_auto_dismiss_ms: default_auto_dismiss_ms(),
        }
    }
}

fn default_concurrency_cap() -> usize {
    2
}

fn default_auto_dismiss_ms() -> u64 {
    5000
}
