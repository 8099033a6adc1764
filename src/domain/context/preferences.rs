//! User-editable presentation preferences.

use serde::{Deserialize, Serialize};

/// Preferred layout for image listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredView {
    #[default]
    Grid,
    List,
    Table,
}

/// Preferences record. Never derived, only edited by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub show_advanced_features: bool,
    pub preferred_view: PreferredView,
    pub auto_hide_completed: bool,
    pub enable_tooltips: bool,
    pub compact_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            show_advanced_features: false,
            preferred_view: PreferredView::Grid,
            auto_hide_completed: true,
            enable_tooltips: true,
            compact_mode: false,
        }
    }
}

/// Partial update of [`Preferences`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreferencesPatch {
    pub show_advanced_features: Option<bool>,
    pub preferred_view: Option<PreferredView>,
    pub auto_hide_completed: Option<bool>,
    pub enable_tooltips: Option<bool>,
    pub compact_mode: Option<bool>,
}

impl PreferencesPatch {
    /// Merges the set fields into `preferences`.
    pub fn apply_to(&self, preferences: &mut Preferences) {
        if let Some(value) = self.show_advanced_features {
            preferences.show_advanced_features = value;
        }
        if let Some(value) = self.preferred_view {
            preferences.preferred_view = value;
        }
        if let Some(value) = self.auto_hide_completed {
            preferences.auto_hide_completed = value;
        }
        if let Some(value) = self.enable_tooltips {
            preferences.enable_tooltips = value;
        }
        if let Some(value) = self.compact_mode {
            preferences.compact_mode = value;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == PreferencesPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_tooltips_and_auto_hide() {
        let prefs = Preferences::default();
        assert!(!prefs.show_advanced_features);
        assert!(prefs.auto_hide_completed);
        assert!(prefs.enable_tooltips);
        assert!(!prefs.compact_mode);
        assert_eq!(prefs.preferred_view, PreferredView::Grid);
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut prefs = Preferences::default();
        let patch = PreferencesPatch {
            compact_mode: Some(true),
            preferred_view: Some(PreferredView::Table),
            ..PreferencesPatch::default()
        };

        patch.apply_to(&mut prefs);

        assert!(prefs.compact_mode);
        assert_eq!(prefs.preferred_view, PreferredView::Table);
        assert!(prefs.enable_tooltips);
        assert!(!prefs.show_advanced_features);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(PreferencesPatch::default().is_empty());
        let patch = PreferencesPatch {
            enable_tooltips: Some(false),
            ..PreferencesPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"compactMode": true}"#).unwrap();
        assert!(prefs.compact_mode);
        assert!(prefs.enable_tooltips);
    }
}
