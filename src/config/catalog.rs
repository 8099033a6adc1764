//! Catalog overrides loaded from YAML
//!
//! Every section is optional. Hint, achievement, navigation and intent
//! sections replace the built-in catalog wholesale; predicate and visibility
//! sections are merged over the built-ins by key.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::error::CatalogError;
use crate::application::EngineCatalogs;
use crate::domain::achievements::AchievementCatalog;
use crate::domain::context::IntentCatalog;
use crate::domain::hints::HintCatalog;
use crate::domain::navigation::NavCatalog;
use crate::domain::rules::PredicateRegistry;
use crate::domain::visibility::VisibilityRuleTable;

/// Catalog configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Optional YAML file with [`CatalogOverrides`]
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl CatalogConfig {
    /// Built-in catalogs with the configured overrides applied
    pub fn load_catalogs(&self) -> Result<EngineCatalogs, CatalogError> {
        match &self.path {
            Some(path) => CatalogOverrides::from_path(path)?.apply(EngineCatalogs::default()),
            None => Ok(EngineCatalogs::default()),
        }
    }
}

/// Parsed override file
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogOverrides {
    pub predicates: Option<PredicateRegistry>,
    pub visibility: Option<VisibilityRuleTable>,
    pub hints: Option<HintCatalog>,
    pub achievements: Option<AchievementCatalog>,
    pub navigation: Option<NavCatalog>,
    pub intents: Option<IntentCatalog>,
}

impl CatalogOverrides {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Applies the overrides and checks cross references.
    ///
    /// # Errors
    ///
    /// `UnknownPredicate` when a hint trigger or achievement predicate is not
    /// in the merged registry, `DuplicateId` for repeated hint or achievement ids.
    pub fn apply(self, base: EngineCatalogs) -> Result<EngineCatalogs, CatalogError> {
        let predicates = match &self.predicates {
            Some(extra) => base.predicates.merged(extra),
            None => base.predicates,
        };
        let visibility = match &self.visibility {
            Some(extra) => base.visibility.merged(extra),
            None => base.visibility,
        };

        let catalogs = EngineCatalogs {
            predicates,
            visibility,
            hints: self.hints.unwrap_or(base.hints),
            achievements: self.achievements.unwrap_or(base.achievements),
            navigation: self.navigation.unwrap_or(base.navigation),
            intents: self.intents.unwrap_or(base.intents),
        };
        check_references(&catalogs)?;

        tracing::info!(
            hints = catalogs.hints.len(),
            achievements = catalogs.achievements.len(),
            "Catalog overrides applied"
        );
        Ok(catalogs)
    }
}

fn check_references(catalogs: &EngineCatalogs) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for hint in catalogs.hints.iter() {
        if !seen.insert(hint.id.as_str()) {
            return Err(CatalogError::DuplicateId {
                kind: "hint",
                id: hint.id.to_string(),
            });
        }
        if !catalogs.predicates.contains(&hint.trigger) {
            return Err(CatalogError::UnknownPredicate {
                kind: "hint",
                id: hint.id.to_string(),
                predicate: hint.trigger.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    for achievement in catalogs.achievements.iter() {
        if !seen.insert(achievement.id.as_str()) {
            return Err(CatalogError::DuplicateId {
                kind: "achievement",
                id: achievement.id.to_string(),
            });
        }
        if !catalogs.predicates.contains(&achievement.predicate) {
            return Err(CatalogError::UnknownPredicate {
                kind: "achievement",
                id: achievement.id.to_string(),
                predicate: achievement.predicate.clone(),
            });
        }
    }

    Ok(())
}
