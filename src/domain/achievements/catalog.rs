//! The achievement catalog and its merge with persisted progress.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::AchievementDefinition;
use crate::domain::features;
use crate::domain::foundation::{AchievementId, FeatureKey};
use crate::domain::rules::predicates;

pub const FIRST_UPLOAD: &str = "first_upload";
pub const FIRST_EXPORT: &str = "first_export";
pub const BATCH_PIONEER: &str = "batch_pioneer";
pub const TEN_IMAGES: &str = "ten_images";
pub const EXPLORER: &str = "explorer";
pub const REGULAR: &str = "regular";

/// Ordered list of achievements including their completion flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementCatalog {
    achievements: Vec<AchievementDefinition>,
}

fn achievement(
    id: &str,
    title: &str,
    description: &str,
    predicate: &str,
    unlocks: &[&str],
    message: &str,
) -> AchievementDefinition {
    AchievementDefinition {
        id: AchievementId::from(id),
        title: title.to_string(),
        description: description.to_string(),
        predicate: predicate.to_string(),
        unlocks: unlocks.iter().map(|k| FeatureKey::from(*k)).collect(),
        message: message.to_string(),
        completed: false,
        completed_at: None,
    }
}

static BUILTIN: Lazy<AchievementCatalog> = Lazy::new(|| {
    AchievementCatalog::new(vec![
        achievement(
            FIRST_UPLOAD,
            "First upload",
            "Upload your first image.",
            predicates::FIRST_UPLOAD,
            &[
                features::METADATA_EXPLORATION_GUIDE,
                features::EXPORT_OPTIONS_TUTORIAL,
            ],
            "Your first image is in. Let's see what it's hiding.",
        ),
        achievement(
            FIRST_EXPORT,
            "Data to go",
            "Export metadata for the first time.",
            predicates::FIRST_EXPORT,
            &[features::CSV_EXPORT, features::PDF_REPORT],
            "First export done. CSV and PDF reports are now available.",
        ),
        achievement(
            BATCH_PIONEER,
            "Batch pioneer",
            "Process a batch upload.",
            predicates::FIRST_BATCH,
            &[features::BULK_PROCESSING, features::COMPARISON_VIEW],
            "Batch mode unlocked bulk processing and side-by-side comparison.",
        ),
        achievement(
            TEN_IMAGES,
            "Ten images analyzed",
            "Process ten images.",
            predicates::TEN_IMAGES_PROCESSED,
            &[features::COMPARISON_VIEW, features::ADVANCED_FILTERS],
            "Ten images down. Advanced filters are ready for you.",
        ),
        achievement(
            EXPLORER,
            "Explorer",
            "Try five different features.",
            predicates::WIDE_EXPLORATION,
            &[features::KEYBOARD_SHORTCUTS, features::CUSTOM_REPORTS],
            "You've explored a lot. Custom reports and shortcuts are on.",
        ),
        achievement(
            REGULAR,
            "Regular",
            "Come back for ten sessions.",
            predicates::TEN_SESSIONS,
            &[features::ADVANCED_FILTERS],
            "Ten sessions! Thanks for sticking around.",
        ),
    ])
});

impl AchievementCatalog {
    pub fn new(achievements: Vec<AchievementDefinition>) -> Self {
        Self { achievements }
    }

    pub fn builtin() -> &'static AchievementCatalog {
        &BUILTIN
    }

    pub fn get(&self, id: &str) -> Option<&AchievementDefinition> {
        self.achievements.iter().find(|a| a.id.as_str() == id)
    }

    pub(crate) fn get_mut(&mut self, id: &AchievementId) -> Option<&mut AchievementDefinition> {
        self.achievements.iter_mut().find(|a| &a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AchievementDefinition> {
        self.achievements.iter()
    }

    pub fn len(&self) -> usize {
        self.achievements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.achievements.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.completed).count()
    }

    /// Carries completion state from `persisted` over this catalog by id.
    ///
    /// Definitions come from `self`; entries only present in `persisted`
    /// are dropped.
    pub fn merged_with(&self, persisted: &AchievementCatalog) -> AchievementCatalog {
        let progress: HashMap<&AchievementId, &AchievementDefinition> =
            persisted.achievements.iter().map(|a| (&a.id, a)).collect();

        let achievements = self
            .achievements
            .iter()
            .map(|definition| {
                let mut merged = definition.clone();
                if let Some(saved) = progress.get(&definition.id) {
                    if saved.completed {
                        merged.completed = true;
                        merged.completed_at = saved.completed_at;
                    }
                }
                merged
            })
            .collect();

        AchievementCatalog { achievements }
    }
}
