use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use crate::{
    config::{load_toml, project_dirs, save_toml},
    model::{OutfitSuggestion, UserPreferences},
};

/// Ids of outfits the user has marked as favorite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites(BTreeSet<String>);

impl Favorites {
    /// Returns `false` if the id was already a favorite.
    pub fn add(&mut self, outfit_id: impl Into<String>) -> bool {
        self.0.insert(outfit_id.into())
    }

    /// Returns `false` if the id was not a favorite.
    pub fn remove(&mut self, outfit_id: &str) -> bool {
        self.0.remove(outfit_id)
    }

    pub fn contains(&self, outfit_id: &str) -> bool {
        self.0.contains(outfit_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Set `is_favorite` on each suggestion from membership in this set.
    pub fn apply(&self, suggestions: &mut [OutfitSuggestion]) {
        for suggestion in suggestions {
            suggestion.is_favorite = self.contains(&suggestion.id);
        }
    }
}

/// Everything persisted about the user: saved preferences and favorites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    // arrays must precede tables in TOML output
    #[serde(default)]
    pub favorites: Favorites,

    #[serde(default)]
    pub preferences: UserPreferences,
}

impl Profile {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::profile_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        load_toml(path, "profile")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::profile_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        save_toml(self, path, "profile")
    }

    pub fn profile_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join("profile.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ClothingItem, ClothingType, Culture, DressCode, DressStyle, TemperatureRange,
    };

    fn outfit(id: &str) -> OutfitSuggestion {
        let top = ClothingItem {
            id: id.to_string(),
            kind: ClothingType::Top,
            name: "Tee".into(),
            image_url: None,
            color: "White".into(),
            material: "Cotton".into(),
            culture: Culture::Western,
            style: DressStyle::Unisex,
            dress_code: DressCode::Casual,
            buy_link: None,
            temperature_range: TemperatureRange::new(10.0, 30.0),
        };
        OutfitSuggestion::new(vec![top])
    }

    #[test]
    fn add_is_idempotent_and_remove_reports_absence() {
        let mut favorites = Favorites::default();

        assert!(favorites.add("outfit_a_b_c"));
        assert!(!favorites.add("outfit_a_b_c"));
        assert_eq!(favorites.len(), 1);

        assert!(favorites.remove("outfit_a_b_c"));
        assert!(!favorites.remove("outfit_a_b_c"));
        assert!(favorites.is_empty());
    }

    #[test]
    fn apply_marks_and_unmarks_suggestions() {
        let mut suggestions = vec![outfit("x"), outfit("y")];
        suggestions[1].is_favorite = true;

        let mut favorites = Favorites::default();
        favorites.add("outfit_x");
        favorites.apply(&mut suggestions);

        assert!(suggestions[0].is_favorite);
        assert!(!suggestions[1].is_favorite);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("profile.toml");

        let mut profile = Profile::default();
        profile.favorites.add("outfit_top-1_bottom-2_shoes-3");
        profile.preferences = UserPreferences {
            dress_style: Some(DressStyle::Androgynous),
            culture: Some(Culture::EastAsian),
            dress_code: None,
            preferred_colors: Some(vec!["navy".into(), "gray".into()]),
            materials: None,
        };
        profile.save_to(&path).unwrap();

        let loaded = Profile::load_from(&path).unwrap();
        assert_eq!(loaded, profile);
        assert_eq!(loaded.favorites.ids().collect::<Vec<_>>(), ["outfit_top-1_bottom-2_shoes-3"]);
    }

    #[test]
    fn load_missing_file_returns_empty_profile() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Profile::load_from(&dir.path().join("profile.toml")).unwrap();

        assert!(loaded.favorites.is_empty());
        assert!(loaded.preferences.is_empty());
    }
}
