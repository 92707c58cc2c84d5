//! Outfit suggestion engine.
//!
//! Filters the catalog by temperature and preferences, partitions the
//! remaining items by slot, and assembles distinct outfits from them. The
//! engine holds no state between calls; the random source is supplied by
//! the caller so runs can be reproduced with a seeded generator.

use std::collections::HashSet;

use rand::{Rng, seq::SliceRandom};

use crate::{
    catalog::ClothingCatalog,
    model::{ClothingItem, ClothingType, OutfitSuggestion, UserPreferences, WeatherData, outfit_id},
};

pub const DEFAULT_SUGGESTION_COUNT: usize = 10;

/// Below this many candidates the preference filter is dropped.
pub const MIN_POOL_SIZE: usize = 20;

/// Outerwear is added when the temperature is strictly below this.
pub const OUTERWEAR_THRESHOLD_C: f64 = 15.0;

pub const ACCESSORY_PROBABILITY: f64 = 0.2;

pub struct SuggestionEngine<'a, C: ?Sized> {
    catalog: &'a C,
}

impl<'a, C: ClothingCatalog + ?Sized> SuggestionEngine<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Assemble up to `count` distinct outfits that suit `weather`.
    ///
    /// Returns fewer outfits (possibly none) when the catalog cannot supply
    /// enough distinct combinations within `2 * count` attempts, and none at
    /// all when no top, bottom or shoes suit the temperature.
    pub fn generate_suggestions<R: Rng + ?Sized>(
        &self,
        weather: &WeatherData,
        preferences: &UserPreferences,
        count: usize,
        rng: &mut R,
    ) -> Vec<OutfitSuggestion> {
        if count == 0 {
            return Vec::new();
        }

        let temperature = weather.temperature;
        let pool = self.candidate_pool(temperature, preferences);
        let slots = Slots::partition(pool, rng);

        if slots.tops.is_empty() || slots.bottoms.is_empty() || slots.shoes.is_empty() {
            tracing::warn!(
                temperature,
                tops = slots.tops.len(),
                bottoms = slots.bottoms.len(),
                shoes = slots.shoes.len(),
                "not enough clothing items to create outfits"
            );
            return Vec::new();
        }

        let with_outerwear = temperature < OUTERWEAR_THRESHOLD_C;
        let max_iterations = count.saturating_mul(2);

        let mut seen = HashSet::with_capacity(count);
        let mut suggestions = Vec::with_capacity(count);

        for iteration in 1..=max_iterations {
            if suggestions.len() >= count {
                break;
            }

            let mut picked: Vec<&ClothingItem> = Vec::with_capacity(5);

            let outer = if with_outerwear { pick(&slots.outerwear, iteration) } else { None };
            picked.extend(outer);
            picked.extend(pick(&slots.tops, iteration));
            picked.extend(pick(&slots.bottoms, iteration));
            picked.extend(pick(&slots.shoes, iteration));

            if !slots.accessories.is_empty() && rng.gen_bool(ACCESSORY_PROBABILITY) {
                picked.extend(pick(&slots.accessories, iteration));
            }

            let id = outfit_id(picked.iter().copied());
            if seen.insert(id.clone()) {
                let items = picked.into_iter().cloned().collect();
                suggestions.push(OutfitSuggestion::with_id(id, items));
            }
        }

        tracing::debug!(
            requested = count,
            produced = suggestions.len(),
            "generated outfit suggestions"
        );

        suggestions
    }

    /// A fresh randomized set for the same inputs. Usually differs from the
    /// previous set, but nothing prevents a repeat.
    pub fn refresh_suggestions<R: Rng + ?Sized>(
        &self,
        weather: &WeatherData,
        preferences: &UserPreferences,
        count: usize,
        rng: &mut R,
    ) -> Vec<OutfitSuggestion> {
        self.generate_suggestions(weather, preferences, count, rng)
    }

    pub fn random_suggestion<R: Rng + ?Sized>(
        &self,
        weather: &WeatherData,
        preferences: &UserPreferences,
        rng: &mut R,
    ) -> Option<OutfitSuggestion> {
        self.generate_suggestions(weather, preferences, 1, rng).into_iter().next()
    }

    /// Items suitable for `temperature`, narrowed by `preferences` unless
    /// that leaves fewer than [`MIN_POOL_SIZE`] items.
    fn candidate_pool(&self, temperature: f64, preferences: &UserPreferences) -> Vec<&'a ClothingItem> {
        let by_temperature = filter_by_temperature(self.catalog.items(), temperature);

        if preferences.is_empty() {
            return by_temperature;
        }

        let by_preferences = filter_by_preferences(by_temperature.clone(), preferences);
        if by_preferences.len() < MIN_POOL_SIZE {
            tracing::debug!(
                matched = by_preferences.len(),
                fallback = by_temperature.len(),
                "too few items match preferences, using temperature filter only"
            );
            return by_temperature;
        }

        by_preferences
    }
}

fn filter_by_temperature(items: &[ClothingItem], temperature: f64) -> Vec<&ClothingItem> {
    items.iter().filter(|item| item.suits_temperature(temperature)).collect()
}

fn filter_by_preferences<'c>(
    mut items: Vec<&'c ClothingItem>,
    preferences: &UserPreferences,
) -> Vec<&'c ClothingItem> {
    if let Some(style) = preferences.dress_style {
        items.retain(|item| item.style == style || item.style.is_universal());
    }
    if let Some(culture) = preferences.culture {
        items.retain(|item| item.culture == culture);
    }
    if let Some(code) = preferences.dress_code {
        items.retain(|item| item.dress_code == code);
    }
    if let Some(colors) = preferences.colors() {
        items.retain(|item| contains_any(&item.color, colors));
    }
    if let Some(materials) = preferences.materials() {
        items.retain(|item| contains_any(&item.material, materials));
    }
    items
}

/// Case-insensitive substring match against any needle.
fn contains_any(haystack: &str, needles: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    needles.iter().any(|n| haystack.contains(&n.to_lowercase()))
}

fn pick<'c>(list: &[&'c ClothingItem], iteration: usize) -> Option<&'c ClothingItem> {
    if list.is_empty() {
        return None;
    }
    list.get(iteration % list.len()).copied()
}

/// Candidates split by clothing type, each list independently shuffled.
struct Slots<'c> {
    tops: Vec<&'c ClothingItem>,
    bottoms: Vec<&'c ClothingItem>,
    shoes: Vec<&'c ClothingItem>,
    outerwear: Vec<&'c ClothingItem>,
    accessories: Vec<&'c ClothingItem>,
}

impl<'c> Slots<'c> {
    fn partition<R: Rng + ?Sized>(pool: Vec<&'c ClothingItem>, rng: &mut R) -> Self {
        let mut slots = Slots {
            tops: Vec::new(),
            bottoms: Vec::new(),
            shoes: Vec::new(),
            outerwear: Vec::new(),
            accessories: Vec::new(),
        };

        for item in pool {
            match item.kind {
                ClothingType::Top => slots.tops.push(item),
                ClothingType::Bottom => slots.bottoms.push(item),
                ClothingType::Shoes => slots.shoes.push(item),
                ClothingType::Outerwear => slots.outerwear.push(item),
                ClothingType::Accessory => slots.accessories.push(item),
            }
        }

        slots.tops.shuffle(rng);
        slots.bottoms.shuffle(rng);
        slots.shoes.shuffle(rng);
        slots.outerwear.shuffle(rng);
        slots.accessories.shuffle(rng);

        slots
    }
}
