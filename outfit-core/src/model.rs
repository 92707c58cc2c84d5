use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseValueError;

/// Declares a closed set of lowercase string values with serde, `Display`
/// and `FromStr` sharing one spelling.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            pub const fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseValueError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let lower = value.trim().to_lowercase();

                $name::all()
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == lower)
                    .ok_or_else(|| ParseValueError {
                        kind: $kind,
                        value: value.to_string(),
                        expected: $name::all()
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

text_enum! {
    /// The slot a clothing item fills in an outfit.
    pub enum ClothingType ("clothing type") {
        Top => "top",
        Bottom => "bottom",
        Shoes => "shoes",
        Outerwear => "outerwear",
        Accessory => "accessory",
    }
}

text_enum! {
    pub enum Culture ("culture") {
        Western => "western",
        African => "african",
        Indian => "indian",
        EastAsian => "east-asian",
        MiddleEastern => "middle-eastern",
    }
}

text_enum! {
    pub enum DressStyle ("dress style") {
        Masculine => "masculine",
        Feminine => "feminine",
        Unisex => "unisex",
        Androgynous => "androgynous",
        GenderFluid => "gender-fluid",
    }
}

text_enum! {
    pub enum DressCode ("dress code") {
        Formal => "formal",
        Casual => "casual",
        SemiFormal => "semi-formal",
        BlackTie => "black-tie",
        Gala => "gala",
    }
}

text_enum! {
    pub enum WeatherCondition ("weather condition") {
        Sunny => "sunny",
        Cloudy => "cloudy",
        Rainy => "rainy",
        Snowy => "snowy",
        Windy => "windy",
        Clear => "clear",
        PartlyCloudy => "partly-cloudy",
    }
}

impl DressStyle {
    /// Styles that are offered regardless of the requested style.
    pub fn is_universal(&self) -> bool {
        matches!(self, DressStyle::Unisex | DressStyle::GenderFluid)
    }
}

impl WeatherCondition {
    /// Map a free-text provider description ("Light rain", "Partly cloudy")
    /// onto a condition. The first matching keyword group wins.
    pub fn from_description(text: &str) -> Self {
        let text = text.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

        if has(&["sunny", "clear"]) {
            WeatherCondition::Sunny
        } else if has(&["rain", "drizzle"]) {
            WeatherCondition::Rainy
        } else if has(&["snow", "sleet", "ice"]) {
            WeatherCondition::Snowy
        } else if has(&["wind"]) {
            WeatherCondition::Windy
        } else if has(&["cloudy", "overcast"]) {
            WeatherCondition::Cloudy
        } else if has(&["partly"]) {
            WeatherCondition::PartlyCloudy
        } else {
            WeatherCondition::Clear
        }
    }
}

/// Inclusive range of ambient temperatures in Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl TemperatureRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, temperature: f64) -> bool {
        temperature >= self.min && temperature <= self.max
    }

    /// True when `min > max`.
    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }

    /// Tightest range common to both.
    pub fn intersect(&self, other: &TemperatureRange) -> TemperatureRange {
        TemperatureRange {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }
}

impl fmt::Display for TemperatureRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°C..{}°C", self.min, self.max)
    }
}

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothingItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ClothingType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub color: String,
    pub material: String,
    pub culture: Culture,
    pub style: DressStyle,
    pub dress_code: DressCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_link: Option<String>,
    pub temperature_range: TemperatureRange,
}

impl ClothingItem {
    pub fn suits_temperature(&self, temperature: f64) -> bool {
        self.temperature_range.contains(temperature)
    }
}

/// Current conditions at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    /// Celsius.
    pub temperature: f64,
    pub condition: WeatherCondition,
    pub location: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u8>,
    /// km/h.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
}

impl WeatherData {
    /// A reading taken now with only the required fields filled in.
    pub fn new(temperature: f64, condition: WeatherCondition, location: impl Into<String>) -> Self {
        Self {
            temperature,
            condition,
            location: location.into(),
            timestamp: Utc::now(),
            feels_like: None,
            humidity: None,
            wind_speed: None,
        }
    }
}

/// Optional narrowing of the catalog. `None` (or an empty list) places no
/// constraint on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dress_style: Option<DressStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<Culture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dress_code: Option<DressCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<String>>,
}

impl UserPreferences {
    /// True when no field would narrow the catalog.
    pub fn is_empty(&self) -> bool {
        self.dress_style.is_none()
            && self.culture.is_none()
            && self.dress_code.is_none()
            && non_empty(&self.preferred_colors).is_none()
            && non_empty(&self.materials).is_none()
    }

    pub fn colors(&self) -> Option<&[String]> {
        non_empty(&self.preferred_colors)
    }

    pub fn materials(&self) -> Option<&[String]> {
        non_empty(&self.materials)
    }

    /// Layer `overrides` on top of `self`: every field set in `overrides`
    /// replaces the stored one.
    pub fn merge(mut self, overrides: UserPreferences) -> UserPreferences {
        if overrides.dress_style.is_some() {
            self.dress_style = overrides.dress_style;
        }
        if overrides.culture.is_some() {
            self.culture = overrides.culture;
        }
        if overrides.dress_code.is_some() {
            self.dress_code = overrides.dress_code;
        }
        if overrides.preferred_colors.is_some() {
            self.preferred_colors = overrides.preferred_colors;
        }
        if overrides.materials.is_some() {
            self.materials = overrides.materials;
        }
        self
    }
}

fn non_empty(list: &Option<Vec<String>>) -> Option<&[String]> {
    list.as_deref().filter(|l| !l.is_empty())
}

/// One assembled outfit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitSuggestion {
    pub id: String,
    /// Outerwear first (if any), then top, bottom, shoes, then accessory (if any).
    pub items: Vec<ClothingItem>,
    pub total_temperature_range: TemperatureRange,
    #[serde(default)]
    pub is_favorite: bool,
}

impl OutfitSuggestion {
    /// Build an outfit from items already in slot order.
    pub fn new(items: Vec<ClothingItem>) -> Self {
        Self::with_id(outfit_id(&items), items)
    }

    /// Like [`new`](Self::new) for callers that already hold
    /// `outfit_id(&items)`.
    pub(crate) fn with_id(id: String, items: Vec<ClothingItem>) -> Self {
        let total_temperature_range = items.iter().fold(
            TemperatureRange::new(f64::NEG_INFINITY, f64::INFINITY),
            |acc, item| acc.intersect(&item.temperature_range),
        );

        Self {
            id,
            items,
            total_temperature_range,
            is_favorite: false,
        }
    }
}

/// `outfit_<id>_<id>...` in slot order.
pub fn outfit_id<'a>(items: impl IntoIterator<Item = &'a ClothingItem>) -> String {
    let mut id = String::from("outfit");
    for item in items {
        id.push('_');
        id.push_str(&item.id);
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, kind: ClothingType, min: f64, max: f64) -> ClothingItem {
        ClothingItem {
            id: id.to_string(),
            kind,
            name: id.to_string(),
            image_url: None,
            color: "Black".into(),
            material: "Cotton".into(),
            culture: Culture::Western,
            style: DressStyle::Unisex,
            dress_code: DressCode::Casual,
            buy_link: None,
            temperature_range: TemperatureRange::new(min, max),
        }
    }

    #[test]
    fn enum_as_str_roundtrip() {
        for c in Culture::all() {
            assert_eq!(c.as_str().parse::<Culture>().unwrap(), *c);
        }
        for s in DressStyle::all() {
            assert_eq!(s.to_string().parse::<DressStyle>().unwrap(), *s);
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_reports_unknown_values() {
        assert_eq!("Semi-Formal".parse::<DressCode>().unwrap(), DressCode::SemiFormal);

        let err = "tuxedo".parse::<DressCode>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown dress code 'tuxedo'"));
        assert!(msg.contains("black-tie"));
    }

    #[test]
    fn serde_uses_kebab_case_values() {
        let json = serde_json::to_string(&Culture::EastAsian).unwrap();
        assert_eq!(json, "\"east-asian\"");

        let parsed: DressStyle = serde_json::from_str("\"gender-fluid\"").unwrap();
        assert_eq!(parsed, DressStyle::GenderFluid);
    }

    #[test]
    fn condition_mapping_follows_keyword_order() {
        assert_eq!(WeatherCondition::from_description("Sunny"), WeatherCondition::Sunny);
        assert_eq!(WeatherCondition::from_description("Patchy light drizzle"), WeatherCondition::Rainy);
        assert_eq!(WeatherCondition::from_description("Moderate snow"), WeatherCondition::Snowy);
        assert_eq!(WeatherCondition::from_description("Ice pellets"), WeatherCondition::Snowy);
        assert_eq!(WeatherCondition::from_description("Overcast"), WeatherCondition::Cloudy);
        // "cloudy" is checked before "partly"
        assert_eq!(WeatherCondition::from_description("Partly cloudy"), WeatherCondition::Cloudy);
        assert_eq!(WeatherCondition::from_description("Mist"), WeatherCondition::Clear);
    }

    #[test]
    fn outfit_id_and_range_follow_items() {
        let outfit = OutfitSuggestion::new(vec![
            item("t1", ClothingType::Top, 5.0, 25.0),
            item("b1", ClothingType::Bottom, 0.0, 20.0),
            item("s1", ClothingType::Shoes, 10.0, 30.0),
        ]);

        assert_eq!(outfit.id, "outfit_t1_b1_s1");
        assert_eq!(outfit.total_temperature_range, TemperatureRange::new(10.0, 20.0));
        assert!(!outfit.is_favorite);
    }

    #[test]
    fn disjoint_item_ranges_give_an_inverted_outfit_range() {
        let outfit = OutfitSuggestion::new(vec![
            item("t1", ClothingType::Top, 0.0, 10.0),
            item("b1", ClothingType::Bottom, 20.0, 30.0),
        ]);

        assert_eq!(outfit.total_temperature_range, TemperatureRange::new(20.0, 10.0));
        assert!(outfit.total_temperature_range.is_inverted());
    }

    #[test]
    fn with_id_matches_new() {
        let items = vec![
            item("t1", ClothingType::Top, 5.0, 25.0),
            item("s1", ClothingType::Shoes, 10.0, 30.0),
        ];
        let id = outfit_id(&items);

        assert_eq!(OutfitSuggestion::with_id(id, items.clone()), OutfitSuggestion::new(items));
    }

    #[test]
    fn clothing_item_json_uses_camel_case_and_type_key() {
        let json = r#"{
            "id": "top-1",
            "type": "top",
            "name": "Oxford shirt",
            "color": "White",
            "material": "Cotton",
            "culture": "western",
            "style": "masculine",
            "dressCode": "semi-formal",
            "temperatureRange": { "min": 12, "max": 28 }
        }"#;

        let item: ClothingItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, ClothingType::Top);
        assert_eq!(item.dress_code, DressCode::SemiFormal);
        assert!(item.buy_link.is_none());
        assert!(item.suits_temperature(12.0));
        assert!(item.suits_temperature(28.0));
        assert!(!item.suits_temperature(28.5));
    }

    #[test]
    fn preferences_empty_lists_do_not_constrain() {
        let prefs = UserPreferences {
            preferred_colors: Some(vec![]),
            ..Default::default()
        };
        assert!(prefs.is_empty());
        assert!(prefs.colors().is_none());
    }

    #[test]
    fn merge_replaces_only_set_fields() {
        let stored = UserPreferences {
            culture: Some(Culture::Indian),
            materials: Some(vec!["silk".into()]),
            ..Default::default()
        };
        let overrides = UserPreferences {
            culture: Some(Culture::African),
            dress_code: Some(DressCode::Gala),
            ..Default::default()
        };

        let merged = stored.merge(overrides);
        assert_eq!(merged.culture, Some(Culture::African));
        assert_eq!(merged.dress_code, Some(DressCode::Gala));
        assert_eq!(merged.materials, Some(vec!["silk".to_string()]));
    }
}
