use outfit_core::{Catalog, ClothingCatalog, ClothingType, OutfitSuggestion, UserPreferences, WeatherData};

pub fn weather_line(weather: &WeatherData) -> String {
    let feels_like = weather
        .feels_like
        .map(|f| format!(" (feels like {f}°C)"))
        .unwrap_or_default();

    format!(
        "{}: {}°C, {}{feels_like}\n",
        weather.location, weather.temperature, weather.condition
    )
}

pub fn suggestions(suggestions: &[OutfitSuggestion]) -> String {
    if suggestions.is_empty() {
        return "No suggestions available for current conditions\n".to_string();
    }

    let mut out = String::new();
    for (n, outfit) in suggestions.iter().enumerate() {
        let star = if outfit.is_favorite { " ★" } else { "" };
        out.push_str(&format!("\n{}. {}{star}\n", n + 1, outfit.id));

        for item in &outfit.items {
            out.push_str(&format!(
                "   {:<10} {} ({} {})\n",
                item.kind.as_str(),
                item.name,
                item.color,
                item.material.to_lowercase(),
            ));
            if let Some(link) = &item.buy_link {
                out.push_str(&format!("              {link}\n"));
            }
        }
        out.push_str(&format!("   suits {}\n", outfit.total_temperature_range));
    }
    out
}

pub fn preferences(prefs: &UserPreferences) -> String {
    if prefs.is_empty() {
        return "No saved preferences\n".to_string();
    }

    let or_any = |v: Option<String>| v.unwrap_or_else(|| "any".to_string());
    [
        ("style:     ", or_any(prefs.dress_style.map(|s| s.to_string()))),
        ("culture:   ", or_any(prefs.culture.map(|c| c.to_string()))),
        ("dress code:", or_any(prefs.dress_code.map(|c| c.to_string()))),
        ("colors:    ", or_any(prefs.colors().map(|c| c.join(", ")))),
        ("materials: ", or_any(prefs.materials().map(|m| m.join(", ")))),
    ]
    .iter()
    .map(|(label, value)| format!("{label} {value}\n"))
    .collect()
}

pub fn catalog(catalog: &Catalog, kind: Option<ClothingType>) -> String {
    catalog
        .items()
        .iter()
        .filter(|item| kind.is_none_or(|k| item.kind == k))
        .map(|item| {
            format!(
                "{:<24} {:<10} {:<28} {:<15} {:<12} {}\n",
                item.id,
                item.kind.as_str(),
                item.name,
                item.culture.as_str(),
                item.dress_code.as_str(),
                item.temperature_range,
            )
        })
        .collect()
}
