//! Core library for the `outfit` CLI.
//!
//! This crate defines:
//! - The clothing data model and catalog
//! - The outfit suggestion engine
//! - Weather lookup with a time-boxed cache
//! - Configuration and the saved user profile (preferences, favorites)
//!
//! It is used by `outfit-cli`, but the engine has no I/O of its own and can
//! be embedded anywhere a catalog and a weather reading are available.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod profile;
pub mod provider;

pub use cache::{CachedProvider, WeatherCache};
pub use catalog::{Catalog, ClothingCatalog};
pub use config::Config;
pub use engine::{DEFAULT_SUGGESTION_COUNT, SuggestionEngine};
pub use error::{CatalogError, ParseValueError};
pub use model::{
    ClothingItem, ClothingType, Culture, DressCode, DressStyle, OutfitSuggestion, TemperatureRange,
    UserPreferences, WeatherCondition, WeatherData,
};
pub use profile::{Favorites, Profile};
pub use provider::{WeatherProvider, WeatherQuery};
