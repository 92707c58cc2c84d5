use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Text};
use rand::{SeedableRng, rngs::StdRng};

use outfit_core::{
    CachedProvider, Catalog, ClothingType, Config, Culture, DressCode, DressStyle, Profile,
    SuggestionEngine, UserPreferences, WeatherCache, WeatherCondition, WeatherData,
    WeatherProvider, WeatherQuery, provider::provider_from_config,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "outfit", version, about = "Outfit suggestions for the current weather")]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the weather API key, catalog and default suggestion count.
    Configure,

    /// Suggest outfits for the current weather.
    Suggest {
        #[command(flatten)]
        weather: WeatherArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Number of outfits to suggest.
        #[arg(long)]
        count: Option<NonZeroUsize>,

        /// Ask for a fresh set of ideas.
        #[arg(long)]
        refresh: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Suggest a single outfit.
    Random {
        #[command(flatten)]
        weather: WeatherArgs,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show or change saved style preferences.
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },

    /// Manage favorite outfits.
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },

    /// List the clothing catalog.
    Catalog {
        /// Only list items of this type.
        #[arg(long = "type")]
        kind: Option<ClothingType>,
    },
}

#[derive(Debug, Subcommand)]
pub enum PrefsAction {
    Show,
    /// Save the given filters; fields not passed are kept.
    Set {
        #[command(flatten)]
        filters: FilterArgs,
    },
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum FavoriteAction {
    Add { outfit_id: String },
    Remove { outfit_id: String },
    List,
}

#[derive(Debug, Args)]
pub struct WeatherArgs {
    /// Location to look up, e.g. "Paris".
    #[arg(long)]
    location: Option<String>,

    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    latitude: Option<f64>,

    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    longitude: Option<f64>,

    /// Use this temperature in °C instead of looking up the weather.
    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<f64>,

    /// Condition to report with --temperature.
    #[arg(long, requires = "temperature")]
    condition: Option<WeatherCondition>,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    #[arg(long)]
    style: Option<DressStyle>,

    #[arg(long)]
    culture: Option<Culture>,

    #[arg(long)]
    dress_code: Option<DressCode>,

    /// Preferred color; repeat for several.
    #[arg(long = "color")]
    colors: Vec<String>,

    /// Preferred material; repeat for several.
    #[arg(long = "material")]
    materials: Vec<String>,
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Seed the random source for reproducible suggestions.
    #[arg(long)]
    seed: Option<u64>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl FilterArgs {
    fn to_preferences(&self) -> UserPreferences {
        let list = |values: &[String]| (!values.is_empty()).then(|| values.to_vec());

        UserPreferences {
            dress_style: self.style,
            culture: self.culture,
            dress_code: self.dress_code,
            preferred_colors: list(&self.colors),
            materials: list(&self.materials),
        }
    }
}

impl OutputArgs {
    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Suggest { weather, filters, count, refresh, output: out } => {
                let config = Config::load()?;
                let profile = Profile::load()?;
                let catalog = load_catalog(&config)?;
                let weather = resolve_weather(&weather, &config).await?;
                let preferences = profile.preferences.clone().merge(filters.to_preferences());
                let count = count.map_or_else(|| config.effective_count(), NonZeroUsize::get);

                let engine = SuggestionEngine::new(&catalog);
                let mut rng = out.rng();
                let mut suggestions = if refresh {
                    engine.refresh_suggestions(&weather, &preferences, count, &mut rng)
                } else {
                    engine.generate_suggestions(&weather, &preferences, count, &mut rng)
                };
                profile.favorites.apply(&mut suggestions);

                if out.json {
                    println!("{}", serde_json::to_string_pretty(&suggestions)?);
                } else {
                    print!("{}", output::weather_line(&weather));
                    print!("{}", output::suggestions(&suggestions));
                }
                Ok(())
            }
            Command::Random { weather, filters, output: out } => {
                let config = Config::load()?;
                let profile = Profile::load()?;
                let catalog = load_catalog(&config)?;
                let weather = resolve_weather(&weather, &config).await?;
                let preferences = profile.preferences.clone().merge(filters.to_preferences());

                let engine = SuggestionEngine::new(&catalog);
                let mut suggestion = engine.random_suggestion(&weather, &preferences, &mut out.rng());
                if let Some(s) = suggestion.as_mut() {
                    profile.favorites.apply(std::slice::from_mut(s));
                }

                if out.json {
                    println!("{}", serde_json::to_string_pretty(&suggestion)?);
                } else {
                    print!("{}", output::weather_line(&weather));
                    print!("{}", output::suggestions(suggestion.as_slice()));
                }
                Ok(())
            }
            Command::Prefs { action } => prefs(action),
            Command::Favorite { action } => favorite(action),
            Command::Catalog { kind } => {
                let config = Config::load()?;
                let catalog = load_catalog(&config)?;
                print!("{}", output::catalog(&catalog, kind));
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("WeatherAPI.com key (leave empty to keep current):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;
    if !key.trim().is_empty() {
        config.weather_api_key = Some(key.trim().to_string());
    }

    let current_catalog = config
        .catalog_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let catalog = Text::new("Catalog JSON file (empty for the bundled catalog):")
        .with_default(&current_catalog)
        .prompt()?;
    config.catalog_path = match catalog.trim() {
        "" => None,
        path => Some(PathBuf::from(path)),
    };

    let count = CustomType::<usize>::new("Suggestions per request:")
        .with_default(config.effective_count())
        .with_error_message("Please enter a positive whole number")
        .prompt()?;
    config.suggestion_count = Some(count.max(1));

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn prefs(action: PrefsAction) -> anyhow::Result<()> {
    let mut profile = Profile::load()?;

    match action {
        PrefsAction::Show => {
            print!("{}", output::preferences(&profile.preferences));
            return Ok(());
        }
        PrefsAction::Set { filters } => {
            profile.preferences = profile.preferences.clone().merge(filters.to_preferences());
        }
        PrefsAction::Clear => profile.preferences = UserPreferences::default(),
    }

    profile.save()?;
    print!("{}", output::preferences(&profile.preferences));
    Ok(())
}

fn favorite(action: FavoriteAction) -> anyhow::Result<()> {
    let mut profile = Profile::load()?;

    match action {
        FavoriteAction::Add { outfit_id } => {
            if !profile.favorites.add(outfit_id.clone()) {
                println!("{outfit_id} is already a favorite");
                return Ok(());
            }
            println!("Added {outfit_id}");
        }
        FavoriteAction::Remove { outfit_id } => {
            if !profile.favorites.remove(&outfit_id) {
                return Err(anyhow!("{outfit_id} is not a favorite"));
            }
            println!("Removed {outfit_id}");
        }
        FavoriteAction::List => {
            if profile.favorites.is_empty() {
                println!("No favorites yet");
            }
            for id in profile.favorites.ids() {
                println!("{id}");
            }
            return Ok(());
        }
    }

    profile.save()
}

fn load_catalog(config: &Config) -> anyhow::Result<Catalog> {
    match &config.catalog_path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display())),
        None => Catalog::bundled().context("Bundled catalog is invalid"),
    }
}

/// Build the weather reading the engine runs on. Suggestions are never
/// generated without a temperature.
async fn resolve_weather(args: &WeatherArgs, config: &Config) -> anyhow::Result<WeatherData> {
    if let Some(temperature) = args.temperature {
        let location = args.location.clone().unwrap_or_else(|| "manual input".to_string());
        let condition = args.condition.unwrap_or(WeatherCondition::Clear);
        return Ok(WeatherData::new(temperature, condition, location));
    }

    let query = match (&args.location, args.latitude, args.longitude) {
        (_, Some(latitude), Some(longitude)) => WeatherQuery::Coordinates { latitude, longitude },
        (Some(location), _, _) => WeatherQuery::Location(location.clone()),
        _ => {
            return Err(anyhow!(
                "Weather data is required.\n\
                 Hint: pass --location <place>, --latitude/--longitude, or --temperature <°C>."
            ));
        }
    };

    let provider = provider_from_config(config)?;
    let cache_path = WeatherCache::default_path()?;
    let cache = WeatherCache::load_from(&cache_path)
        .unwrap_or_else(|err| {
            tracing::warn!("ignoring unreadable weather cache: {err:#}");
            WeatherCache::default()
        })
        .with_ttl(config.cache_ttl()?);

    let cached = CachedProvider::new(provider, cache);
    let weather = cached.current(&query).await?;

    if let Err(err) = cached.cache().save_to(&cache_path) {
        tracing::warn!("failed to save weather cache: {err:#}");
    }

    Ok(weather)
}
