use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use crate::{
    config::project_dirs,
    model::WeatherData,
    provider::{WeatherProvider, WeatherQuery},
};

pub const DEFAULT_TTL_MINUTES: i64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedWeather {
    pub data: WeatherData,
    pub stored_at: DateTime<Utc>,
}

/// Weather readings keyed by [`WeatherQuery::cache_key`], valid for `ttl`
/// after they were stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherCache {
    #[serde(skip, default = "default_ttl")]
    ttl: Duration,
    entries: HashMap<String, CachedWeather>,
}

fn default_ttl() -> Duration {
    Duration::minutes(DEFAULT_TTL_MINUTES)
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self { ttl: default_ttl(), entries: HashMap::new() }
    }
}

impl WeatherCache {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh reading for `key`, if any. An expired entry is evicted.
    pub fn get(&mut self, key: &str, now: DateTime<Utc>) -> Option<WeatherData> {
        let fresh = self.entries.get(key).map(|entry| now - entry.stored_at < self.ttl)?;

        if fresh {
            self.entries.get(key).map(|entry| entry.data.clone())
        } else {
            self.entries.remove(key);
            None
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, data: WeatherData, now: DateTime<Utc>) {
        self.entries.insert(key.into(), CachedWeather { data, stored_at: now });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Default cache file inside the platform cache directory.
    pub fn default_path() -> Result<PathBuf> {
        Ok(project_dirs()?.cache_dir().join("weather_cache.json"))
    }

    /// Load a cache file, or start empty if it does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read weather cache: {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse weather cache: {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string(self).context("Failed to serialize weather cache")?;

        fs::write(path, json)
            .with_context(|| format!("Failed to write weather cache: {}", path.display()))
    }
}

/// Serves fresh cached readings and otherwise asks the wrapped provider.
#[derive(Debug)]
pub struct CachedProvider<P> {
    inner: P,
    cache: Mutex<WeatherCache>,
}

impl<P: WeatherProvider> CachedProvider<P> {
    pub fn new(inner: P, cache: WeatherCache) -> Self {
        Self { inner, cache: Mutex::new(cache) }
    }

    /// Copy of the current cache contents, e.g. for saving to disk.
    pub fn cache(&self) -> WeatherCache {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl<P: WeatherProvider> WeatherProvider for CachedProvider<P> {
    async fn current(&self, query: &WeatherQuery) -> Result<WeatherData> {
        let key = query.cache_key();

        let hit = self.cache.lock().unwrap_or_else(PoisonError::into_inner).get(&key, Utc::now());
        if let Some(data) = hit {
            tracing::debug!(%key, "weather cache hit");
            return Ok(data);
        }

        tracing::debug!(%key, "weather cache miss");
        let data = self.inner.current(query).await?;

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, data.clone(), Utc::now());

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::model::WeatherCondition;

    fn reading(temperature: f64) -> WeatherData {
        WeatherData::new(temperature, WeatherCondition::Cloudy, "Lisbon")
    }

    #[test]
    fn fresh_entries_are_returned() {
        let now = Utc::now();
        let mut cache = WeatherCache::default();
        cache.insert("lisbon", reading(18.0), now);

        let hit = cache.get("lisbon", now + Duration::minutes(14)).unwrap();
        assert_eq!(hit.temperature, 18.0);
    }

    #[test]
    fn expired_entries_are_evicted() {
        let now = Utc::now();
        let mut cache = WeatherCache::default();
        cache.insert("lisbon", reading(18.0), now);

        assert!(cache.get("lisbon", now + Duration::minutes(15)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn custom_ttl_is_honoured() {
        let now = Utc::now();
        let mut cache = WeatherCache::default().with_ttl(Duration::minutes(1));
        cache.insert("lisbon", reading(18.0), now);

        assert!(cache.get("lisbon", now + Duration::seconds(30)).is_some());
        assert!(cache.get("lisbon", now + Duration::seconds(90)).is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("weather_cache.json");

        let now = Utc::now();
        let mut cache = WeatherCache::default();
        cache.insert("lisbon", reading(21.5), now);
        cache.save_to(&path).unwrap();

        let mut loaded = WeatherCache::load_from(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.ttl(), Duration::minutes(DEFAULT_TTL_MINUTES));
        assert_eq!(loaded.get("lisbon", now).map(|w| w.temperature), Some(21.5));
    }

    #[test]
    fn load_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = WeatherCache::load_from(&dir.path().join("absent.json")).unwrap();
        assert!(cache.is_empty());
    }

    #[derive(Debug, Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherProvider for CountingProvider {
        async fn current(&self, query: &WeatherQuery) -> Result<WeatherData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(WeatherData::new(9.0, WeatherCondition::Rainy, query.to_string()))
        }
    }

    #[tokio::test]
    async fn cached_provider_fetches_once_per_key() {
        let provider = CachedProvider::new(CountingProvider::default(), WeatherCache::default());

        let first = provider.current(&WeatherQuery::Location("Porto".into())).await.unwrap();
        let second = provider.current(&WeatherQuery::Location("porto".into())).await.unwrap();
        provider.current(&WeatherQuery::Location("Faro".into())).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.cache().len(), 2);
    }
}
