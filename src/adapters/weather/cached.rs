//! TTL cache decorator for any [`WeatherProvider`].
//!
//! Entries are process-local and keyed by `(kind, location)`. Clearing the
//! cache only costs extra upstream calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::domain::weather::{CurrentWeather, WeatherError, ZipCode};
use crate::ports::WeatherProvider;

/// Default time-to-live for cached conditions.
pub const DEFAULT_WEATHER_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    kind: &'static str,
    location: String,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CurrentWeather,
    stored_at: Instant,
}

/// Wraps a provider and serves repeated lookups from memory within the TTL.
///
/// Failures are never cached.
pub struct CachedWeatherProvider {
    inner: Arc<dyn WeatherProvider>,
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl CachedWeatherProvider {
    pub fn new(inner: Arc<dyn WeatherProvider>) -> Self {
        Self::with_ttl(inner, DEFAULT_WEATHER_TTL)
    }

    pub fn with_ttl(inner: Arc<dyn WeatherProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drops every cached entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl WeatherProvider for CachedWeatherProvider {
    async fn current_weather(&self, zip: &ZipCode) -> Result<CurrentWeather, WeatherError> {
        let key = CacheKey {
            kind: "current",
            location: zip.base().to_string(),
        };

        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&key) {
                if entry.stored_at.elapsed() < self.ttl {
                    tracing::debug!(location = %key.location, "weather cache hit");
                    return Ok(entry.value.clone());
                }
            }
        }

        tracing::debug!(location = %key.location, "weather cache miss");
        let value = self.inner.current_weather(zip).await?;

        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.stored_at.elapsed() < self.ttl);
        entries.insert(
            key,
            CacheEntry {
                value: value.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingProvider {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl WeatherProvider for CountingProvider {
        async fn current_weather(&self, zip: &ZipCode) -> Result<CurrentWeather, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(WeatherError::Network("down".to_string()));
            }
            Ok(CurrentWeather {
                location: zip.to_string(),
                temperature_f: 70.0,
                feels_like_f: 70.0,
                condition: "Clear".to_string(),
                description: "clear sky".to_string(),
                wind_speed_mph: 2.0,
                humidity: 30,
                observed_at: Timestamp::now(),
            })
        }
    }

    fn zip(raw: &str) -> ZipCode {
        ZipCode::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn repeated_lookup_within_ttl_hits_cache() {
        let inner = CountingProvider::new(false);
        let cached = CachedWeatherProvider::new(inner.clone());

        cached.current_weather(&zip("94110")).await.unwrap();
        cached.current_weather(&zip("94110-1234")).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.len().await, 1);
    }

    #[tokio::test]
    async fn distinct_locations_are_cached_separately() {
        let inner = CountingProvider::new(false);
        let cached = CachedWeatherProvider::new(inner.clone());

        cached.current_weather(&zip("94110")).await.unwrap();
        cached.current_weather(&zip("10001")).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let inner = CountingProvider::new(false);
        let cached = CachedWeatherProvider::with_ttl(inner.clone(), Duration::ZERO);

        cached.current_weather(&zip("94110")).await.unwrap();
        cached.current_weather(&zip("94110")).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn clear_forces_refetch() {
        let inner = CountingProvider::new(false);
        let cached = CachedWeatherProvider::new(inner.clone());

        cached.current_weather(&zip("94110")).await.unwrap();
        cached.clear().await;
        assert!(cached.is_empty().await);
        cached.current_weather(&zip("94110")).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let inner = CountingProvider::new(true);
        let cached = CachedWeatherProvider::new(inner.clone());

        assert!(cached.current_weather(&zip("94110")).await.is_err());
        assert!(cached.current_weather(&zip("94110")).await.is_err());

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert!(cached.is_empty().await);
    }
}
