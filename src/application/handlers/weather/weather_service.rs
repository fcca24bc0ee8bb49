//! WeatherService - Query handler for current conditions and their interpretation.

use std::sync::Arc;

use crate::domain::weather::{CurrentWeather, WeatherContext, WeatherError, ZipCode};
use crate::ports::WeatherProvider;

/// Validates locations and derives activity guidance from current weather.
///
/// Caching belongs to the provider; wrap it in
/// [`CachedWeatherProvider`](crate::adapters::weather::CachedWeatherProvider).
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Current conditions for a raw US ZIP code.
    ///
    /// # Errors
    ///
    /// `Validation` for a malformed ZIP; otherwise whatever the provider reports.
    pub async fn current_weather(&self, location: &str) -> Result<CurrentWeather, WeatherError> {
        let zip = ZipCode::parse(location)?;
        self.provider.current_weather(&zip).await
    }

    /// Current conditions plus outdoor-friendliness and suggestions.
    pub async fn weather_context(&self, location: &str) -> Result<WeatherContext, WeatherError> {
        let current = self.current_weather(location).await?;
        Ok(WeatherContext::interpret(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::domain::foundation::Timestamp;
    use std::sync::Mutex;

    struct FixedProvider {
        seen: Mutex<Vec<String>>,
        condition: &'static str,
        temperature_f: f64,
    }

    impl FixedProvider {
        fn new(condition: &'static str, temperature_f: f64) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                condition,
                temperature_f,
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for FixedProvider {
        async fn current_weather(&self, zip: &ZipCode) -> Result<CurrentWeather, WeatherError> {
            self.seen.lock().unwrap().push(zip.as_str().to_string());
            Ok(CurrentWeather {
                location: "San Francisco".to_string(),
                temperature_f: self.temperature_f,
                feels_like_f: self.temperature_f,
                condition: self.condition.to_string(),
                description: self.condition.to_lowercase(),
                wind_speed_mph: 5.0,
                humidity: 50,
                observed_at: Timestamp::now(),
            })
        }
    }

    #[tokio::test]
    async fn rejects_malformed_zip_without_calling_provider() {
        let provider = Arc::new(FixedProvider::new("Clear", 70.0));
        let service = WeatherService::new(provider.clone());

        let err = service.current_weather("abc").await.unwrap_err();

        assert!(matches!(err, WeatherError::Validation(_)));
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn interprets_pleasant_weather_as_outdoor_friendly() {
        let service = WeatherService::new(Arc::new(FixedProvider::new("Clear", 72.0)));

        let context = service.weather_context("94110").await.unwrap();

        assert!(context.is_outdoor_friendly);
        assert!(!context.ai_task_suggestions.is_empty());
    }

    #[tokio::test]
    async fn interprets_freezing_snow_as_indoor_day() {
        let service = WeatherService::new(Arc::new(FixedProvider::new("Snow", 20.0)));

        let context = service.weather_context("94110-1234").await.unwrap();

        assert!(!context.is_outdoor_friendly);
    }
}
