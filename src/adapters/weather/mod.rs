//! Weather Provider Adapters.
//!
//! - `OpenWeatherProvider` - OpenWeatherMap current-weather client
//! - `CachedWeatherProvider` - TTL cache decorator for any provider

mod cached;
mod openweather;

pub use cached::{CachedWeatherProvider, DEFAULT_WEATHER_TTL};
pub use openweather::{OpenWeatherConfig, OpenWeatherProvider};
