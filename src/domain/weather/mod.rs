//! Weather - Current conditions and the outdoor-activity advice derived from them.
//!
//! Weather is advisory input to task generation; nothing in this module
//! performs I/O. Fetching lives behind the `WeatherProvider` port.

mod conditions;
mod errors;
mod interpretation;

pub use conditions::{CurrentWeather, ZipCode};
pub use errors::WeatherError;
pub use interpretation::WeatherContext;
