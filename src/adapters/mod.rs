//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Completion providers (OpenAI, mock)
//! - `weather` - OpenWeatherMap client and TTL cache
//! - `postgres` - sqlx implementations of the storage ports
//! - `memory` - In-process store for tests and dry runs

pub mod ai;
pub mod memory;
pub mod postgres;
pub mod weather;
