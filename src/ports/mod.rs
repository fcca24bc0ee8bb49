//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## External Services
//!
//! - `AIProvider` - Language-model completion service
//! - `WeatherProvider` - Current weather conditions by postal code
//!
//! ## Storage
//!
//! - `UserContextReader` - Read side for everything the context aggregator loads
//! - `TaskRepository` - Daily generation guard, task inserts and history
//! - `PatternRepository` - Pattern record and insight upserts

mod ai_provider;
mod pattern_repository;
mod task_repository;
mod user_context_reader;
mod weather_provider;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use pattern_repository::PatternRepository;
pub use task_repository::{TaskRepository, TaskWithCompletion};
pub use user_context_reader::UserContextReader;
pub use weather_provider::WeatherProvider;
