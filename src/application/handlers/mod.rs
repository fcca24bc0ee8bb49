//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.
//!
//! - `context` - Context Aggregator (user snapshot for prompting)
//! - `weather` - Weather lookups and interpretation
//! - `generation` - Daily task orchestrator and batch runner
//! - `patterns` - Completion-event recording

pub mod context;
pub mod generation;
pub mod patterns;
pub mod weather;

pub use context::{ContextAggregator, DAILY_TASK_HISTORY_DAYS};
pub use generation::{BatchRunner, GenerateDailyTasksCommand, GenerateDailyTasksHandler, UserLocks};
pub use patterns::{RecordCompletionHandler, RecordCompletionResult};
pub use weather::WeatherService;
