//! PostgreSQL adapters - Database implementations for storage ports.
//!
//! - `PostgresUserContextReader` - Reads users, characters, stats, family, plans and focus
//! - `PostgresTaskRepository` - Daily generation guard, task inserts and history
//! - `PostgresPatternRepository` - Pattern record and insight upserts
//!
//! Schema lives in `migrations/` at the crate root.

mod pattern_repository;
mod rows;
mod task_repository;
mod user_context_reader;

pub use pattern_repository::PostgresPatternRepository;
pub use task_repository::PostgresTaskRepository;
pub use user_context_reader::PostgresUserContextReader;
