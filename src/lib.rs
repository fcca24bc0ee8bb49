//! LifeQuest - Adaptive daily task generation
//!
//! Once per day per user, this crate aggregates the user's character,
//! family, plans, history and learned patterns, asks a language model for
//! one adventure task and one family task, and stores them idempotently.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
