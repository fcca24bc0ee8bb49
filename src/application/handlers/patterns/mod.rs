//! Pattern handlers.

mod record_completion;

pub use record_completion::{RecordCompletionHandler, RecordCompletionResult};
