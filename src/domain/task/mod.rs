//! Task - Generated and user-created tasks and their completions.

mod completion;
mod record;

pub use completion::TaskCompletion;
pub use record::{Task, TaskSource, TaskStatus};
