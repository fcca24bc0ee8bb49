//! Planning - Goals, projects, and the daily focus.
//!
//! These are user-level intent records. The generation engine only reads
//! them to steer the tasks it proposes.

mod daily_focus;
mod goal;

pub use daily_focus::DailyFocus;
pub use goal::{Goal, PlanStatus, Priority, Project};
