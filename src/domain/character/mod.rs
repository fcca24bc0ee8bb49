//! Character - The player's avatar and its skill stats.

mod avatar;
mod stat;
mod user;

pub use avatar::Character;
pub use stat::{CharacterStat, FAMILY_BONDING_STAT};
pub use user::User;
