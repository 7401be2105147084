//! Data models for the Mafia moderator

mod game;
mod room;
mod scenario;
mod user;

pub use game::*;
pub use room::*;
pub use scenario::*;
pub use user::*;
