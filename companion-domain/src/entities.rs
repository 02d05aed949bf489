// Domain entities

pub mod activity;
pub mod competition;
pub mod config;
pub mod credential;
pub mod game_event;
pub mod participation;
pub mod ruleset;

pub use activity::*;
pub use competition::*;
pub use config::*;
pub use credential::*;
pub use game_event::*;
pub use participation::*;
pub use ruleset::*;
