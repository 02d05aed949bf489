pub mod activity_commands;
pub mod participation_commands;
pub mod session_commands;
