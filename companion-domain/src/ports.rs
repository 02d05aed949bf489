// Port traits (interfaces)
// Define what the domain needs from infrastructure

pub mod evidence;
pub mod repositories;
pub mod sync;

pub use evidence::*;
pub use repositories::*;
pub use sync::*;
