pub mod context;
pub mod lifecycle;

pub use context::{build_state, AppContext};
pub use lifecycle::run_standalone;
