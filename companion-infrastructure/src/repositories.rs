pub mod config_files;
pub mod config_store;

pub use config_files::*;
pub use config_store::*;
