pub mod capture;
pub mod evidence_store;
pub mod image_host;

pub use capture::*;
pub use evidence_store::*;
pub use image_host::*;
