// Domain value objects
pub mod activity_type;
pub mod dedup_key;

pub use activity_type::*;
pub use dedup_key::*;
