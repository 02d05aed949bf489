// Domain services

pub mod classifier;
pub mod deduplicator;

pub use classifier::*;
pub use deduplicator::*;
