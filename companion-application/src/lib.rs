// Companion Application Layer

pub mod commands;
pub mod error;
pub mod evidence;
pub mod metrics;
pub mod queries;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod workers;

#[cfg(test)]
pub(crate) mod testing;

pub use error::AppError;
pub use evidence::{EvidenceContext, EvidencePipeline};
pub use metrics::Metrics;
pub use scheduler::{HeartbeatOutcome, LivenessScheduler};
pub use session::{Session, SessionEvent};
pub use state::AppState;
pub use workers::WorkerPool;
