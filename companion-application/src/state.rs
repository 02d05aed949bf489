use std::sync::Arc;

use companion_domain::ports::{ConfigStore, SyncApi};
use companion_domain::services::{Classifier, Deduplicator};
use companion_domain::{ParticipationStatus, RuntimeConfig};
use tokio::sync::RwLock;

use crate::{EvidencePipeline, LivenessScheduler, Metrics, Session, WorkerPool};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub sync_api: Arc<dyn SyncApi>,
    pub session: Arc<Session>,
    pub config_store: Arc<dyn ConfigStore>,
    pub classifier: Arc<Classifier>,
    pub deduplicator: Arc<Deduplicator>,
    pub evidence: Arc<EvidencePipeline>,
    pub workers: WorkerPool,
    pub scheduler: Arc<LivenessScheduler>,
    pub participation: Arc<RwLock<ParticipationStatus>>,
    pub metrics: Arc<Metrics>,
}
