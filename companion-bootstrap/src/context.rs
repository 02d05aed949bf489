use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::{info, warn};

use companion_application::{
    AppState, EvidencePipeline, LivenessScheduler, Metrics, Session, WorkerPool,
};
use companion_domain::ports::{RulesetRepository, ScreenCapture};
use companion_domain::services::{Classifier, Deduplicator};
use companion_domain::{ParticipationStatus, Ruleset, RuntimeConfig};
use companion_infrastructure::{
    AppConfig, CommandCapture, ConfigFileRepository, DisabledCapture, FileEvidenceStore,
    HttpSyncClient, ImgurHost, TomlConfigStore,
};

pub struct AppContext {
    pub state: AppState,
    pub log_dir: Option<String>,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let log_dir = config.log_dir.clone();
        let state = build_state(config.to_runtime_config()).await?;
        Ok(Self { state, log_dir })
    }
}

pub async fn build_state(config: RuntimeConfig) -> Result<AppState> {
    let session = Arc::new(Session::new());
    let sync_api = Arc::new(HttpSyncClient::new(&config, session.clone())?);

    let ruleset = match ConfigFileRepository::new()
        .load_ruleset(&config.ruleset_path)
        .await
    {
        Ok(ruleset) => ruleset,
        Err(err) => {
            warn!(path = %config.ruleset_path, "failed to load ruleset, using defaults: {}", err);
            Ruleset::default()
        }
    };

    let capture: Arc<dyn ScreenCapture> = match &config.capture_command {
        Some(argv) => Arc::new(CommandCapture::new(argv.clone())?),
        None => {
            info!("no capture command configured, screenshots disabled");
            Arc::new(DisabledCapture)
        }
    };
    let evidence = EvidencePipeline::new(
        capture,
        Arc::new(FileEvidenceStore::new(config.screenshot_dir.clone())),
        Arc::new(ImgurHost::new(
            config.image_host_url.clone(),
            config.request_timeout_seconds,
        )?),
    );
    let config_store = Arc::new(TomlConfigStore::open(config.store_path.clone()).await?);

    Ok(AppState {
        sync_api,
        session,
        config_store,
        classifier: Arc::new(Classifier::new(ruleset)),
        deduplicator: Arc::new(Deduplicator::new(
            config.dedup_window_millis(),
            config.dedup_max_entries,
        )),
        evidence: Arc::new(evidence),
        workers: WorkerPool::spawn(config.worker_count, config.queue_capacity),
        scheduler: Arc::new(LivenessScheduler::new()),
        participation: Arc::new(RwLock::new(ParticipationStatus::default())),
        metrics: Arc::new(Metrics::default()),
        config,
    })
}
