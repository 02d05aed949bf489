// In-memory fakes for the domain ports

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{Mutex, Notify, RwLock};

use companion_domain::ports::{
    AuthError, CapturedImage, ConfigStore, EvidenceName, EvidenceStore, ImageHost, ScreenCapture, SyncApi,
};
use companion_domain::services::{Classifier, Deduplicator};
use companion_domain::{
    ActiveEvents, ActivityLogEntry, ActivityRecord, BingoEvent, Credential, ParticipationStatus,
    RuntimeConfig, SignupStatus,
};

use crate::{AppState, EvidencePipeline, LivenessScheduler, Metrics, Session, WorkerPool};

const PNG: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

#[derive(Default)]
pub struct FakeSync {
    pub token: Option<String>,
    pub token_calls: AtomicUsize,
    pub heartbeats: AtomicUsize,
    pub submissions: Mutex<Vec<(String, String, ActivityRecord)>>,
    active_events: std::sync::Mutex<Option<ActiveEvents>>,
    events_gate: std::sync::Mutex<Option<Arc<FetchGate>>>,
}

/// Holds `fetch_active_events` open: signals `entered`, waits for `release`.
#[derive(Default)]
pub struct FetchGate {
    pub entered: Notify,
    pub release: Notify,
}

impl FakeSync {
    pub const BAD_SECRET: &'static str = "wrong";
    pub const OFFLINE_SECRET: &'static str = "offline";

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            ..Self::default()
        }
    }

    pub fn gate_active_events(&self) -> Arc<FetchGate> {
        let gate = Arc::new(FetchGate::default());
        *self.events_gate.lock().unwrap_or_else(|p| p.into_inner()) = Some(gate.clone());
        gate
    }

    pub fn set_active_events(&self, events: Option<ActiveEvents>) {
        *self.active_events.lock().unwrap_or_else(|p| p.into_inner()) = events;
    }
}

#[async_trait]
impl SyncApi for FakeSync {
    async fn authenticate(&self, rsn: &str, secret: &str) -> Result<Credential, AuthError> {
        match secret {
            Self::BAD_SECRET => return Err(AuthError::Rejected("invalid credentials".to_string())),
            Self::OFFLINE_SECRET => return Err(AuthError::Unavailable("connection refused".to_string())),
            _ => {}
        }
        Ok(Credential::new(rsn, format!("jwt-{}", rsn), "7"))
    }

    async fn fetch_board(&self, rsn: &str) -> Option<Value> {
        Some(json!({ "rsn": rsn }))
    }

    async fn fetch_team(&self, team_id: &str) -> Option<Value> {
        Some(json!({ "teamId": team_id }))
    }

    async fn fetch_active_events(&self) -> Option<ActiveEvents> {
        let gate = self.events_gate.lock().unwrap_or_else(|p| p.into_inner()).clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.active_events
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    async fn fetch_activity_log(&self, _event_id: &str) -> Option<Vec<ActivityLogEntry>> {
        Some(vec![ActivityLogEntry {
            player_rsn: "Zezima".to_string(),
            activity_type: "BOSS_KILL".to_string(),
            timestamp: 1_700_000_000,
            monster_name: "Zulrah".to_string(),
            drop_name: None,
            total_kc: 1,
            screenshot_url: None,
            team_id: Some("7".to_string()),
        }])
    }

    async fn submit_activity(&self, event_id: &str, rsn: &str, record: &ActivityRecord) -> bool {
        self.submissions
            .lock()
            .await
            .push((event_id.to_string(), rsn.to_string(), record.clone()));
        true
    }

    async fn send_heartbeat(&self, _rsn: &str) -> bool {
        self.heartbeats.fetch_add(1, Ordering::SeqCst);
        true
    }

    async fn get_signup_status(&self, _event_id: &str, _rsn: &str) -> SignupStatus {
        SignupStatus {
            signed_up: true,
            accepted: true,
            message: String::new(),
        }
    }

    async fn get_image_host_token(&self) -> Option<String> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        self.token.clone()
    }
}

#[derive(Default)]
pub struct FakeCapture {
    fail: bool,
}

impl FakeCapture {
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl ScreenCapture for FakeCapture {
    async fn capture(&self) -> anyhow::Result<CapturedImage> {
        if self.fail {
            anyhow::bail!("display unavailable");
        }
        CapturedImage::from_png(PNG.to_vec())
    }
}

#[derive(Default)]
pub struct FakeStore {
    fail: bool,
    pub saved: Mutex<Vec<(String, String, String)>>,
}

impl FakeStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl EvidenceStore for FakeStore {
    async fn save(&self, name: &EvidenceName<'_>, _image: &CapturedImage) -> anyhow::Result<PathBuf> {
        if self.fail {
            anyhow::bail!("disk full");
        }
        self.saved.lock().await.push((
            name.event_id.to_string(),
            name.item.to_string(),
            name.user.to_string(),
        ));
        Ok(PathBuf::from(format!("{}/{}.png", name.event_id, name.item)))
    }
}

#[derive(Default)]
pub struct FakeHost {
    fail: bool,
    pub uploads: AtomicUsize,
}

impl FakeHost {
    pub const URL: &'static str = "https://i.example.test/abc.png";

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ImageHost for FakeHost {
    async fn upload(&self, _token: &str, _image: &CapturedImage) -> anyhow::Result<String> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("upload rejected");
        }
        Ok(Self::URL.to_string())
    }
}

#[derive(Default)]
pub struct MemoryConfigStore {
    values: std::sync::Mutex<HashMap<String, String>>,
}

impl MemoryConfigStore {
    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get_string(&self, key: &str) -> Option<String> {
        self.values().get(key).cloned()
    }

    async fn set_string(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_bool(&self, key: &str) -> Option<bool> {
        self.values().get(key).and_then(|value| value.parse().ok())
    }

    async fn set_bool(&self, key: &str, value: bool) -> anyhow::Result<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.values().remove(key);
        Ok(())
    }
}

pub fn bingo_event(bingo_id: &str) -> BingoEvent {
    BingoEvent {
        bingo_id: bingo_id.to_string(),
        name: format!("Bingo {}", bingo_id),
        group_id: "g-1".to_string(),
        duration_days: 7,
        days_remaining: 3,
        total_tiles: 25,
        is_active: true,
        prize_pool: "100M".to_string(),
        participants: 12,
    }
}

/// Builds an `AppState` around `sync`; must run inside a tokio runtime.
pub fn test_state(config: RuntimeConfig, sync: Arc<FakeSync>) -> AppState {
    let evidence = EvidencePipeline::new(
        Arc::new(FakeCapture::default()),
        Arc::new(FakeStore::default()),
        Arc::new(FakeHost::default()),
    );
    AppState {
        deduplicator: Arc::new(Deduplicator::new(
            config.dedup_window_millis(),
            config.dedup_max_entries,
        )),
        workers: WorkerPool::spawn(config.worker_count, config.queue_capacity),
        config,
        sync_api: sync,
        session: Arc::new(Session::new()),
        config_store: Arc::new(MemoryConfigStore::default()),
        classifier: Arc::new(Classifier::default()),
        evidence: Arc::new(evidence),
        scheduler: Arc::new(LivenessScheduler::new()),
        participation: Arc::new(RwLock::new(ParticipationStatus::default())),
        metrics: Arc::new(Metrics::default()),
    }
}
