#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use companion_application::{
    AppState, EvidencePipeline, LivenessScheduler, Metrics, Session, WorkerPool,
};
use companion_domain::ports::{
    AuthError, CapturedImage, ConfigStore, EvidenceName, EvidenceStore, ImageHost, ScreenCapture, SyncApi,
};
use companion_domain::services::{Classifier, Deduplicator};
use companion_domain::{
    ActiveEvents, ActivityLogEntry, ActivityRecord, BingoEvent, Credential, ParticipationStatus,
    RuntimeConfig, SignupStatus,
};
use companion_interfaces_http::build_router;

pub const API_TOKEN: &str = "local-token";

/// Remote bingo service double; every call succeeds unless noted.
#[derive(Default)]
pub struct StubSync {
    pub heartbeats: AtomicUsize,
    pub submissions: Mutex<Vec<ActivityRecord>>,
    pub events: Mutex<Option<ActiveEvents>>,
}

impl StubSync {
    pub fn with_events(ids: &[&str]) -> Self {
        let events = ids.iter().map(|id| bingo_event(id)).collect();
        Self {
            events: Mutex::new(Some(ActiveEvents::from_events(events))),
            ..Self::default()
        }
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().map(|list| list.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SyncApi for StubSync {
    async fn authenticate(&self, rsn: &str, secret: &str) -> Result<Credential, AuthError> {
        if secret != "hunter2" {
            return Err(AuthError::Rejected("invalid credentials".to_string()));
        }
        Ok(Credential::new(rsn, format!("jwt-{}", rsn), "7"))
    }

    async fn fetch_board(&self, rsn: &str) -> Option<Value> {
        Some(json!({ "rsn": rsn, "tiles": [] }))
    }

    async fn fetch_team(&self, team_id: &str) -> Option<Value> {
        Some(json!({ "teamId": team_id }))
    }

    async fn fetch_active_events(&self) -> Option<ActiveEvents> {
        self.events.lock().ok().and_then(|events| events.clone())
    }

    async fn fetch_activity_log(&self, _event_id: &str) -> Option<Vec<ActivityLogEntry>> {
        Some(vec![ActivityLogEntry {
            player_rsn: "Zezima".to_string(),
            activity_type: "KILL".to_string(),
            timestamp: 1_700_000_000,
            monster_name: "Zulrah".to_string(),
            drop_name: None,
            total_kc: 12,
            screenshot_url: None,
            team_id: Some("7".to_string()),
        }])
    }

    async fn submit_activity(&self, _event_id: &str, _rsn: &str, record: &ActivityRecord) -> bool {
        if let Ok(mut list) = self.submissions.lock() {
            list.push(record.clone());
        }
        true
    }

    async fn send_heartbeat(&self, _rsn: &str) -> bool {
        self.heartbeats.fetch_add(1, Ordering::SeqCst);
        true
    }

    async fn get_signup_status(&self, event_id: &str, _rsn: &str) -> SignupStatus {
        SignupStatus {
            signed_up: event_id == "b-1",
            accepted: false,
            message: String::new(),
        }
    }

    async fn get_image_host_token(&self) -> Option<String> {
        None
    }
}

struct NoCapture;

#[async_trait]
impl ScreenCapture for NoCapture {
    async fn capture(&self) -> anyhow::Result<CapturedImage> {
        anyhow::bail!("no display in tests")
    }
}

struct NoStore;

#[async_trait]
impl EvidenceStore for NoStore {
    async fn save(&self, _name: &EvidenceName<'_>, _image: &CapturedImage) -> anyhow::Result<PathBuf> {
        anyhow::bail!("not used")
    }
}

struct NoHost;

#[async_trait]
impl ImageHost for NoHost {
    async fn upload(&self, _token: &str, _image: &CapturedImage) -> anyhow::Result<String> {
        anyhow::bail!("not used")
    }
}

#[derive(Default)]
struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get_string(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    async fn set_string(&self, key: &str, value: &str) -> anyhow::Result<()> {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_string(key).await.and_then(|value| value.parse().ok())
    }

    async fn set_bool(&self, key: &str, value: bool) -> anyhow::Result<()> {
        self.set_string(key, &value.to_string()).await
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
        }
        Ok(())
    }
}

pub fn bingo_event(bingo_id: &str) -> BingoEvent {
    BingoEvent {
        bingo_id: bingo_id.to_string(),
        name: format!("Bingo {}", bingo_id),
        group_id: "g-1".to_string(),
        duration_days: 7,
        days_remaining: 2,
        total_tiles: 25,
        is_active: true,
        prize_pool: "50M".to_string(),
        participants: 4,
    }
}

pub fn test_config() -> RuntimeConfig {
    RuntimeConfig {
        api_token: Some(API_TOKEN.to_string()),
        loop_jitter_millis: 0,
        ..RuntimeConfig::default()
    }
}

/// Must be called from within a tokio runtime.
pub fn test_state(sync: Arc<StubSync>) -> AppState {
    let config = test_config();
    AppState {
        deduplicator: Arc::new(Deduplicator::new(
            config.dedup_window_millis(),
            config.dedup_max_entries,
        )),
        workers: WorkerPool::spawn(config.worker_count, config.queue_capacity),
        sync_api: sync,
        session: Arc::new(Session::new()),
        config_store: Arc::new(MemoryStore::default()),
        classifier: Arc::new(Classifier::default()),
        evidence: Arc::new(EvidencePipeline::new(
            Arc::new(NoCapture),
            Arc::new(NoStore),
            Arc::new(NoHost),
        )),
        scheduler: Arc::new(LivenessScheduler::new()),
        participation: Arc::new(RwLock::new(ParticipationStatus::default())),
        metrics: Arc::new(Metrics::default()),
        config,
    }
}

pub fn build_test_app(state: AppState) -> Router {
    build_router(state)
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {}", API_TOKEN));
    let body = match body {
        Some(value) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).expect("request"))
        .await
        .expect("router response")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

pub async fn login(app: Router) -> Value {
    let response = post_json(
        app,
        "/v1/session/login",
        json!({ "rsn": "Zezima", "secret": "hunter2" }),
    )
    .await;
    body_json(response).await
}
