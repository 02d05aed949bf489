use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use companion_domain::RuntimeConfig;

pub const CONFIG_PATH_ENV: &str = "BINGO_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./companion.toml";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub api_base_url: String,
    pub image_host_url: String,
    pub request_timeout_seconds: u64,
    pub response_excerpt_chars: usize,
    pub heartbeat_interval_seconds: u64,
    pub heartbeat_min_ratio: f64,
    pub refresh_interval_seconds: u64,
    pub loop_jitter_millis: u64,
    pub dedup_window_seconds: u64,
    pub dedup_bucket_seconds: u64,
    pub dedup_max_entries: usize,
    pub worker_count: usize,
    pub queue_capacity: usize,
    pub screenshot_dir: String,
    pub capture_command: Vec<String>,
    pub ruleset_path: String,
    pub store_path: String,
    pub activity_log_limit: u32,
    pub log_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            api_token: None,
            api_base_url: runtime.api_base_url,
            image_host_url: runtime.image_host_url,
            request_timeout_seconds: runtime.request_timeout_seconds,
            response_excerpt_chars: runtime.response_excerpt_chars,
            heartbeat_interval_seconds: runtime.heartbeat_interval_seconds,
            heartbeat_min_ratio: runtime.heartbeat_min_ratio,
            refresh_interval_seconds: runtime.refresh_interval_seconds,
            loop_jitter_millis: runtime.loop_jitter_millis,
            dedup_window_seconds: runtime.dedup_window_seconds,
            dedup_bucket_seconds: runtime.dedup_bucket_seconds,
            dedup_max_entries: runtime.dedup_max_entries,
            worker_count: runtime.worker_count,
            queue_capacity: runtime.queue_capacity,
            screenshot_dir: runtime.screenshot_dir.to_string_lossy().to_string(),
            capture_command: Vec::new(),
            ruleset_path: runtime.ruleset_path,
            store_path: runtime.store_path,
            activity_log_limit: runtime.activity_log_limit,
            log_dir: None,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path)).await
    }

    pub async fn load_from(file_path: &Path) -> Result<Self> {
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)
                .map_err(|err| anyhow!("invalid config {}: {}", file_path.display(), err))?
        } else {
            warn!(path = %file_path.display(), "config file not found, using defaults");
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.api_token = normalize_optional(self.api_token.take());
        self.log_dir = normalize_optional(self.log_dir.take());
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        self.image_host_url = self.image_host_url.trim().to_string();
        self.capture_command = std::mem::take(&mut self.capture_command)
            .into_iter()
            .map(|arg| arg.trim().to_string())
            .filter(|arg| !arg.is_empty())
            .collect();
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.screenshot_dir = resolve_path(base, &self.screenshot_dir);
        self.ruleset_path = resolve_path(base, &self.ruleset_path);
        self.store_path = resolve_path(base, &self.store_path);
        if let Some(log_dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, log_dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.api_base_url.is_empty() {
            return Err(anyhow!("api_base_url must not be empty"));
        }
        if self.image_host_url.is_empty() {
            return Err(anyhow!("image_host_url must not be empty"));
        }
        if self.heartbeat_interval_seconds == 0 || self.refresh_interval_seconds == 0 {
            return Err(anyhow!("heartbeat and refresh intervals must be greater than 0"));
        }
        if !(self.heartbeat_min_ratio > 0.0 && self.heartbeat_min_ratio <= 1.0) {
            return Err(anyhow!("heartbeat_min_ratio must be in (0, 1]"));
        }
        if self.dedup_window_seconds == 0 || self.dedup_bucket_seconds == 0 {
            return Err(anyhow!("dedup window and bucket must be greater than 0"));
        }
        if self.worker_count == 0 || self.queue_capacity == 0 {
            return Err(anyhow!("worker_count and queue_capacity must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            api_base_url: self.api_base_url.clone(),
            image_host_url: self.image_host_url.clone(),
            request_timeout_seconds: self.request_timeout_seconds,
            response_excerpt_chars: self.response_excerpt_chars,
            heartbeat_interval_seconds: self.heartbeat_interval_seconds,
            heartbeat_min_ratio: self.heartbeat_min_ratio,
            refresh_interval_seconds: self.refresh_interval_seconds,
            loop_jitter_millis: self.loop_jitter_millis,
            dedup_window_seconds: self.dedup_window_seconds,
            dedup_bucket_seconds: self.dedup_bucket_seconds,
            dedup_max_entries: self.dedup_max_entries,
            worker_count: self.worker_count,
            queue_capacity: self.queue_capacity,
            screenshot_dir: PathBuf::from(&self.screenshot_dir),
            capture_command: if self.capture_command.is_empty() {
                None
            } else {
                Some(self.capture_command.clone())
            },
            ruleset_path: self.ruleset_path.clone(),
            store_path: self.store_path.clone(),
            activity_log_limit: self.activity_log_limit,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("BINGO_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("BINGO_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("BINGO_API_BASE_URL") {
            self.api_base_url = value;
        }
        if let Ok(value) = env::var("BINGO_IMAGE_HOST_URL") {
            self.image_host_url = value;
        }
        if let Ok(value) = env::var("BINGO_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("BINGO_HEARTBEAT_INTERVAL_SECONDS") {
            self.heartbeat_interval_seconds =
                value.parse().unwrap_or(self.heartbeat_interval_seconds);
        }
        if let Ok(value) = env::var("BINGO_REFRESH_INTERVAL_SECONDS") {
            self.refresh_interval_seconds = value.parse().unwrap_or(self.refresh_interval_seconds);
        }
        if let Ok(value) = env::var("BINGO_WORKER_COUNT") {
            self.worker_count = value.parse().unwrap_or(self.worker_count);
        }
        if let Ok(value) = env::var("BINGO_QUEUE_CAPACITY") {
            self.queue_capacity = value.parse().unwrap_or(self.queue_capacity);
        }
        if let Ok(value) = env::var("BINGO_SCREENSHOT_DIR") {
            self.screenshot_dir = value;
        }
        if let Ok(value) = env::var("BINGO_CAPTURE_COMMAND") {
            self.capture_command = value.split_whitespace().map(ToString::to_string).collect();
        }
        if let Ok(value) = env::var("BINGO_RULESET_PATH") {
            self.ruleset_path = value;
        }
        if let Ok(value) = env::var("BINGO_STORE_PATH") {
            self.store_path = value;
        }
        if let Ok(value) = env::var("BINGO_LOG_DIR") {
            self.log_dir = Some(value);
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
