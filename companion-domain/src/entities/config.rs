// Runtime configuration shared by every layer

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
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
    pub screenshot_dir: PathBuf,
    pub capture_command: Option<Vec<String>>,
    pub ruleset_path: String,
    pub store_path: String,
    pub activity_log_limit: u32,
}

impl RuntimeConfig {
    pub fn heartbeat_interval_millis(&self) -> i64 {
        (self.heartbeat_interval_seconds as i64).saturating_mul(1000)
    }

    /// Minimum spacing between two outbound heartbeats.
    pub fn heartbeat_min_spacing_millis(&self) -> i64 {
        (self.heartbeat_interval_millis() as f64 * self.heartbeat_min_ratio) as i64
    }

    pub fn dedup_window_millis(&self) -> i64 {
        (self.dedup_window_seconds as i64).saturating_mul(1000)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3235".to_string(),
            api_token: None,
            api_base_url: "https://api.clan.bingo".to_string(),
            image_host_url: "https://api.imgur.com/3/image".to_string(),
            request_timeout_seconds: 15,
            response_excerpt_chars: 300,
            heartbeat_interval_seconds: 120,
            heartbeat_min_ratio: 0.8,
            refresh_interval_seconds: 300,
            loop_jitter_millis: 1500,
            dedup_window_seconds: 180,
            dedup_bucket_seconds: 60,
            dedup_max_entries: 4096,
            worker_count: 4,
            queue_capacity: 256,
            screenshot_dir: PathBuf::from("./screenshots"),
            capture_command: None,
            ruleset_path: "./ruleset.yaml".to_string(),
            store_path: "./companion-state.toml".to_string(),
            activity_log_limit: 50,
        }
    }
}
