use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::entities::{ActiveEvents, ActivityLogEntry, ActivityRecord, Credential, SignupStatus};

/// Why a login attempt failed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The service answered and refused the credentials.
    #[error("login rejected: {0}")]
    Rejected(String),
    #[error("login service unavailable: {0}")]
    Unavailable(String),
}

/// Remote competition service.
///
/// Read operations fold every failure (network, non-2xx, unusable body) into
/// `None`/`false`; the implementation logs the cause. Only `authenticate`
/// surfaces the reason, because the caller shows it to the user.
#[async_trait]
pub trait SyncApi: Send + Sync {
    async fn authenticate(&self, rsn: &str, secret: &str) -> Result<Credential, AuthError>;
    async fn fetch_board(&self, rsn: &str) -> Option<Value>;
    async fn fetch_team(&self, team_id: &str) -> Option<Value>;
    async fn fetch_active_events(&self) -> Option<ActiveEvents>;
    async fn fetch_activity_log(&self, event_id: &str) -> Option<Vec<ActivityLogEntry>>;
    async fn submit_activity(&self, event_id: &str, rsn: &str, record: &ActivityRecord) -> bool;
    async fn send_heartbeat(&self, rsn: &str) -> bool;
    async fn get_signup_status(&self, event_id: &str, rsn: &str) -> SignupStatus;
    async fn get_image_host_token(&self) -> Option<String>;
}
