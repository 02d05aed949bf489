use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use companion_application::Session;
use companion_domain::{
    current_epoch_seconds, ActiveEvents, ActivityLogEntry, ActivityRecord, AuthError, Credential,
    RuntimeConfig, SignupStatus, SyncApi,
};

use crate::sync::normalize;

/// How one HTTP exchange ended, before any endpoint-specific parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    Success(Value),
    SoftFailure(&'static str),
    Unauthorized,
    NotFound,
    HttpError(StatusCode),
    NetworkError(String),
}

impl ResponseOutcome {
    /// 2xx bodies that are not JSON but plain text come back as a JSON string.
    pub fn classify(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            return Self::Unauthorized;
        }
        if status == StatusCode::NOT_FOUND {
            return Self::NotFound;
        }
        if !status.is_success() {
            return Self::HttpError(status);
        }
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Self::SoftFailure("empty body");
        }
        if trimmed.starts_with('<') {
            return Self::SoftFailure("html body");
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => Self::Success(value),
            Err(_) => Self::Success(Value::String(trimmed.to_string())),
        }
    }

    fn into_value(self) -> Option<Value> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }
}

pub struct HttpSyncClient {
    client: Client,
    base_url: String,
    session: Arc<Session>,
    excerpt_chars: usize,
    activity_log_limit: u32,
}

impl HttpSyncClient {
    pub fn new(config: &RuntimeConfig, session: Arc<Session>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(1)))
            .build()?;
        Url::parse(&config.api_base_url)
            .map_err(|err| anyhow!("invalid api_base_url {}: {}", config.api_base_url, err))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            session,
            excerpt_chars: config.response_excerpt_chars,
            activity_log_limit: config.activity_log_limit,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Option<Url> {
        let mut url = Url::parse(&self.base_url).ok()?;
        url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
        Some(url)
    }

    /// Builds an authenticated request; `None` when there is no session.
    fn authed(&self, op: &'static str, method: Method, segments: &[&str]) -> Option<(RequestBuilder, String)> {
        let Some(jwt) = self.session.bearer() else {
            warn!(op, "not logged in, skipping request");
            return None;
        };
        let url = self.endpoint(segments)?;
        let request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", jwt))
            .header(CONTENT_TYPE, "application/json");
        Some((request, jwt))
    }

    async fn execute(&self, op: &'static str, request: RequestBuilder, jwt_used: Option<&str>) -> ResponseOutcome {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(op, ?err, "request failed");
                return ResponseOutcome::NetworkError(err.to_string());
            }
        };
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(op, status = %status, ?err, "failed to read response body");
                return ResponseOutcome::NetworkError(err.to_string());
            }
        };

        let outcome = ResponseOutcome::classify(status, &body);
        match &outcome {
            ResponseOutcome::Success(_) => debug!(op, status = %status, "request ok"),
            ResponseOutcome::SoftFailure(reason) => {
                warn!(op, status = %status, reason, "unusable response body")
            }
            ResponseOutcome::Unauthorized => {
                warn!(op, "credential rejected");
                if let Some(jwt) = jwt_used {
                    self.session.expire(jwt);
                }
            }
            ResponseOutcome::NotFound => {
                error!(op, status = %status, base_url = %self.base_url, "endpoint not found, check api_base_url or server deployment")
            }
            ResponseOutcome::HttpError(code) => warn!(
                op,
                status = %code,
                body = %normalize::excerpt(&body, self.excerpt_chars),
                "request rejected"
            ),
            ResponseOutcome::NetworkError(_) => {}
        }
        outcome
    }

    async fn get_json(&self, op: &'static str, segments: &[&str], query: &[(&str, String)]) -> Option<Value> {
        let (request, jwt) = self.authed(op, Method::GET, segments)?;
        let request = if query.is_empty() { request } else { request.query(query) };
        self.execute(op, request, Some(&jwt)).await.into_value()
    }

    async fn post_json(&self, op: &'static str, segments: &[&str], body: &Value) -> bool {
        let Some((request, jwt)) = self.authed(op, Method::POST, segments) else {
            return false;
        };
        matches!(
            self.execute(op, request.json(body), Some(&jwt)).await,
            ResponseOutcome::Success(_)
        )
    }
}

#[async_trait]
impl SyncApi for HttpSyncClient {
    async fn authenticate(&self, rsn: &str, secret: &str) -> Result<Credential, AuthError> {
        let url = self
            .endpoint(&["api", "auth", "login"])
            .ok_or_else(|| AuthError::Unavailable("invalid api_base_url".to_string()))?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(&json!({ "rsn": rsn, "token": secret }));
        match self.execute("login", request, None).await {
            ResponseOutcome::Success(body) => {
                let credential = normalize::credential(rsn, &body).ok_or_else(|| {
                    AuthError::Unavailable("login response carried no token".to_string())
                })?;
                info!(rsn, team_id = %credential.team_id, "authenticated");
                Ok(credential)
            }
            ResponseOutcome::Unauthorized => Err(AuthError::Rejected("invalid rsn or token".to_string())),
            ResponseOutcome::HttpError(status) if status.is_client_error() => Err(AuthError::Rejected(
                format!("login refused with status {}", status),
            )),
            ResponseOutcome::HttpError(status) => Err(AuthError::Unavailable(format!(
                "login failed with status {}",
                status
            ))),
            ResponseOutcome::NotFound => Err(AuthError::Unavailable("login endpoint not found".to_string())),
            ResponseOutcome::SoftFailure(reason) => Err(AuthError::Unavailable(format!(
                "unusable login response: {}",
                reason
            ))),
            ResponseOutcome::NetworkError(err) => Err(AuthError::Unavailable(format!(
                "login request failed: {}",
                err
            ))),
        }
    }

    async fn fetch_board(&self, rsn: &str) -> Option<Value> {
        self.get_json("fetch_board", &["api", "bingo", "board", rsn], &[]).await
    }

    async fn fetch_team(&self, team_id: &str) -> Option<Value> {
        if team_id.trim().is_empty() {
            warn!("no team id, skipping team fetch");
            return None;
        }
        self.get_json("fetch_team", &["api", "bingo", "team", team_id], &[]).await
    }

    async fn fetch_active_events(&self) -> Option<ActiveEvents> {
        let body = self
            .get_json("fetch_active_events", &["api", "bingo", "events", "active"], &[])
            .await?;
        let events = normalize::active_events(&body);
        if events.is_none() {
            warn!("active events response has an unexpected shape");
        }
        events
    }

    async fn fetch_activity_log(&self, event_id: &str) -> Option<Vec<ActivityLogEntry>> {
        let body = self
            .get_json(
                "fetch_activity_log",
                &["api", "bingo", "activity", event_id],
                &[("limit", self.activity_log_limit.to_string())],
            )
            .await?;
        let entries = normalize::activity_log(&body);
        if entries.is_none() {
            warn!(event_id, "activity log response has an unexpected shape");
        }
        entries
    }

    async fn submit_activity(&self, event_id: &str, rsn: &str, record: &ActivityRecord) -> bool {
        if record.team_id().trim().is_empty() {
            warn!(event_id, "no team id, activity not submitted");
            return false;
        }
        let body = match serde_json::to_value(record.to_submission(rsn)) {
            Ok(body) => body,
            Err(err) => {
                error!(?err, "failed to encode activity");
                return false;
            }
        };
        self.post_json("submit_activity", &["api", "bingo", "activity", event_id], &body)
            .await
    }

    async fn send_heartbeat(&self, rsn: &str) -> bool {
        let body = json!({ "rsn": rsn, "timestamp": current_epoch_seconds() });
        self.post_json("heartbeat", &["api", "bingo", "heartbeat"], &body).await
    }

    async fn get_signup_status(&self, event_id: &str, rsn: &str) -> SignupStatus {
        let Some(body) = self
            .get_json(
                "signup_status",
                &["api", "bingo", "signup", "status", event_id],
                &[("rsn", rsn.to_string())],
            )
            .await
        else {
            return SignupStatus::unknown("signup status unavailable");
        };
        normalize::signup_status(&body)
            .unwrap_or_else(|| SignupStatus::unknown("unexpected signup status response"))
    }

    async fn get_image_host_token(&self) -> Option<String> {
        let body = self
            .get_json("image_host_token", &["api", "secrets", "imgur_client_id"], &[])
            .await?;
        normalize::image_host_token(&body)
    }
}
