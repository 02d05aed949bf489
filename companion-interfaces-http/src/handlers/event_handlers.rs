use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use companion_application::queries::{event_queries, status_queries};
use companion_application::{AppState, HeartbeatOutcome};
use companion_domain::{ActivityLogEntry, ParticipationStatus, SignupStatus};

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(Serialize)]
pub struct HeartbeatResponse {
    outcome: HeartbeatOutcome,
}

#[derive(Serialize)]
pub struct SignupResponse {
    #[serde(flatten)]
    status: SignupStatus,
    label: &'static str,
}

/// Activity log row with its local-time rendering for the overlay.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogView {
    #[serde(flatten)]
    entry: ActivityLogEntry,
    display_time: String,
}

impl From<ActivityLogEntry> for ActivityLogView {
    fn from(entry: ActivityLogEntry) -> Self {
        let display_time = entry.display_time();
        Self {
            entry,
            display_time,
        }
    }
}

pub async fn refresh_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ParticipationStatus>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    event_queries::refresh_active_events(&state).await;
    Ok(Json(status_queries::get_participation_status(&state).await))
}

pub async fn get_signup_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
) -> Result<Json<SignupResponse>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let status = event_queries::get_signup_status(&state, &event_id).await?;
    let label = status.label();
    Ok(Json(SignupResponse { status, label }))
}

pub async fn get_activity_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
) -> Result<Json<Vec<ActivityLogView>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let entries = event_queries::fetch_activity_log(&state, &event_id).await?;
    Ok(Json(entries.into_iter().map(ActivityLogView::from).collect()))
}

pub async fn get_board(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(event_queries::fetch_board(&state).await?))
}

pub async fn get_team(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(event_queries::fetch_team(&state).await?))
}

pub async fn trigger_heartbeat(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<HeartbeatResponse>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let outcome = state.scheduler.try_heartbeat(&state).await;
    if outcome == HeartbeatOutcome::NotAuthenticated {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(HeartbeatResponse { outcome }))
}
