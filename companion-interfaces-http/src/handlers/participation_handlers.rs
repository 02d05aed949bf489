use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use companion_application::commands::participation_commands;
use companion_application::queries::status_queries;
use companion_application::AppState;
use companion_domain::ParticipationStatus;

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationRequest {
    pub participating: bool,
    #[serde(default)]
    pub event_id: Option<String>,
}

pub async fn get_participation(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ParticipationStatus>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(status_queries::get_participation_status(&state).await))
}

pub async fn update_participation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ParticipationRequest>,
) -> Result<Json<ParticipationStatus>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let status =
        participation_commands::set_participating(&state, payload.participating, payload.event_id)
            .await?;
    Ok(Json(status))
}
