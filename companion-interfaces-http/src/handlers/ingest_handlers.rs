use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use tracing::{debug, error};

use companion_application::commands::activity_commands::{self, DispatchSummary};
use companion_application::AppState;
use companion_domain::current_millis;

use crate::error::HttpError;
use crate::middleware::{authorize, parse_game_events};

pub async fn ingest_game_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<DispatchSummary>), HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }

    let events = parse_game_events(&headers, &body, current_millis()).map_err(|err| {
        error!("failed to parse game events body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;
    let original_len = events.len();
    let events = events
        .into_iter()
        .filter(|event| !event.subject_name.trim().is_empty())
        .collect::<Vec<_>>();
    if events.len() != original_len {
        debug!("dropped {} events without a subject", original_len - events.len());
    }

    let summary = activity_commands::handle_game_events(&state, events).await;
    Ok((StatusCode::ACCEPTED, Json(summary)))
}
