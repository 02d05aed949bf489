use tracing::info;

use companion_domain::ParticipationStatus;

use crate::{AppError, AppState};

pub async fn set_participating(
    state: &AppState,
    participating: bool,
    event_id: Option<String>,
) -> Result<ParticipationStatus, AppError> {
    if !participating {
        state.scheduler.stop_all();
        let mut status = state.participation.write().await;
        status.clear_selection();
        info!("participation stopped");
        return Ok(status.clone());
    }

    if !state.session.is_authenticated() {
        return Err(AppError::Unauthorized);
    }
    let event_id = event_id
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::BadRequest("eventId is required to participate".to_string()))?;

    let snapshot = {
        let mut status = state.participation.write().await;
        if !status.events.is_empty() && !status.events.iter().any(|event| event.bingo_id == event_id) {
            return Err(AppError::Precondition(format!(
                "event '{}' is not an active event",
                event_id
            )));
        }
        if status.event_id.as_deref() != Some(event_id.as_str()) {
            status.activity_log.clear();
        }
        status.participating = true;
        status.event_id = Some(event_id.clone());
        status.clone()
    };
    info!(event_id = %event_id, "participation started");

    let token_state = state.clone();
    tokio::spawn(async move {
        token_state
            .evidence
            .prime_token(token_state.sync_api.as_ref())
            .await;
    });
    state.scheduler.start_heartbeat(state.clone());
    state.scheduler.start_refresh(state.clone());

    Ok(snapshot)
}
