use companion_domain::{ParticipationStatus, SessionSnapshot};

use crate::AppState;

pub async fn get_participation_status(state: &AppState) -> ParticipationStatus {
    state.participation.read().await.clone()
}

pub fn get_session_snapshot(state: &AppState) -> SessionSnapshot {
    state.session.snapshot()
}
