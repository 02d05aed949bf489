use serde_json::Value;
use tracing::{info, warn};

use companion_domain::{current_epoch_seconds, ActivityLogEntry, Connectivity, Credential, SignupStatus};

use crate::{AppError, AppState};

/// Re-reads the active events and, when one is selected, its activity log.
///
/// Returns whether participation is still on afterwards. A selected event
/// that disappeared from the list ends participation, unless the selection
/// changed while the fetch was in flight. The periodic loop only runs while
/// participating; login triggers a single refresh so the event list is
/// populated before an event is picked.
pub async fn refresh_active_events(state: &AppState) -> bool {
    let selected = {
        let status = state.participation.read().await;
        status.active_event_id().map(str::to_string)
    };

    let Some(active) = state.sync_api.fetch_active_events().await else {
        let mut status = state.participation.write().await;
        status.connectivity = Connectivity::Degraded;
        warn!("active events refresh failed, keeping previous list");
        return status.participating;
    };

    let mut activity_log = None;
    let mut vanished = false;
    if let Some(event_id) = selected.as_deref() {
        if active.find(event_id).is_some() {
            activity_log = state.sync_api.fetch_activity_log(event_id).await;
        } else {
            vanished = true;
        }
    }

    let mut status = state.participation.write().await;
    status.events = active.events;
    status.last_refresh_at = Some(current_epoch_seconds());
    status.connectivity = Connectivity::Online;

    let still_selected = selected.is_some() && status.active_event_id() == selected.as_deref();
    if !still_selected {
        return status.participating;
    }

    if vanished {
        info!(event_id = ?selected, "selected event is no longer active, leaving it");
        status.clear_selection();
        state.scheduler.stop_heartbeat();
        return false;
    }

    match activity_log {
        Some(entries) => status.activity_log = entries,
        None => {
            status.connectivity = Connectivity::Degraded;
            warn!(event_id = ?selected, "activity log refresh failed");
        }
    }
    status.participating
}

pub async fn get_signup_status(state: &AppState, event_id: &str) -> Result<SignupStatus, AppError> {
    let credential = require_credential(state)?;
    let event_id = require_event_id(event_id)?;
    Ok(state
        .sync_api
        .get_signup_status(event_id, &credential.rsn)
        .await)
}

pub async fn fetch_activity_log(
    state: &AppState,
    event_id: &str,
) -> Result<Vec<ActivityLogEntry>, AppError> {
    require_credential(state)?;
    let event_id = require_event_id(event_id)?;
    state
        .sync_api
        .fetch_activity_log(event_id)
        .await
        .ok_or_else(|| AppError::Unavailable(format!("activity log for event '{}'", event_id)))
}

pub async fn fetch_board(state: &AppState) -> Result<Value, AppError> {
    let credential = require_credential(state)?;
    state
        .sync_api
        .fetch_board(&credential.rsn)
        .await
        .ok_or_else(|| AppError::Unavailable("board".to_string()))
}

pub async fn fetch_team(state: &AppState) -> Result<Value, AppError> {
    let credential = require_credential(state)?;
    if !credential.has_team() {
        return Err(AppError::Precondition("account has no team".to_string()));
    }
    state
        .sync_api
        .fetch_team(&credential.team_id)
        .await
        .ok_or_else(|| AppError::Unavailable("team".to_string()))
}

fn require_credential(state: &AppState) -> Result<Credential, AppError> {
    state.session.current().ok_or(AppError::Unauthorized)
}

fn require_event_id(event_id: &str) -> Result<&str, AppError> {
    let trimmed = event_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("event id must not be empty".to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use companion_domain::{ActiveEvents, Credential, RuntimeConfig};

    use super::*;
    use crate::testing::{bingo_event, test_state, FakeSync};

    async fn participating_in(state: &AppState, event_id: &str) {
        let mut status = state.participation.write().await;
        status.participating = true;
        status.event_id = Some(event_id.to_string());
    }

    #[tokio::test]
    async fn refresh_keeps_selection_and_loads_log() {
        let sync = Arc::new(FakeSync::default());
        sync.set_active_events(Some(ActiveEvents::from_events(vec![bingo_event("evt-1")])));
        let state = test_state(RuntimeConfig::default(), sync.clone());
        participating_in(&state, "evt-1").await;

        assert!(refresh_active_events(&state).await);

        let status = state.participation.read().await;
        assert_eq!(status.events.len(), 1);
        assert_eq!(status.activity_log.len(), 1);
        assert_eq!(status.connectivity, Connectivity::Online);
        assert!(status.last_refresh_at.is_some());
    }

    #[tokio::test]
    async fn vanished_event_ends_participation() {
        let sync = Arc::new(FakeSync::default());
        sync.set_active_events(Some(ActiveEvents::from_events(vec![bingo_event("evt-2")])));
        let state = test_state(RuntimeConfig::default(), sync);
        participating_in(&state, "evt-1").await;

        assert!(!refresh_active_events(&state).await);

        let status = state.participation.read().await;
        assert!(!status.participating);
        assert_eq!(status.event_id, None);
        assert_eq!(status.events[0].bingo_id, "evt-2");
    }

    #[tokio::test]
    async fn selection_switched_mid_refresh_survives() {
        let sync = Arc::new(FakeSync::default());
        sync.set_active_events(Some(ActiveEvents::from_events(vec![bingo_event("evt-2")])));
        let gate = sync.gate_active_events();
        let state = test_state(RuntimeConfig::default(), sync);
        participating_in(&state, "evt-1").await;

        let refresh = tokio::spawn({
            let state = state.clone();
            async move { refresh_active_events(&state).await }
        });
        gate.entered.notified().await;
        participating_in(&state, "evt-2").await;
        state.scheduler.start_heartbeat(state.clone());
        gate.release.notify_one();

        assert!(refresh.await.expect("join"));
        let status = state.participation.read().await;
        assert_eq!(status.active_event_id(), Some("evt-2"));
        drop(status);
        assert!(state.scheduler.heartbeat_running());
        state.scheduler.stop_all();
    }

    #[tokio::test]
    async fn failed_refresh_degrades_but_keeps_list() {
        let sync = Arc::new(FakeSync::default());
        let state = test_state(RuntimeConfig::default(), sync);
        {
            let mut status = state.participation.write().await;
            status.events = vec![bingo_event("evt-1")];
        }

        assert!(!refresh_active_events(&state).await);

        let status = state.participation.read().await;
        assert_eq!(status.connectivity, Connectivity::Degraded);
        assert_eq!(status.events.len(), 1);
    }

    #[tokio::test]
    async fn team_query_requires_team() {
        let state = test_state(RuntimeConfig::default(), Arc::new(FakeSync::default()));
        assert!(matches!(fetch_team(&state).await, Err(AppError::Unauthorized)));
        state.session.establish(Credential::new("Zezima", "jwt", ""));
        assert!(matches!(fetch_team(&state).await, Err(AppError::Precondition(_))));
    }

    #[tokio::test]
    async fn signup_rejects_blank_event() {
        let state = test_state(RuntimeConfig::default(), Arc::new(FakeSync::default()));
        state.session.establish(Credential::new("Zezima", "jwt", "7"));
        assert!(matches!(
            get_signup_status(&state, "  ").await,
            Err(AppError::BadRequest(_))
        ));
        let status = get_signup_status(&state, "evt-1").await.expect("status");
        assert!(status.signed_up);
    }
}
