use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use companion_domain::{AuthError, Credential, SessionSnapshot};

use crate::queries::event_queries;
use crate::{AppError, AppState, SessionEvent};

pub const KEY_RSN: &str = "rsn";
pub const KEY_JWT: &str = "jwt";
pub const KEY_TEAM_ID: &str = "team_id";
pub const KEY_AUTHENTICATED: &str = "authenticated";

pub async fn login(state: &AppState, rsn: String, secret: String) -> Result<SessionSnapshot, AppError> {
    let rsn = normalize_required_text(rsn, "rsn")?;
    let secret = normalize_required_text(secret, "secret")?;

    let credential = state
        .sync_api
        .authenticate(&rsn, &secret)
        .await
        .map_err(|err| match err {
            AuthError::Rejected(reason) => AppError::BadRequest(format!("login failed: {}", reason)),
            AuthError::Unavailable(reason) => AppError::Unavailable(reason),
        })?;

    if state.session.is_authenticated() {
        state.scheduler.stop_all();
        state.participation.write().await.clear_selection();
    }
    state.evidence.reset_token().await;
    state.session.establish(credential.clone());
    if !credential.has_team() {
        warn!(rsn = %credential.rsn, "logged in without a team id, activities will not be reported");
    }
    if let Err(err) = persist_credential(state, &credential).await {
        warn!(?err, "failed to persist credential");
    }

    let refresh_state = state.clone();
    tokio::spawn(async move {
        event_queries::refresh_active_events(&refresh_state).await;
    });

    Ok(state.session.snapshot())
}

pub async fn logout(state: &AppState) -> SessionSnapshot {
    if state.session.logout() {
        teardown(state).await;
    }
    state.session.snapshot()
}

/// Re-establishes the session saved by a previous run, if any.
pub async fn restore_session(state: &AppState) -> bool {
    let store = &state.config_store;
    if store.get_bool(KEY_AUTHENTICATED).await != Some(true) {
        return false;
    }
    let rsn = store.get_string(KEY_RSN).await.filter(|value| !value.trim().is_empty());
    let jwt = store.get_string(KEY_JWT).await.filter(|value| !value.trim().is_empty());
    let (Some(rsn), Some(jwt)) = (rsn, jwt) else {
        warn!("stored session is incomplete, ignoring it");
        return false;
    };
    let team_id = store.get_string(KEY_TEAM_ID).await.unwrap_or_default();
    state.session.establish(Credential::new(rsn, jwt, team_id));
    info!("restored previous session");
    true
}

/// Reacts to credential expiry reported by the sync client.
pub fn spawn_session_watcher(state: AppState) -> JoinHandle<()> {
    let mut events = state.session.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::Expired) => {
                    state.metrics.record_session_expired();
                    if state.session.is_authenticated() {
                        continue;
                    }
                    teardown(&state).await;
                    warn!("session expired, participation stopped; log in again");
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "session watcher lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn teardown(state: &AppState) {
    state.scheduler.stop_all();
    state.participation.write().await.clear_selection();
    state.evidence.reset_token().await;
    if let Err(err) = clear_persisted_credential(state).await {
        warn!(?err, "failed to clear persisted credential");
    }
}

async fn persist_credential(state: &AppState, credential: &Credential) -> anyhow::Result<()> {
    let store = &state.config_store;
    store.set_string(KEY_RSN, &credential.rsn).await?;
    store.set_string(KEY_JWT, &credential.jwt).await?;
    store.set_string(KEY_TEAM_ID, &credential.team_id).await?;
    store.set_bool(KEY_AUTHENTICATED, true).await?;
    Ok(())
}

async fn clear_persisted_credential(state: &AppState) -> anyhow::Result<()> {
    state.config_store.remove(KEY_JWT).await?;
    state.config_store.set_bool(KEY_AUTHENTICATED, false).await?;
    Ok(())
}

fn normalize_required_text(value: String, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}
