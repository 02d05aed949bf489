use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use companion_application::commands::session_commands;
use companion_application::queries::status_queries;
use companion_application::AppState;
use companion_domain::SessionSnapshot;

use crate::error::HttpError;
use crate::middleware::{authorize, authorize_token};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub rsn: String,
    pub secret: String,
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub token: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionSnapshot>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let snapshot = session_commands::login(&state, payload.rsn, payload.secret).await?;
    Ok(Json(snapshot))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionSnapshot>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(session_commands::logout(&state).await))
}

pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionSnapshot>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(status_queries::get_session_snapshot(&state)))
}

/// Websocket feed of session events. Browsers cannot set headers on an
/// upgrade request, so the api token may also arrive as `?token=`.
pub async fn session_stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StreamQuery>,
) -> Response {
    if !authorize(&state.config, &headers) && !authorize_token(&state.config, query.token.as_deref()) {
        return HttpError::Unauthorized.into_response();
    }
    ws.on_upgrade(move |socket| stream_session_events(socket, state))
}

async fn stream_session_events(socket: WebSocket, state: AppState) {
    let mut events = state.session.subscribe();
    let (mut sender, mut receiver) = socket.split();
    info!("session stream client connected");

    let mut send_task = tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "session stream lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(err) => {
                    warn!("failed to encode session event: {}", err);
                    continue;
                }
            };
            if sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    debug!("session stream client disconnected");
}
