use axum::routing::{get, post};
use axum::Router;

use companion_application::AppState;

use crate::handlers::{
    event_handlers, ingest_handlers, ops_handlers, participation_handlers, session_handlers,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/game/events", post(ingest_handlers::ingest_game_events))
        .route("/v1/session", get(session_handlers::get_session))
        .route("/v1/session/login", post(session_handlers::login))
        .route("/v1/session/logout", post(session_handlers::logout))
        .route("/v1/session/stream", get(session_handlers::session_stream))
        .route(
            "/v1/participation",
            get(participation_handlers::get_participation)
                .put(participation_handlers::update_participation),
        )
        .route("/v1/events/refresh", post(event_handlers::refresh_events))
        .route("/v1/events/:id/signup", get(event_handlers::get_signup_status))
        .route("/v1/events/:id/activity", get(event_handlers::get_activity_log))
        .route("/v1/board", get(event_handlers::get_board))
        .route("/v1/team", get(event_handlers::get_team))
        .route("/v1/heartbeat", post(event_handlers::trigger_heartbeat))
        .route("/v1/ops/health/live", get(ops_handlers::health_live))
        .route(
            "/v1/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
