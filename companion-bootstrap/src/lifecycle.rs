use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use companion_application::commands::{activity_commands, session_commands};
use companion_application::AppState;
use companion_interfaces_http::build_router;

use crate::context::AppContext;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

fn build_router_with_layers(state: AppState) -> Router {
    build_router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_seconds.saturating_mul(2),
        )))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_standalone(context: AppContext) -> Result<()> {
    let state = context.state;

    let watcher = session_commands::spawn_session_watcher(state.clone());
    let sweeper = activity_commands::spawn_dedup_sweeper(state.clone());
    if session_commands::restore_session(&state).await {
        info!("restored persisted session");
    }

    let app = build_router_with_layers(state.clone());
    let addr: std::net::SocketAddr = state.config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    state.scheduler.stop_all();
    watcher.abort();
    sweeper.abort();
    info!("companion stopped");
    served?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
