//! GridPulse server binary: telemetry feeds plus the live WebSocket
//! endpoint.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use gridpulse::adapters::websocket::{ws_router, Hub, WsState};
use gridpulse::application::{EventRouter, Simulator};
use gridpulse::config::AppConfig;
use gridpulse::domain::alarm::AlarmLedger;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("fatal: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.server.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let hub = Arc::new(Hub::new(config.telemetry.broadcast_capacity));
    let router = Arc::new(EventRouter::new(AlarmLedger::new(
        config.telemetry.ledger_capacity,
    )));

    Simulator::new(Arc::clone(&router), hub.sender(), config.telemetry.clone()).spawn();

    let app = Router::new()
        .merge(ws_router())
        .with_state(WsState::new(Arc::clone(&hub), router))
        .layer(cors_layer(&config)?)
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, environment = ?config.server.environment, "starting gridpulse server");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Permissive CORS when no origins are configured, an explicit allowlist
/// otherwise.
fn cors_layer(config: &AppConfig) -> Result<CorsLayer, Box<dyn std::error::Error>> {
    let origins = config.server.cors_origins_list();
    if origins.is_empty() {
        return Ok(CorsLayer::new().allow_origin(Any).allow_methods(Any));
    }
    let parsed: Result<Vec<HeaderValue>, _> =
        origins.iter().map(|origin| origin.parse()).collect();
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed?))
        .allow_methods(Any))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => { term.recv().await; }
            Err(error) => {
                tracing::error!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = signal::ctrl_c() => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
