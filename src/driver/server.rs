//! HTTP Server
//!
//! ルーター構築とサーバー起動（グレースフルシャットダウン付き）

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use log::{error, info};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};

use crate::adapter::config::{Config, ServerConfig};
use crate::adapter::repositories::in_memory_session_repository::InMemorySessionRepository;

use super::handlers;
use super::state::AppState;
use super::sweeper::spawn_sweeper;

/// ルーターを構築する
///
/// # Errors
///
/// `allowed_origins` に不正なオリジンが含まれる場合にエラーを返す
pub fn build_router(state: AppState, server: &ServerConfig) -> Result<Router> {
    Ok(Router::new()
        .route("/api/upload", post(handlers::upload))
        .route("/api/download/{session_id}", get(handlers::download))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(cors_layer(&server.allowed_origins)?)
        .with_state(state))
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    if allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any))
}

/// サーバーを起動し、Ctrl+C で停止するまで待つ
///
/// セッションストアとスイーパーはここで生成され、停止時にスイーパーも終了する
pub async fn serve(config: Config) -> Result<()> {
    let sessions = Arc::new(InMemorySessionRepository::new(
        config.session.ttl(),
        config.session.max_sessions,
    ));
    let state = AppState::new(&config, Arc::clone(&sessions));
    let app = build_router(state, &config.server)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = spawn_sweeper(sessions, config.session.sweep_interval(), shutdown_rx);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("Listening on {}", listener.local_addr()?);
    info!(
        "Sessions: ttl {}s, capacity {}",
        config.session.ttl_secs, config.session.max_sessions
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper.await {
        error!("Session sweeper failed: {}", e);
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
