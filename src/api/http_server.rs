// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    routing::{any, get},
    Router,
};
use std::path::Path;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use super::generate_image::generate_image_handler;
use super::handlers::health_handler;
use crate::config::ServerConfig;
use crate::upstream::GeminiClient;

/// Path of the image generation proxy
pub const GENERATE_ROUTE: &str = "/api/generate";

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub gemini: GeminiClient,
    /// Upper bound on the inbound generate body
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(gemini: GeminiClient, max_body_bytes: usize) -> Self {
        Self {
            gemini,
            max_body_bytes,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let gemini = GeminiClient::new(&config.upstream_url, config.upstream_timeout)?;
        Ok(Self::new(gemini, config.max_body_bytes))
    }
}

/// Build the router: health, the generate proxy, and the static front-end as fallback.
pub fn create_app(state: AppState, static_root: &Path) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        // Method filtering happens inside the handler so that it can answer with JSON.
        .route(GENERATE_ROUTE, any(generate_image_handler))
        .fallback_service(ServeDir::new(static_root))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: ServerConfig) -> Result<()> {
    if !config.static_root.is_dir() {
        warn!(
            "Static root {} is not a directory; only the API routes will respond",
            config.static_root.display()
        );
    }

    let state = AppState::from_config(&config)?;
    let app = create_app(state, &config.static_root);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let local_addr = listener.local_addr()?;

    info!("Dev server listening on http://{}", local_addr);
    info!("Serving static files from {}", config.static_root.display());
    info!("Image generation proxy at POST {}", GENERATE_ROUTE);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Dev server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
