// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server wiring for the damage API

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::batch::analyze_batch_handler;
use super::detect::detect_handler;
use super::errors::ApiError;
use super::health::{health_handler, model_info_handler};
use crate::config::ServiceConfig;
use crate::damage::DamageAnalyzer;

/// Shared state for all damage endpoints
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<DamageAnalyzer>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(analyzer: DamageAnalyzer, config: ServiceConfig) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            config: Arc::new(config),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_request_bytes();

    Router::new()
        .route("/api/damage/health", get(health_handler))
        .route("/api/damage/model-info", get(model_info_handler))
        .route("/api/damage/detect", post(detect_handler))
        .route("/api/damage/analyze-batch", post(analyze_batch_handler))
        .fallback(|| async { ApiError::NotFound("No such endpoint".to_string()) })
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM
pub async fn start_server(state: AppState) -> Result<()> {
    let addr = state.config.listen_addr.clone();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🚀 Damage API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down gracefully..."),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully..."),
    }
}
