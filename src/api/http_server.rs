// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::health_handler;
use super::object_count::object_count_handler;
use crate::domain::CountActions;

#[derive(Clone)]
pub struct AppState {
    pub count_actions: Arc<CountActions>,
}

impl AppState {
    pub fn new(count_actions: CountActions) -> Self {
        Self {
            count_actions: Arc::new(count_actions),
        }
    }
}

/// Build the router; request bodies over `max_content_length` are rejected
pub fn create_app(state: AppState, max_content_length: usize) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Object counting endpoint
        .route("/v1/object-count", post(object_count_handler))
        .layer(DefaultBodyLimit::max(max_content_length))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(
    state: AppState,
    listen_addr: &str,
    max_content_length: usize,
) -> std::io::Result<()> {
    let app = create_app(state, max_content_length);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    tracing::info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
