// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Unix time in seconds
    pub timestamp: f64,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        let now = chrono::Utc::now();
        Self {
            status: "healthy".to_string(),
            timestamp: now.timestamp_micros() as f64 / 1_000_000.0,
        }
    }
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
