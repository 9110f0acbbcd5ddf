// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use object_counter::{
    api::{start_server, AppState},
    config::{build_count_actions, CounterConfig},
};
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = CounterConfig::parse();
    info!(
        "Starting object counter v{} (env={}, repo={})",
        env!("CARGO_PKG_VERSION"),
        config.env,
        config.repo_kind()
    );

    let count_actions = build_count_actions(&config)
        .await
        .context("Failed to wire count actions")?;
    info!("Serving models: {:?}", count_actions.models());

    start_server(
        AppState::new(count_actions),
        &config.listen_addr,
        config.max_content_length,
    )
    .await
    .with_context(|| format!("HTTP server on {} failed", config.listen_addr))?;

    Ok(())
}
