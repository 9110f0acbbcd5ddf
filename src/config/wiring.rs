// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! One-time construction of the per-model counting actions

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::settings::{CounterConfig, Environment};
use crate::domain::{
    CountActions, CountDetectedObjects, DetectionError, ModelName, ObjectCountRepo, StorageError,
};
use crate::storage::count_repo_strategy;
use crate::vision::debug::DebugRenderer;
use crate::vision::{object_detector_strategy, LabelMapError};

/// Errors raised while wiring the service at start-up
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to set up count repository: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to load label map: {0}")]
    LabelMap(#[from] LabelMapError),

    #[error("Failed to set up object detector: {0}")]
    Detector(#[from] DetectionError),
}

/// Build the repository selected by `config` and one action per allowed model
pub async fn build_count_actions(config: &CounterConfig) -> Result<CountActions, ConfigError> {
    let repo = count_repo_strategy(config.repo_kind(), config).await?;
    build_count_actions_with_repo(config, repo)
}

/// Build one action per allowed model, all sharing `repo`
///
/// In dev mode every model is served by the fake detector.
pub fn build_count_actions_with_repo(
    config: &CounterConfig,
    repo: Arc<dyn ObjectCountRepo>,
) -> Result<CountActions, ConfigError> {
    let renderer = config.debug_image_dir.clone().map(DebugRenderer::new);
    let mut actions = CountActions::new();

    for model in ModelName::ALL {
        let actual_model = match config.env {
            Environment::Dev => ModelName::Fake,
            Environment::Prod => model,
        };
        info!(
            "Wiring model '{}' to '{}' detector ({} mode)",
            model, actual_model, config.env
        );

        let detector = object_detector_strategy(actual_model, config)?;
        let mut action = CountDetectedObjects::new(detector, repo.clone());
        if let Some(renderer) = &renderer {
            action = action.with_debug_renderer(renderer.clone());
        }
        actions.insert(model, action);
    }

    Ok(actions)
}
