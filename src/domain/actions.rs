// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request-scoped counting use case and the per-model action registry

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::errors::CountError;
use super::models::{CountResponse, ModelName, Prediction};
use super::ports::{ObjectCountRepo, ObjectDetector};
use super::predictions::{count, over_threshold};
use crate::vision::debug::DebugRenderer;

/// Detect, filter, count and persist objects for one uploaded image
pub struct CountDetectedObjects {
    object_detector: Arc<dyn ObjectDetector>,
    object_count_repo: Arc<dyn ObjectCountRepo>,
    debug_renderer: Option<DebugRenderer>,
}

impl CountDetectedObjects {
    pub fn new(
        object_detector: Arc<dyn ObjectDetector>,
        object_count_repo: Arc<dyn ObjectCountRepo>,
    ) -> Self {
        Self {
            object_detector,
            object_count_repo,
            debug_renderer: None,
        }
    }

    /// Render every request's predictions into an image directory
    pub fn with_debug_renderer(mut self, renderer: DebugRenderer) -> Self {
        self.debug_renderer = Some(renderer);
        self
    }

    /// Run the counting flow.
    ///
    /// The repository is always updated with the counts of this image, even
    /// when `return_total` is false. Any detector or repository failure
    /// aborts the flow.
    pub async fn execute(
        &self,
        image: &[u8],
        threshold: f32,
        return_total: bool,
    ) -> Result<CountResponse, CountError> {
        let predictions = self.find_valid_predictions(image, threshold).await?;
        let object_counts = count(&predictions);
        debug!(
            "{} predictions over {} -> {} classes",
            predictions.len(),
            threshold,
            object_counts.len()
        );

        self.object_count_repo.update_values(&object_counts).await?;

        let total_objects = if return_total {
            let classes: Vec<String> = object_counts
                .iter()
                .map(|oc| oc.object_class.clone())
                .collect();
            Some(self.object_count_repo.read_values(Some(classes.as_slice())).await?)
        } else {
            None
        };

        Ok(CountResponse {
            current_objects: object_counts,
            total_objects,
        })
    }

    async fn find_valid_predictions(
        &self,
        image: &[u8],
        threshold: f32,
    ) -> Result<Vec<Prediction>, CountError> {
        let predictions = self.object_detector.predict(image).await?;
        self.debug_image(image, &predictions, "all_predictions.jpg".to_string())
            .await;

        let valid: Vec<Prediction> = over_threshold(predictions, threshold).collect();
        self.debug_image(
            image,
            &valid,
            format!("valid_predictions_with_threshold_{}.jpg", threshold),
        )
        .await;

        Ok(valid)
    }

    async fn debug_image(&self, image: &[u8], predictions: &[Prediction], file_name: String) {
        let Some(renderer) = self.debug_renderer.clone() else {
            return;
        };

        let image = image.to_vec();
        let predictions = predictions.to_vec();
        let result =
            tokio::task::spawn_blocking(move || renderer.render(&image, &predictions, &file_name))
                .await;

        match result {
            Ok(Ok(path)) => debug!("Debug image written to {:?}", path),
            Ok(Err(e)) => warn!("Debug image rendering failed: {}", e),
            Err(e) => warn!("Debug image task failed: {}", e),
        }
    }
}

/// Counting actions built once at start-up, one per allowed model
#[derive(Clone, Default)]
pub struct CountActions {
    actions: HashMap<ModelName, Arc<CountDetectedObjects>>,
}

impl CountActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model: ModelName, action: CountDetectedObjects) {
        info!("Registered count action for model '{}'", model);
        self.actions.insert(model, Arc::new(action));
    }

    pub fn get(&self, model: ModelName) -> Option<Arc<CountDetectedObjects>> {
        self.actions.get(&model).cloned()
    }

    pub fn models(&self) -> Vec<ModelName> {
        let mut models: Vec<ModelName> = self.actions.keys().copied().collect();
        models.sort_by_key(|m| m.as_str());
        models
    }
}
