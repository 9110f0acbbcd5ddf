// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection adapters
//!
//! This module provides:
//! - A remote detector that calls a TensorFlow Serving REST endpoint
//! - A fake detector with one fixed prediction, for dev mode and tests
//! - Image decoding, label maps and debug overlays shared by both

pub mod debug;
pub mod fake_detector;
pub mod image_utils;
pub mod label_map;
pub mod tfs_client;

pub use fake_detector::FakeObjectDetector;
pub use image_utils::{
    decode_image_bytes, detect_format, is_allowed_mime_type, to_rgb_tensor, ImageError, ImageInfo,
    ALLOWED_IMAGE_MIME_TYPES,
};
pub use label_map::{LabelMap, LabelMapError};
pub use tfs_client::TfsObjectDetector;

use std::sync::Arc;
use tracing::info;

use crate::config::{ConfigError, CounterConfig};
use crate::domain::{ModelName, ObjectDetector};

/// Build the detector serving `model`
pub fn object_detector_strategy(
    model: ModelName,
    config: &CounterConfig,
) -> Result<Arc<dyn ObjectDetector>, ConfigError> {
    let detector: Arc<dyn ObjectDetector> = match model {
        ModelName::Fake => Arc::new(FakeObjectDetector::new()),
        ModelName::Rfcn => {
            let label_map = LabelMap::load(config.label_map_path.as_deref())?;
            info!(
                "Loaded label map with {} classes for model '{}'",
                label_map.len(),
                model
            );
            Arc::new(TfsObjectDetector::new(
                &config.tfs_host,
                config.tfs_port,
                model.as_str(),
                label_map,
                config.tfs_timeout(),
            )?)
        }
    };
    Ok(detector)
}
