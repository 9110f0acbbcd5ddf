// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detector stand-in that ignores its input

use async_trait::async_trait;

use crate::domain::{BoundingBox, DetectionError, ObjectDetector, Prediction};

/// Always reports one cat, whatever the image bytes are
#[derive(Debug, Clone, Default)]
pub struct FakeObjectDetector;

impl FakeObjectDetector {
    pub fn new() -> Self {
        Self
    }

    fn prediction() -> Prediction {
        Prediction::new(
            "cat",
            0.999_190_748,
            BoundingBox {
                xmin: 0.367_288_858,
                ymin: 0.278_333_426,
                xmax: 0.735_821_366,
                ymax: 0.698_885_5,
            },
        )
    }
}

#[async_trait]
impl ObjectDetector for FakeObjectDetector {
    async fn predict(&self, _image: &[u8]) -> Result<Vec<Prediction>, DetectionError> {
        Ok(vec![Self::prediction()])
    }
}
