// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! TensorFlow Serving REST client for object detection models

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::image_utils::{decode_image_bytes, to_rgb_tensor, RgbTensor};
use super::label_map::LabelMap;
use crate::domain::{BoundingBox, DetectionError, ObjectDetector, Prediction};

// --- TF Serving predict API serde structs ---

#[derive(serde::Serialize)]
struct PredictRequest<'a> {
    instances: [&'a RgbTensor; 1],
}

#[derive(serde::Deserialize)]
struct PredictResponse {
    predictions: Vec<RawDetections>,
}

#[derive(Debug, serde::Deserialize)]
struct RawDetections {
    num_detections: f64,
    /// `[ymin, xmin, ymax, xmax]`, normalized
    detection_boxes: Vec<[f32; 4]>,
    detection_scores: Vec<f32>,
    detection_classes: Vec<f64>,
}

/// Detector backed by a model hosted on TensorFlow Serving
pub struct TfsObjectDetector {
    client: Client,
    url: String,
    label_map: LabelMap,
}

impl TfsObjectDetector {
    pub fn new(
        host: &str,
        port: u16,
        model: &str,
        label_map: LabelMap,
        timeout: Duration,
    ) -> Result<Self, DetectionError> {
        let client = Client::builder().timeout(timeout).build()?;
        let url = format!("http://{}:{}/v1/models/{}:predict", host, port, model);
        info!("TFS detector configured: url={}, timeout={:?}", url, timeout);

        Ok(Self {
            client,
            url,
            label_map,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ObjectDetector for TfsObjectDetector {
    async fn predict(&self, image: &[u8]) -> Result<Vec<Prediction>, DetectionError> {
        let start = Instant::now();
        let (img, image_info) = decode_image_bytes(image)?;
        let tensor = to_rgb_tensor(&img);
        debug!(
            "Sending {}x{} {:?} image to {}",
            image_info.width, image_info.height, image_info.format, self.url
        );

        let response = self
            .client
            .post(&self.url)
            .json(&PredictRequest { instances: [&tensor] })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DetectionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let payload: PredictResponse = response
            .json()
            .await
            .map_err(|e| DetectionError::MalformedResponse(e.to_string()))?;
        let raw = payload
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| DetectionError::MalformedResponse("empty predictions".to_string()))?;

        let predictions = to_predictions(raw, &self.label_map)?;
        info!(
            "TFS returned {} predictions in {}ms",
            predictions.len(),
            start.elapsed().as_millis()
        );
        Ok(predictions)
    }
}

fn to_predictions(
    raw: RawDetections,
    label_map: &LabelMap,
) -> Result<Vec<Prediction>, DetectionError> {
    if !raw.num_detections.is_finite() || raw.num_detections < 0.0 {
        return Err(DetectionError::MalformedResponse(format!(
            "num_detections = {}",
            raw.num_detections
        )));
    }
    let n = raw.num_detections as usize;
    if raw.detection_boxes.len() < n
        || raw.detection_scores.len() < n
        || raw.detection_classes.len() < n
    {
        return Err(DetectionError::MalformedResponse(format!(
            "expected {} detections, got {} boxes, {} scores, {} classes",
            n,
            raw.detection_boxes.len(),
            raw.detection_scores.len(),
            raw.detection_classes.len()
        )));
    }

    (0..n)
        .map(|i| {
            let class_id = raw.detection_classes[i] as i64;
            let class_name = label_map
                .get(class_id)
                .ok_or(DetectionError::UnknownClass(class_id))?;
            let [ymin, xmin, ymax, xmax] = raw.detection_boxes[i];
            Ok(Prediction::new(
                class_name,
                raw.detection_scores[i],
                BoundingBox {
                    xmin,
                    ymin,
                    xmax,
                    ymax,
                },
            ))
        })
        .collect()
}
