// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core data model for detection and counting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Confidence threshold applied when the caller does not send one
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Normalized, image-relative box coordinates (0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

/// A single detection produced by an object detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class_name: String,
    /// Confidence score (0.0-1.0)
    pub score: f32,
    pub bounding_box: BoundingBox,
}

impl Prediction {
    pub fn new(class_name: impl Into<String>, score: f32, bounding_box: BoundingBox) -> Self {
        Self {
            class_name: class_name.into(),
            score,
            bounding_box,
        }
    }
}

/// Number of objects seen for one class label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCount {
    pub object_class: String,
    pub count: u64,
}

impl ObjectCount {
    pub fn new(object_class: impl Into<String>, count: u64) -> Self {
        Self {
            object_class: object_class.into(),
            count,
        }
    }
}

/// Result of one counting request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountResponse {
    /// Counts found in the uploaded image
    pub current_objects: Vec<ObjectCount>,
    /// Cumulative counts for the same classes, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_objects: Option<Vec<ObjectCount>>,
}

/// Detection models a client may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelName {
    Rfcn,
    Fake,
}

impl ModelName {
    pub const ALL: [ModelName; 2] = [ModelName::Rfcn, ModelName::Fake];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::Rfcn => "rfcn",
            ModelName::Fake => "fake",
        }
    }

    /// Names accepted by the HTTP layer
    pub fn allowed() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.as_str()).collect()
    }
}

impl Default for ModelName {
    fn default() -> Self {
        ModelName::Rfcn
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown model '{}'", s))
    }
}
