// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;

use super::errors::{DetectionError, StorageError};
use super::models::{ObjectCount, Prediction};

/// Turns raw image bytes into predictions
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    async fn predict(&self, image: &[u8]) -> Result<Vec<Prediction>, DetectionError>;
}

/// Storage backend for cumulative per-class counts
///
/// Reads return records ordered by class label. A subset read returns only
/// the requested labels that are stored; missing labels are omitted.
#[async_trait]
pub trait ObjectCountRepo: Send + Sync {
    /// Read every record (`None`) or only the given labels
    async fn read_values(
        &self,
        object_classes: Option<&[String]>,
    ) -> Result<Vec<ObjectCount>, StorageError>;

    /// Add each delta to the stored count, creating missing records
    async fn update_values(&self, new_values: &[ObjectCount]) -> Result<(), StorageError>;
}
