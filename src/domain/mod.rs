// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Domain layer for object counting
//!
//! Holds the data model, the filter/aggregation functions, the ports the
//! adapters implement and the request-scoped counting action.

pub mod actions;
pub mod errors;
pub mod models;
pub mod ports;
pub mod predictions;

pub use actions::{CountActions, CountDetectedObjects};
pub use errors::{CountError, DetectionError, StorageError};
pub use models::{
    BoundingBox, CountResponse, ModelName, ObjectCount, Prediction, DEFAULT_THRESHOLD,
};
pub use ports::{ObjectCountRepo, ObjectDetector};
pub use predictions::{count, over_threshold};
