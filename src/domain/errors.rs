// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for detection, persistence and the counting flow

use thiserror::Error;

use crate::vision::ImageError;

/// Errors raised by an object detector
#[derive(Debug, Error)]
pub enum DetectionError {
    /// Uploaded bytes could not be turned into an image
    #[error("Failed to decode image: {0}")]
    Decode(#[from] ImageError),

    /// Model server could not be reached or timed out
    #[error("Model server request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Model server answered with a non-success status
    #[error("Model server returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Model server answered with a payload we cannot map
    #[error("Malformed model server response: {0}")]
    MalformedResponse(String),

    /// Class index missing from the label map
    #[error("Unknown class index {0}")]
    UnknownClass(i64),
}

/// Errors raised by a count repository
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQL store error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Document store error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Count does not fit the store's integer type, or a stored value is negative
    #[error("Count out of range for '{object_class}': {value}")]
    CountOutOfRange { object_class: String, value: String },
}

/// Errors raised while executing a counting request
#[derive(Debug, Error)]
pub enum CountError {
    #[error("Detection failed: {0}")]
    Detection(#[from] DetectionError),

    #[error("Persistence failed: {0}")]
    Storage(#[from] StorageError),
}
