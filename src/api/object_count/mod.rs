// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object count API endpoint module
//!
//! Provides POST /v1/object-count for detecting and counting objects in an
//! uploaded image.

pub mod handler;
pub mod request;

pub use handler::object_count_handler;
pub use request::{validate_image_file, ObjectCountForm, ObjectCountInput, UploadedFile};
