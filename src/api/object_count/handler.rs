// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object count endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::multipart::MultipartRejection;
use axum_extra::extract::Multipart;
use tracing::{debug, error, info, warn};

use super::request::{validate_image_file, ObjectCountForm, ObjectCountInput};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::domain::CountResponse;

/// POST /v1/object-count - Count objects in an uploaded image
///
/// # Request (multipart/form-data)
/// - `file`: JPEG, PNG, GIF or WebP image (required)
/// - `model_name`: Detection model (`rfcn`, `fake`) - defaults to `rfcn`
/// - `threshold`: Minimum confidence (0.0-1.0) - defaults to 0.5
/// - `return_total`: Also return cumulative counts - defaults to false
///
/// # Response
/// - `current_objects`: Counts per class in this image
/// - `total_objects`: Cumulative counts for the same classes (only when requested)
///
/// # Errors
/// - 400 Bad Request: Not multipart, missing file or unsupported image type
/// - 422 Unprocessable Entity: Invalid form fields
/// - 500 Internal Server Error: Detection or persistence failed
pub async fn object_count_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CountResponse>, ApiError> {
    let multipart = multipart.map_err(|e| {
        warn!("Rejected non-multipart request: {}", e);
        ApiError::InvalidRequest(e.body_text())
    })?;

    // 1. Read the form
    let form = ObjectCountForm::from_multipart(multipart).await.map_err(|e| {
        warn!("{}", e);
        e
    })?;

    // 2. Validate file, then fields
    let file = validate_image_file(form.file.as_ref()).map_err(|e| {
        warn!("File validation failed: {}", e);
        e
    })?;
    let input = ObjectCountInput::from_form(&form.fields).map_err(|e| {
        warn!("Form validation failed: {}", e);
        e
    })?;
    debug!(
        "Object count request: model={}, threshold={}, return_total={}",
        input.model_name, input.threshold, input.return_total
    );

    // 3. Dispatch to the model's action
    let action = state.count_actions.get(input.model_name).ok_or_else(|| {
        error!("No count action registered for model '{}'", input.model_name);
        ApiError::InternalError(format!("model '{}' not wired", input.model_name))
    })?;

    let response = action
        .execute(&file.bytes, input.threshold, input.return_total)
        .await
        .map_err(|e| {
            error!("Object count failed: {}", e);
            ApiError::InternalError(e.to_string())
        })?;

    info!(
        "Counted {} classes with model '{}'",
        response.current_objects.len(),
        input.model_name
    );
    Ok(Json(response))
}
