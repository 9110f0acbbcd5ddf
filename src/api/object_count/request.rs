// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object count request parsing and validation

use axum::body::Bytes;
use axum_extra::extract::Multipart;
use std::collections::HashMap;
use tracing::debug;

use crate::api::errors::{ApiError, FieldError};
use crate::domain::{ModelName, DEFAULT_THRESHOLD};
use crate::vision::is_allowed_mime_type;

/// Multipart part holding the image
pub const FILE_FIELD: &str = "file";

/// Image part of the upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    fn is_empty(&self) -> bool {
        self.file_name.as_deref().map_or(true, str::is_empty) && self.bytes.is_empty()
    }
}

/// Raw multipart form: the image part plus every text field
#[derive(Debug, Clone, Default)]
pub struct ObjectCountForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl ObjectCountForm {
    /// Drain the multipart stream
    ///
    /// The first `file` part wins; other parts are read as text fields.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == FILE_FIELD && form.file.is_none() {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::InvalidRequest(format!("Malformed multipart body: {}", e))
                })?;
                debug!(
                    "Received file part {:?} ({:?}, {} bytes)",
                    file_name,
                    content_type,
                    bytes.len()
                );
                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            } else {
                let value = field.text().await.map_err(|e| {
                    ApiError::InvalidRequest(format!("Malformed multipart body: {}", e))
                })?;
                form.fields.entry(name).or_insert(value);
            }
        }

        Ok(form)
    }
}

/// Check the upload exists and has an accepted image content type
pub fn validate_image_file(file: Option<&UploadedFile>) -> Result<&UploadedFile, ApiError> {
    let file = match file {
        Some(file) if !file.is_empty() => file,
        _ => return Err(ApiError::InvalidRequest("File is required.".to_string())),
    };

    let content_type = file.content_type.as_deref().unwrap_or_default();
    if !is_allowed_mime_type(content_type) {
        return Err(ApiError::InvalidRequest(format!(
            "Unsupported image type: {}",
            content_type
        )));
    }

    Ok(file)
}

/// Validated form fields for a counting request
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectCountInput {
    /// Confidence threshold (0.0-1.0)
    pub threshold: f32,
    pub model_name: ModelName,
    pub return_total: bool,
}

impl Default for ObjectCountInput {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            model_name: ModelName::default(),
            return_total: false,
        }
    }
}

impl ObjectCountInput {
    /// Validate the text fields, reporting every failing field at once
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, ApiError> {
        let mut input = Self::default();
        let mut errors = Vec::new();

        if let Some(raw) = fields.get("threshold") {
            match parse_threshold(raw) {
                Ok(threshold) => input.threshold = threshold,
                Err(e) => errors.push(e),
            }
        }

        if let Some(raw) = fields.get("model_name") {
            match raw.parse::<ModelName>() {
                Ok(model) => input.model_name = model,
                Err(_) => errors.push(FieldError::new(
                    "model_name",
                    "literal_error",
                    format!("Input should be {}", quoted_alternatives(&ModelName::allowed())),
                )),
            }
        }

        if let Some(raw) = fields.get("return_total") {
            match parse_bool(raw) {
                Some(value) => input.return_total = value,
                None => errors.push(FieldError::new(
                    "return_total",
                    "bool_parsing",
                    "Input should be a valid boolean, unable to interpret input",
                )),
            }
        }

        if errors.is_empty() {
            Ok(input)
        } else {
            Err(ApiError::ValidationError(errors))
        }
    }
}

fn parse_threshold(raw: &str) -> Result<f32, FieldError> {
    let value: f32 = raw.trim().parse().map_err(|_| {
        FieldError::new(
            "threshold",
            "float_parsing",
            "Input should be a valid number, unable to parse string as a number",
        )
    })?;

    if value.is_nan() {
        Err(FieldError::new(
            "threshold",
            "finite_number",
            "Input should be a finite number",
        ))
    } else if value < 0.0 {
        Err(FieldError::new(
            "threshold",
            "greater_than_equal",
            "Input should be greater than or equal to 0",
        ))
    } else if value > 1.0 {
        Err(FieldError::new(
            "threshold",
            "less_than_equal",
            "Input should be less than or equal to 1",
        ))
    } else {
        Ok(value)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn quoted_alternatives(names: &[&str]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}
