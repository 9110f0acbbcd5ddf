// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of every non-2xx response
///
/// `error` is a message string, or the list of field errors for a 422.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: serde_json::Value,
}

/// One rejected form field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

impl FieldError {
    pub fn new(field: &str, error_type: &str, msg: impl Into<String>) -> Self {
        Self {
            loc: vec![field.to_string()],
            msg: msg.into(),
            error_type: error_type.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ApiError {
    /// Missing or unusable upload
    InvalidRequest(String),
    /// Form fields that failed validation
    ValidationError(Vec<FieldError>),
    /// Detail is logged, never sent to the client
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            ApiError::InvalidRequest(msg) => serde_json::Value::String(msg.clone()),
            ApiError::ValidationError(errors) => {
                serde_json::to_value(errors).unwrap_or(serde_json::Value::Null)
            }
            ApiError::InternalError(_) => {
                serde_json::Value::String("Internal server error".to_string())
            }
        };
        ErrorResponse { error }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) => 400,
            ApiError::ValidationError(_) => 422,
            ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError(errors) => {
                let fields: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.loc.join("."), e.msg))
                    .collect();
                write!(f, "Validation error: {}", fields.join("; "))
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}
