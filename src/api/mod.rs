// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod object_count;

pub use errors::{ApiError, ErrorResponse, FieldError};
pub use handlers::HealthResponse;
pub use http_server::{create_app, start_server, AppState};
pub use object_count::{object_count_handler, ObjectCountInput};
