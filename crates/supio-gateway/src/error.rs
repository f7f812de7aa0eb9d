// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP mapping for [`SupioError`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use supio_core::SupioError;
use tracing::error;

/// Wrapper making [`SupioError`] an axum response.
#[derive(Debug)]
pub struct ApiError(pub SupioError);

impl From<SupioError> for ApiError {
    fn from(e: SupioError) -> Self {
        Self(e)
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SupioError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            SupioError::NotFound(_) => StatusCode::NOT_FOUND,
            SupioError::BadRequest(_) => StatusCode::BAD_REQUEST,
            SupioError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            SupioError::ExtractionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SupioError::Agent(_) | SupioError::Provider { .. } => StatusCode::BAD_GATEWAY,
            SupioError::Storage { .. } | SupioError::Config(_) | SupioError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            code: self.0.code(),
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
