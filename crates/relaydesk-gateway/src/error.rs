// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps [`RelaydeskError`] onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use relaydesk_core::RelaydeskError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper so handlers can return `Result<_, ApiError>` and use `?`.
#[derive(Debug)]
pub struct ApiError(pub RelaydeskError);

impl From<RelaydeskError> for ApiError {
    fn from(err: RelaydeskError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RelaydeskError::Unauthorized(_) | RelaydeskError::Expired { .. } => {
                StatusCode::UNAUTHORIZED
            }
            RelaydeskError::NotFound { .. } => StatusCode::NOT_FOUND,
            RelaydeskError::ConversationClosed { .. } | RelaydeskError::AlreadyExists(_) => {
                StatusCode::CONFLICT
            }
            RelaydeskError::AmountMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RelaydeskError::Validation(_) => StatusCode::BAD_REQUEST,
            RelaydeskError::GenerationFailed { .. } => StatusCode::BAD_GATEWAY,
            RelaydeskError::Config(_)
            | RelaydeskError::Storage { .. }
            | RelaydeskError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}
