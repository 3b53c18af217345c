//! Error handling for the HTTP API.
//!
//! Broker errors are logged here, where they meet the transport, and turned
//! into JSON error bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subpub_types::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

/// API Error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorBody {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
}

/// Wrapper for SubPub errors to implement IntoResponse
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError(err)
    }
}

impl AppError {
    /// HTTP status and machine-readable code for this error
    pub fn status(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            Error::Closed => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            Error::DeadlineExceeded { .. } | Error::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();

        if status.is_server_error() {
            error!(error = %self.0, code, "Responding with server error");
        } else {
            warn!(error = %self.0, code, "Rejecting request");
        }

        let body = Json(ApiErrorBody {
            error: self.0.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
