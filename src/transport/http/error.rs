//! Writes `CertError`s as HTTP responses.

use crate::domain::error::CertError;
use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info};

impl CertError {
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for CertError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "certification query failed");
        } else {
            info!(error = %self, "certification query rejected");
        }
        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}
