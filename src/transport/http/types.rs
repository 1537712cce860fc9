use crate::app::certification_service::CertificationService;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CertificationService>,
}

/// Envelope for errors and service endpoints. Record lists are returned bare.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Query string of the listing endpoint. `top` stays raw so validation owns
/// the error message.
#[derive(Deserialize, Debug, Default)]
pub struct ListParams {
    #[serde(default)]
    pub top: Option<String>,
}

pub fn query_400(err: QueryRejection) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::failure(format!(
            "Invalid query string: {} (expected: ?top=<positive integer>)",
            err
        ))),
    )
}
