use crate::domain::model::Certification;
use crate::transport::http::types::{query_400, ApiResponse, AppState, ListParams};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

fn records_response(certs: Vec<Certification>) -> Response {
    (StatusCode::OK, Json(certs)).into_response()
}

#[utoipa::path(
    get,
    path = "/certifications/api/cert/{key}/{value}",
    tag = "Certifications",
    params(
        ("key" = String, Path, description = "Field to search on: id, category or company", example = "category"),
        ("value" = String, Path, description = "Value the field must equal", example = "Microsoft")
    ),
    responses(
        (status = 200, description = "Matching certifications", body = [Certification]),
        (status = 400, description = "Invalid key or input too long", body = ApiResponse),
        (status = 500, description = "Database failure", body = ApiResponse)
    )
)]
pub async fn get_cert_handler(
    State(state): State<AppState>,
    Path((key, value)): Path<(String, String)>,
) -> Response {
    match state.service.lookup(&key, &value).await {
        Ok(certs) => {
            info!(key = %key, records = certs.len(), "certification lookup served");
            records_response(certs)
        }
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/certifications/api/certs",
    tag = "Certifications",
    params(
        ("top" = Option<u64>, Query, description = "Return at most this many certifications", example = 3)
    ),
    responses(
        (status = 200, description = "Certification listing", body = [Certification]),
        (status = 400, description = "Invalid 'top' value", body = ApiResponse),
        (status = 500, description = "Database failure", body = ApiResponse)
    )
)]
pub async fn get_certs_handler(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(e) => return query_400(e).into_response(),
    };

    match state.service.list(params.top.as_deref()).await {
        Ok(certs) => {
            info!(top = ?params.top, records = certs.len(), "certification listing served");
            records_response(certs)
        }
        Err(e) => e.into_response(),
    }
}
