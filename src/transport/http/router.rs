use crate::domain::model::Certification;
use crate::transport::http::handlers::{certs, health};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub const API_PREFIX: &str = "/certifications/api";

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        certs::get_cert_handler,
        certs::get_certs_handler
    ),
    components(schemas(ApiResponse, Certification)),
    tags((name = "Certifications", description = "Read-only certification queries"))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new()
        .route("/cert/:key/:value", get(certs::get_cert_handler))
        .route("/certs", get(certs::get_certs_handler));

    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .nest(API_PREFIX, api)
        .with_state(app_state)
}

/// Router plus docs and the middleware stack used in production.
///
/// When `request_timeout` elapses the handler future is dropped, which also
/// cancels any page fetch still in flight.
pub fn create_app(app_state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
