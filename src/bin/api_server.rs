// src/bin/api_server.rs

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use certifications_api::transport;
use certifications_api::{AmbientCredential, CertificationService, CosmosClient, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- Credential discovery ---
    let credential = AmbientCredential::from_env()?;

    // --- Cosmos client (shared by every request) ---
    let client = CosmosClient::new(config.cosmos.clone(), Arc::new(credential))?;
    info!(partition = %config.partition_key, "queries scoped to partition");

    let service = CertificationService::new(Arc::new(client), config.partition_key.clone());
    let app_state = transport::http::AppState {
        service: Arc::new(service),
    };

    // --- API Server Initialization ---
    let app = transport::http::create_app(app_state, config.request_timeout);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
