//! Shared helpers for the integration tests: fixture documents and an
//! in-process API server on an ephemeral port.

#![allow(dead_code)]

use certifications_api::transport::http::{create_app, AppState};
use certifications_api::{CertificationService, InMemorySource};
use serde_json::{json, Value as JsonValue};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub const PARTITION: &str = "certification";

pub fn cert(id: &str, category: &str, company: &str) -> JsonValue {
    json!({
        "id": id,
        "category": category,
        "company": company,
        "name": format!("{} certificate", id),
    })
}

/// `n` listing records with ids `cert-1..=n`.
pub fn listing(n: usize) -> Vec<JsonValue> {
    (1..=n)
        .map(|i| cert(&format!("cert-{}", i), "certification", "Contoso"))
        .collect()
}

pub async fn spawn_api(source: InMemorySource) -> Result<String, Box<dyn std::error::Error>> {
    let service = CertificationService::new(Arc::new(source), PARTITION);
    let state = AppState {
        service: Arc::new(service),
    };
    let app = create_app(state, Duration::from_secs(5));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://{}", addr))
}
