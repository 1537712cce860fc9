use std::sync::Arc;

use certifications_api::infra::credential::TokenCredential;
use certifications_api::{AmbientCredential, CertificationService, CosmosClient, ServiceConfig};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--sample N]\n\
         \n\
         Requires env vars:\n\
           COSMOS_DB_ENDPOINT\n\
         Optional:\n\
           COSMOS_DB_DATABASE, COSMOS_DB_CONTAINER, COSMOS_DB_PARTITION_KEY, COSMOS_DB_PAGE_SIZE\n\
         And an ambient identity (AZURE_TENANT_ID/AZURE_CLIENT_ID/AZURE_CLIENT_SECRET\n\
         or a managed identity endpoint).\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let sample = match args.iter().position(|a| a == "--sample") {
        Some(i) => match args.get(i + 1) {
            Some(n) => n.clone(),
            None => usage_and_exit(),
        },
        None => "1".to_string(),
    };

    // Force-read config (nice error messages if missing)
    let config = ServiceConfig::from_env()?;
    println!("> Preflight:");
    println!("  COSMOS_DB_ENDPOINT={}", config.cosmos.endpoint);
    println!("  COSMOS_DB_DATABASE={}", config.cosmos.database);
    println!("  COSMOS_DB_CONTAINER={}", config.cosmos.container);
    println!("  COSMOS_DB_PARTITION_KEY={}", config.partition_key);

    let credential = Arc::new(AmbientCredential::from_env()?);
    println!("  Credential: {}", credential.kind());

    let client = CosmosClient::new(config.cosmos.clone(), credential.clone())?;
    let token = credential
        .get_token(client.scope())
        .await
        .map_err(|e| anyhow::anyhow!("Token acquisition for {} failed: {}", client.scope(), e))?;
    println!("  Token scope: {} (expires {})", client.scope(), token.expires_at);

    let service = CertificationService::new(Arc::new(client), config.partition_key.clone());
    let certs = service.list(Some(&sample)).await?;
    println!("  Listing with top={}: {} record(s)", sample, certs.len());
    for cert in &certs {
        println!("    - {} ({}, {})", cert.id, cert.company, cert.category);
    }

    println!("> Preflight OK");
    Ok(())
}
