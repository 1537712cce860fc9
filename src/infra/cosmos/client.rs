// Responsible for all communication with the Cosmos DB account.

use crate::domain::query::DocumentQuery;
use crate::infra::cosmos::pager::CosmosQueryPager;
use crate::infra::cosmos::CosmosSettings;
use crate::infra::credential::TokenCredential;
use crate::storage::documents::{DocumentContainer, DocumentSource, QueryPager, StoreError};
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Account-level client. Cheap to share; holds no per-request state.
pub struct CosmosClient {
    http: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
    /// Azure AD scope for the account, `<scheme>://<host>/.default`.
    scope: String,
    docs_url: Url,
    page_size: Option<u32>,
}

impl CosmosClient {
    pub fn new(settings: CosmosSettings, credential: Arc<dyn TokenCredential>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Self::with_http(http, settings, credential)
    }

    pub fn with_http(
        http: reqwest::Client,
        settings: CosmosSettings,
        credential: Arc<dyn TokenCredential>,
    ) -> anyhow::Result<Self> {
        let mut endpoint = Url::parse(settings.endpoint.trim())
            .with_context(|| format!("COSMOS_DB_ENDPOINT is not a valid URL: {}", settings.endpoint))?;
        let host = endpoint
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("COSMOS_DB_ENDPOINT has no host: {}", settings.endpoint))?
            .to_string();
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let scope = format!("{}://{}/.default", endpoint.scheme(), host);
        let docs_url = endpoint
            .join(&format!(
                "dbs/{}/colls/{}/docs",
                settings.database, settings.container
            ))
            .context("Invalid database or container name")?;

        info!(
            endpoint = %endpoint,
            database = %settings.database,
            container = %settings.container,
            "Cosmos DB client configured"
        );

        Ok(Self {
            http,
            credential,
            scope,
            docs_url,
            page_size: settings.page_size,
        })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn docs_url(&self) -> &Url {
        &self.docs_url
    }
}

#[async_trait]
impl DocumentSource for CosmosClient {
    async fn open(&self) -> Result<Box<dyn DocumentContainer>, StoreError> {
        let token = self
            .credential
            .get_token(&self.scope)
            .await
            .map_err(|e| StoreError::Credential(e.to_string()))?;
        debug!(expires_at = %token.expires_at, "container handle opened");

        Ok(Box::new(CosmosContainer {
            http: self.http.clone(),
            docs_url: self.docs_url.clone(),
            authorization: authorization_header(&token.token),
            page_size: self.page_size,
        }))
    }
}

/// Authenticated handle to one container.
pub struct CosmosContainer {
    http: reqwest::Client,
    docs_url: Url,
    authorization: String,
    page_size: Option<u32>,
}

impl DocumentContainer for CosmosContainer {
    fn query(&self, query: &DocumentQuery, partition_key: &str) -> Box<dyn QueryPager> {
        Box::new(CosmosQueryPager::new(
            self.http.clone(),
            self.docs_url.clone(),
            self.authorization.clone(),
            query,
            partition_key,
            self.page_size,
        ))
    }
}

/// `authorization` header for Azure AD bearer tokens, url-encoded as the
/// service requires.
pub fn authorization_header(token: &str) -> String {
    let raw = format!("type=aad&ver=1.0&sig={}", token);
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
