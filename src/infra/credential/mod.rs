//! Ambient Azure AD credential discovery.
//!
//! The service never reads secrets from its own configuration. It uses the
//! identity the platform provides, in this order:
//!
//! 1.  A service principal exported through `AZURE_TENANT_ID`,
//!     `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET`.
//! 2.  Workload identity: `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and a
//!     federated token at `AZURE_FEDERATED_TOKEN_FILE`.
//! 3.  Otherwise a chain of the host's managed identity followed by the
//!     Azure CLI login, settling on the first one that yields a token.

pub mod azure_cli;
pub mod client_secret;
pub mod managed_identity;
pub mod workload_identity;

pub use azure_cli::AzureCliCredential;
pub use client_secret::ClientSecretCredential;
pub use managed_identity::ManagedIdentityCredential;
pub use workload_identity::WorkloadIdentityCredential;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 300;

/// Bound on the first managed identity request, so hosts without one fall
/// through to the next credential quickly.
const MANAGED_IDENTITY_PROBE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("unreadable token response: {0}")]
    Malformed(String),

    #[error("invalid credential configuration: {0}")]
    Config(String),

    /// The identity source does not exist on this host.
    #[error("credential unavailable: {0}")]
    Unavailable(String),

    #[error("no credential in the chain produced a token: {}", .0.join("; "))]
    Exhausted(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now
    }
}

#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Returns a bearer token for `scope` (e.g. `https://acct.documents.azure.com/.default`).
    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError>;
}

/// The credential selected from the environment, with a per-scope token cache.
pub struct AmbientCredential {
    source: Box<dyn TokenCredential>,
    kind: &'static str,
    cache: Mutex<HashMap<String, AccessToken>>,
}

impl AmbientCredential {
    /// Picks the first identity source the environment describes (see the
    /// module docs for the order). Nothing is contacted until the first token
    /// is requested.
    pub fn discover<F>(lookup: F) -> Result<Self, CredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        let tenant_id = get("AZURE_TENANT_ID");
        let client_id = get("AZURE_CLIENT_ID");
        let authority_host = get("AZURE_AUTHORITY_HOST");

        let (source, kind): (Box<dyn TokenCredential>, &'static str) = match (
            tenant_id.clone(),
            client_id,
            get("AZURE_CLIENT_SECRET"),
            get("AZURE_FEDERATED_TOKEN_FILE"),
        ) {
            (Some(tenant_id), Some(client_id), Some(client_secret), _) => (
                Box::new(ClientSecretCredential::new(
                    http,
                    authority_host.as_deref(),
                    tenant_id,
                    client_id,
                    client_secret,
                )?) as Box<dyn TokenCredential>,
                "client_secret",
            ),
            (Some(tenant_id), Some(client_id), None, Some(token_file)) => (
                Box::new(WorkloadIdentityCredential::new(
                    http,
                    authority_host.as_deref(),
                    tenant_id,
                    client_id,
                    token_file,
                )?) as Box<dyn TokenCredential>,
                "workload_identity",
            ),
            _ => {
                let managed = ManagedIdentityCredential::from_lookup(http, &get)?
                    .with_probe_timeout(MANAGED_IDENTITY_PROBE_TIMEOUT);
                let chain = ChainedCredential::new(vec![
                    ("managed_identity", Box::new(managed) as Box<dyn TokenCredential>),
                    ("azure_cli", Box::new(AzureCliCredential::new(tenant_id)) as Box<dyn TokenCredential>),
                ]);
                (Box::new(chain) as Box<dyn TokenCredential>, "managed_identity_or_azure_cli")
            }
        };

        info!(credential = kind, "ambient credential selected");
        Ok(Self::with_source(source, kind))
    }

    /// Reads the process environment.
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::discover(|key| std::env::var(key).ok())
    }

    pub fn with_source(source: Box<dyn TokenCredential>, kind: &'static str) -> Self {
        Self {
            source,
            kind,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

#[async_trait]
impl TokenCredential for AmbientCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        // Held across the fetch so concurrent first requests share one round trip.
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.get(scope) {
            if token.is_fresh(Utc::now()) {
                return Ok(token.clone());
            }
        }

        debug!(credential = self.kind, scope, "requesting access token");
        let token = self.source.get_token(scope).await?;
        cache.insert(scope.to_string(), token.clone());
        Ok(token)
    }
}

/// Tries each source in order until one yields a token, then sticks with it.
pub struct ChainedCredential {
    sources: Vec<(&'static str, Box<dyn TokenCredential>)>,
    selected: OnceLock<usize>,
}

impl ChainedCredential {
    pub fn new(sources: Vec<(&'static str, Box<dyn TokenCredential>)>) -> Self {
        Self {
            sources,
            selected: OnceLock::new(),
        }
    }

    /// Name of the source that produced the first token, if any has.
    pub fn selected(&self) -> Option<&'static str> {
        self.selected.get().map(|&i| self.sources[i].0)
    }
}

#[async_trait]
impl TokenCredential for ChainedCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        if let Some(&i) = self.selected.get() {
            return self.sources[i].1.get_token(scope).await;
        }

        let mut failures = Vec::with_capacity(self.sources.len());
        for (i, (name, source)) in self.sources.iter().enumerate() {
            match source.get_token(scope).await {
                Ok(token) => {
                    if self.selected.set(i).is_ok() {
                        info!(credential = *name, "credential chain settled");
                    }
                    return Ok(token);
                }
                Err(e) => {
                    debug!(credential = *name, error = %e, "credential unavailable, trying next");
                    failures.push(format!("{}: {}", name, e));
                }
            }
        }

        warn!(attempts = failures.len(), "no credential in the chain produced a token");
        Err(CredentialError::Exhausted(failures))
    }
}

/// Resource URI for the v1 token endpoints: the scope without `/.default`.
pub(crate) fn scope_to_resource(scope: &str) -> &str {
    scope.strip_suffix("/.default").unwrap_or(scope)
}
