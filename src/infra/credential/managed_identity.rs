//! Managed identity credential.
//!
//! App Service and Functions expose `IDENTITY_ENDPOINT` + `IDENTITY_HEADER`;
//! VMs, AKS and Container Apps fall back to the instance metadata service.

use super::{scope_to_resource, AccessToken, CredentialError, TokenCredential};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use url::Url;

pub const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";

#[derive(Debug, Clone)]
enum Endpoint {
    Imds(Url),
    AppService { url: Url, header: String },
}

pub struct ManagedIdentityCredential {
    http: reqwest::Client,
    endpoint: Endpoint,
    /// Client id of a user-assigned identity.
    client_id: Option<String>,
    /// Applied until the endpoint has answered once.
    probe_timeout: Option<Duration>,
    answered: AtomicBool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresOn {
    Seconds(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_on: ExpiresOn,
}

impl ManagedIdentityCredential {
    pub fn from_lookup(
        http: reqwest::Client,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, CredentialError> {
        let parse = |raw: &str| {
            Url::parse(raw).map_err(|e| CredentialError::Config(format!("{}: {}", raw, e)))
        };

        let endpoint = match (lookup("IDENTITY_ENDPOINT"), lookup("IDENTITY_HEADER")) {
            (Some(url), Some(header)) => Endpoint::AppService {
                url: parse(&url)?,
                header,
            },
            _ => Endpoint::Imds(parse(IMDS_ENDPOINT)?),
        };

        Ok(Self {
            http,
            endpoint,
            client_id: lookup("AZURE_CLIENT_ID"),
            probe_timeout: None,
            answered: AtomicBool::new(false),
        })
    }

    /// Caps the first request, so hosts without a metadata endpoint fail fast.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    fn request(&self, resource: &str) -> reqwest::RequestBuilder {
        let mut query = vec![("resource", resource)];
        if let Some(client_id) = &self.client_id {
            query.push(("client_id", client_id.as_str()));
        }

        match &self.endpoint {
            Endpoint::Imds(url) => {
                query.push(("api-version", IMDS_API_VERSION));
                self.http
                    .get(url.clone())
                    .header("Metadata", "true")
                    .query(&query)
            }
            Endpoint::AppService { url, header } => {
                query.push(("api-version", APP_SERVICE_API_VERSION));
                self.http
                    .get(url.clone())
                    .header("X-IDENTITY-HEADER", header.as_str())
                    .query(&query)
            }
        }
    }
}

fn parse_expires_on(value: &ExpiresOn) -> Result<DateTime<Utc>, CredentialError> {
    let seconds = match value {
        ExpiresOn::Seconds(s) => *s,
        ExpiresOn::Text(text) => match text.parse::<i64>() {
            Ok(s) => s,
            // App Service 2017-09-01 style: "09/14/2017 00:00:00 PM +00:00"
            Err(_) => {
                return DateTime::parse_from_str(text, "%m/%d/%Y %I:%M:%S %p %:z")
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| CredentialError::Malformed(format!("expires_on {:?}: {}", text, e)))
            }
        },
    };
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| CredentialError::Malformed(format!("expires_on out of range: {}", seconds)))
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        let mut request = self.request(scope_to_resource(scope));
        if let Some(timeout) = self.probe_timeout.filter(|_| !self.answered.load(Ordering::Relaxed)) {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                CredentialError::Unavailable(format!("managed identity endpoint unreachable: {}", e))
            } else {
                CredentialError::Transport(e)
            }
        })?;
        self.answered.store(true, Ordering::Relaxed);

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| CredentialError::Malformed(e.to_string()))?;

        Ok(AccessToken {
            token: body.access_token,
            expires_at: parse_expires_on(&body.expires_on)?,
        })
    }
}
