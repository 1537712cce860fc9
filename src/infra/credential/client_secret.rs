//! Service principal credential (OAuth2 client-credentials grant).
//!
//! Also home of the token-endpoint plumbing shared with the workload
//! identity credential, which uses the same grant with a client assertion.

use super::{AccessToken, CredentialError, TokenCredential};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com/";

pub struct ClientSecretCredential {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Default, Deserialize)]
struct AadErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

impl ClientSecretCredential {
    pub fn new(
        http: reqwest::Client,
        authority_host: Option<&str>,
        tenant_id: String,
        client_id: String,
        client_secret: String,
    ) -> Result<Self, CredentialError> {
        Ok(Self {
            http,
            token_url: aad_token_url(authority_host, &tenant_id)?,
            client_id,
            client_secret,
        })
    }

    pub fn token_url(&self) -> &Url {
        &self.token_url
    }
}

/// `{authority}/{tenant}/oauth2/v2.0/token`.
pub(crate) fn aad_token_url(authority_host: Option<&str>, tenant_id: &str) -> Result<Url, CredentialError> {
    let mut authority = authority_host.unwrap_or(DEFAULT_AUTHORITY_HOST).to_string();
    if !authority.ends_with('/') {
        authority.push('/');
    }
    Url::parse(&authority)
        .and_then(|base| base.join(&format!("{}/oauth2/v2.0/token", tenant_id)))
        .map_err(|e| CredentialError::Config(format!("authority host: {}", e)))
}

/// Posts a client-credentials grant and reads the token response.
pub(crate) async fn request_aad_token(
    http: &reqwest::Client,
    token_url: &Url,
    form: &[(&str, &str)],
) -> Result<AccessToken, CredentialError> {
    let response = http.post(token_url.clone()).form(form).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body: AadErrorResponse = response.json().await.unwrap_or_default();
        return Err(CredentialError::Rejected {
            status: status.as_u16(),
            message: format!("{} {}", body.error, body.error_description)
                .trim()
                .to_string(),
        });
    }

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| CredentialError::Malformed(e.to_string()))?;

    Ok(AccessToken {
        token: body.access_token,
        expires_at: expires_after(Utc::now(), body.expires_in)?,
    })
}

/// `now + expires_in`, rejecting lifetimes chrono cannot represent.
pub(crate) fn expires_after(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, CredentialError> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| CredentialError::Malformed(format!("expires_in out of range: {}", expires_in)))
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        request_aad_token(
            &self.http,
            &self.token_url,
            &[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", scope),
            ],
        )
        .await
    }
}
