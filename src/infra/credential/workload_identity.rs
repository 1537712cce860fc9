//! Workload identity credential (AKS and other federated hosts).
//!
//! The platform mounts a short-lived service account token at
//! `AZURE_FEDERATED_TOKEN_FILE` and rotates it in place, so the file is read
//! again for every exchange.

use super::client_secret::{aad_token_url, request_aad_token};
use super::{AccessToken, CredentialError, TokenCredential};
use async_trait::async_trait;
use std::path::PathBuf;
use url::Url;

const JWT_BEARER_ASSERTION: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

pub struct WorkloadIdentityCredential {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    token_file: PathBuf,
}

impl WorkloadIdentityCredential {
    pub fn new(
        http: reqwest::Client,
        authority_host: Option<&str>,
        tenant_id: String,
        client_id: String,
        token_file: impl Into<PathBuf>,
    ) -> Result<Self, CredentialError> {
        Ok(Self {
            http,
            token_url: aad_token_url(authority_host, &tenant_id)?,
            client_id,
            token_file: token_file.into(),
        })
    }

    async fn assertion(&self) -> Result<String, CredentialError> {
        let raw = tokio::fs::read_to_string(&self.token_file).await.map_err(|e| {
            CredentialError::Unavailable(format!(
                "federated token file {}: {}",
                self.token_file.display(),
                e
            ))
        })?;
        let assertion = raw.trim();
        if assertion.is_empty() {
            return Err(CredentialError::Unavailable(format!(
                "federated token file {} is empty",
                self.token_file.display()
            )));
        }
        Ok(assertion.to_string())
    }
}

#[async_trait]
impl TokenCredential for WorkloadIdentityCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        let assertion = self.assertion().await?;
        request_aad_token(
            &self.http,
            &self.token_url,
            &[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_assertion_type", JWT_BEARER_ASSERTION),
                ("client_assertion", assertion.as_str()),
                ("scope", scope),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::routing::post;
    use axum::{Form, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn token_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    async fn spawn_authority() -> String {
        let app = Router::new().route(
            "/:tenant/oauth2/v2.0/token",
            post(
                |Path(tenant): Path<String>, Form(form): Form<HashMap<String, String>>| async move {
                    let ok = tenant == "tenant-1"
                        && form.get("grant_type").map(String::as_str) == Some("client_credentials")
                        && form.get("client_id").map(String::as_str) == Some("client-1")
                        && form.get("client_assertion_type").map(String::as_str) == Some(JWT_BEARER_ASSERTION)
                        && form.get("scope").map(String::as_str) == Some("https://acct/.default");
                    let assertion = form.get("client_assertion").cloned().unwrap_or_default();
                    let access_token = if ok {
                        format!("aad-for-{}", assertion)
                    } else {
                        "bad-form".to_string()
                    };
                    Json(json!({
                        "access_token": access_token,
                        "expires_in": 3600,
                        "token_type": "Bearer"
                    }))
                },
            ),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn exchanges_the_federated_token_for_an_access_token() {
        let authority = spawn_authority().await;
        let path = token_file("workload-identity-exchange", "service-account-jwt\n");
        let cred = WorkloadIdentityCredential::new(
            reqwest::Client::new(),
            Some(&authority),
            "tenant-1".into(),
            "client-1".into(),
            &path,
        )
        .unwrap();

        let token = cred.get_token("https://acct/.default").await.unwrap();
        assert_eq!(token.token, "aad-for-service-account-jwt");
        assert!(token.expires_at > chrono::Utc::now());

        // Rotated in place by the platform.
        std::fs::write(&path, "rotated-jwt").unwrap();
        let token = cred.get_token("https://acct/.default").await.unwrap();
        assert_eq!(token.token, "aad-for-rotated-jwt");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_token_file_is_unavailable() {
        let cred = WorkloadIdentityCredential::new(
            reqwest::Client::new(),
            None,
            "t".into(),
            "c".into(),
            "/nonexistent/azure-federated-token",
        )
        .unwrap();
        let err = cred.get_token("https://acct/.default").await.unwrap_err();
        assert!(matches!(err, CredentialError::Unavailable(_)), "{:?}", err);
    }
}
