//! Developer credential backed by the Azure CLI login (`az login`).

use super::{scope_to_resource, AccessToken, CredentialError, TokenCredential};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

const CLI_TIMEOUT: Duration = Duration::from_secs(10);

pub struct AzureCliCredential {
    tenant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    /// Unix seconds; only printed by newer CLI versions.
    #[serde(rename = "expires_on")]
    expires_on_unix: Option<i64>,
    /// Local wall-clock time, e.g. `2024-05-01 13:45:10.000000`.
    expires_on: Option<String>,
}

impl AzureCliCredential {
    pub fn new(tenant_id: Option<String>) -> Self {
        Self { tenant_id }
    }

    fn command(&self, resource: &str) -> Command {
        let mut command = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.args(["/C", "az"]);
            c
        } else {
            Command::new("az")
        };
        command.args(["account", "get-access-token", "--output", "json", "--resource", resource]);
        if let Some(tenant) = &self.tenant_id {
            command.args(["--tenant", tenant.as_str()]);
        }
        command.kill_on_drop(true);
        command
    }
}

fn parse_cli_token(stdout: &[u8]) -> Result<AccessToken, CredentialError> {
    let token: CliToken =
        serde_json::from_slice(stdout).map_err(|e| CredentialError::Malformed(format!("az output: {}", e)))?;

    let expires_at = match (token.expires_on_unix, token.expires_on.as_deref()) {
        (Some(seconds), _) => DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| CredentialError::Malformed(format!("expires_on out of range: {}", seconds)))?,
        (None, Some(text)) => {
            let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
                .map_err(|e| CredentialError::Malformed(format!("expiresOn {:?}: {}", text, e)))?;
            Local
                .from_local_datetime(&naive)
                .earliest()
                .ok_or_else(|| CredentialError::Malformed(format!("expiresOn {:?} is not a local time", text)))?
                .with_timezone(&Utc)
        }
        (None, None) => return Err(CredentialError::Malformed("az output has no expiry".to_string())),
    };

    Ok(AccessToken {
        token: token.access_token,
        expires_at,
    })
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        let resource = scope_to_resource(scope);
        debug!(resource, "requesting token from the Azure CLI");

        let output = tokio::time::timeout(CLI_TIMEOUT, self.command(resource).output())
            .await
            .map_err(|_| CredentialError::Unavailable("az did not answer in time".to_string()))?
            .map_err(|e| CredentialError::Unavailable(format!("could not run az: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CredentialError::Unavailable(format!(
                "az account get-access-token failed: {}",
                stderr.trim()
            )));
        }

        parse_cli_token(&output.stdout)
    }
}
