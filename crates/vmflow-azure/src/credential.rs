//! Credential providers
//!
//! Each provider turns some ambient context (an environment variable, a
//! service principal, an `az login` session) into a bearer token for Azure
//! Resource Manager.

use crate::error::{AzureError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;

/// Scope requested for management-plane calls
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

pub const ACCESS_TOKEN_ENV: &str = "AZURE_ACCESS_TOKEN";
pub const TENANT_ID_ENV: &str = "AZURE_TENANT_ID";
pub const CLIENT_ID_ENV: &str = "AZURE_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "AZURE_CLIENT_SECRET";
pub const AUTHORITY_HOST_ENV: &str = "AZURE_AUTHORITY_HOST";

/// Bearer token with its expiry, when known
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: Option<DateTime<Utc>>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"***")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self, scope: &str) -> Result<AccessToken>;

    /// Short name used in log lines and aggregated errors
    fn name(&self) -> &'static str;
}

fn env_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AzureError::MissingEnvVar(name.to_string())),
    }
}

/// Pre-acquired token taken from `AZURE_ACCESS_TOKEN`
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(env_var(ACCESS_TOKEN_ENV)?))
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
        Ok(AccessToken {
            token: self.token.clone(),
            expires_on: None,
        })
    }

    fn name(&self) -> &'static str {
        "static token"
    }
}

/// Service principal login with the OAuth2 client credentials grant
pub struct ClientSecretCredential {
    client: reqwest::Client,
    authority_host: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl ClientSecretCredential {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Read tenant, client id and secret from the environment.
    /// `AZURE_AUTHORITY_HOST` overrides the login endpoint.
    pub fn from_env() -> Result<Self> {
        let credential = Self::new(
            env_var(TENANT_ID_ENV)?,
            env_var(CLIENT_ID_ENV)?,
            env_var(CLIENT_SECRET_ENV)?,
        );
        Ok(match env_var(AUTHORITY_HOST_ENV) {
            Ok(host) => credential.with_authority_host(host),
            Err(_) => credential,
        })
    }

    pub fn with_authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = host.into().trim_end_matches('/').to_string();
        self
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host, self.tenant_id
        )
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let url = self.token_url();
        tracing::debug!("Requesting token from {}", url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", scope),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let detail = serde_json::from_str::<TokenErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(AzureError::TokenRequest(detail));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        let expires_in = token.expires_in.as_ref().and_then(|v| match v {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        });

        Ok(AccessToken {
            token: token.access_token,
            expires_on: expires_in.map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        })
    }

    fn name(&self) -> &'static str {
        "client secret"
    }
}

/// Token from the Azure CLI's logged-in session (`az login`)
#[derive(Debug, Default)]
pub struct AzureCliCredential;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    #[serde(default)]
    expires_on: Option<String>,
    /// Unix timestamp; only newer CLI versions emit it
    #[serde(default, rename = "expires_on")]
    expires_on_epoch: Option<i64>,
}

/// Parse the JSON printed by `az account get-access-token`
pub fn parse_cli_token(output: &str) -> Result<AccessToken> {
    let parsed: CliToken = serde_json::from_str(output)?;
    let expires_on = match (parsed.expires_on_epoch, parsed.expires_on.as_deref()) {
        (Some(epoch), _) => Utc.timestamp_opt(epoch, 0).single(),
        (None, Some(local)) => NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .and_then(|naive| Local.from_local_datetime(&naive).single())
            .map(|dt| dt.with_timezone(&Utc)),
        (None, None) => None,
    };

    Ok(AccessToken {
        token: parsed.access_token,
        expires_on,
    })
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let resource = scope.trim_end_matches(".default");
        tracing::debug!("Running: az account get-access-token --resource {}", resource);

        let output = Command::new("az")
            .args([
                "account",
                "get-access-token",
                "--resource",
                resource,
                "--output",
                "json",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => AzureError::AzureCliNotFound,
                _ => AzureError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AzureError::CommandFailed(stderr.trim().to_string()));
        }

        parse_cli_token(&String::from_utf8_lossy(&output.stdout))
    }

    fn name(&self) -> &'static str {
        "Azure CLI"
    }
}

/// Tries each source in turn; the first token wins
pub struct DefaultAzureCredential {
    sources: Vec<Box<dyn TokenCredential>>,
    unavailable: Vec<String>,
}

impl DefaultAzureCredential {
    /// Static token, then client secret, then Azure CLI.
    /// Sources whose environment variables are missing are skipped.
    pub fn new() -> Self {
        let mut sources: Vec<Box<dyn TokenCredential>> = Vec::new();
        let mut unavailable = Vec::new();

        match StaticTokenCredential::from_env() {
            Ok(c) => sources.push(Box::new(c)),
            Err(e) => unavailable.push(format!("static token: {}", e)),
        }
        match ClientSecretCredential::from_env() {
            Ok(c) => sources.push(Box::new(c)),
            Err(e) => unavailable.push(format!("client secret: {}", e)),
        }
        sources.push(Box::new(AzureCliCredential::new()));

        Self {
            sources,
            unavailable,
        }
    }

    pub fn from_sources(sources: Vec<Box<dyn TokenCredential>>) -> Self {
        Self {
            sources,
            unavailable: Vec::new(),
        }
    }
}

impl Default for DefaultAzureCredential {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenCredential for DefaultAzureCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let mut errors = self.unavailable.clone();
        for source in &self.sources {
            match source.get_token(scope).await {
                Ok(token) => {
                    tracing::debug!("Acquired token from {}", source.name());
                    return Ok(token);
                }
                Err(e) => {
                    tracing::debug!("{} credential failed: {}", source.name(), e);
                    errors.push(format!("{}: {}", source.name(), e));
                }
            }
        }
        Err(AzureError::CredentialUnavailable(errors.join("; ")))
    }

    fn name(&self) -> &'static str {
        "default"
    }
}

/// Static token when `AZURE_ACCESS_TOKEN` is set, otherwise a service principal
pub fn environment_credential() -> Result<Box<dyn TokenCredential>> {
    if let Ok(c) = StaticTokenCredential::from_env() {
        return Ok(Box::new(c));
    }
    Ok(Box::new(ClientSecretCredential::from_env()?))
}
