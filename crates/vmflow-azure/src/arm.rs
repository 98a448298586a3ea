//! Azure Resource Manager HTTP client
//!
//! Direct REST implementation with bearer token authentication. The token is
//! acquired once in [`ArmClientBuilder::connect`] and reused for every call.

use crate::credential::{AccessToken, MANAGEMENT_SCOPE, TokenCredential};
use crate::error::{AzureError, Result};
use reqwest::{Method, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

pub const NETWORK_API_VERSION: &str = "2023-09-01";
pub const COMPUTE_API_VERSION: &str = "2023-09-01";
pub const STORAGE_API_VERSION: &str = "2023-01-01";
pub const RESOURCES_API_VERSION: &str = "2021-04-01";

struct Inner {
    http: reqwest::Client,
    endpoint: String,
    subscription_id: String,
    token: AccessToken,
    poll_interval: Duration,
}

/// Client scoped to one subscription. Cheap to clone.
#[derive(Clone)]
pub struct ArmClient {
    inner: Arc<Inner>,
}

pub struct ArmClientBuilder {
    subscription_id: String,
    endpoint: String,
    poll_interval: Duration,
}

impl ArmClientBuilder {
    /// Base URL, for sovereign clouds or a mock server
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Acquire a management token from `credential` and build the client
    pub async fn connect(self, credential: &dyn TokenCredential) -> Result<ArmClient> {
        tracing::debug!("Acquiring token via {} credential", credential.name());
        let token = credential.get_token(MANAGEMENT_SCOPE).await?;

        Ok(ArmClient {
            inner: Arc::new(Inner {
                http: reqwest::Client::new(),
                endpoint: self.endpoint,
                subscription_id: self.subscription_id,
                token,
                poll_interval: self.poll_interval,
            }),
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(default)]
    next_link: Option<String>,
}

/// Build the error for a non-success response from its body
pub(crate) fn api_error(status: u16, body: &str) -> AzureError {
    match serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
    {
        Some(detail) => AzureError::Api {
            status,
            code: detail.code.unwrap_or_else(|| "Unknown".to_string()),
            message: detail.message.unwrap_or_default(),
        },
        None => AzureError::Api {
            status,
            code: "Unknown".to_string(),
            message: if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.trim().to_string()
            },
        },
    }
}

/// Error for a non-success response whose body could not be read
pub(crate) fn unreadable_error_body(status: u16, cause: &dyn std::fmt::Display) -> AzureError {
    tracing::debug!("Failed to read error body of HTTP {}: {}", status, cause);
    AzureError::Api {
        status,
        code: "Unknown".to_string(),
        message: format!("HTTP {} (error body unreadable: {})", status, cause),
    }
}

/// Response body as JSON; `None` when empty
pub(crate) async fn read_body(response: Response) -> Result<Option<Value>> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&text)?))
}

impl ArmClient {
    pub fn builder(subscription_id: impl Into<String>) -> ArmClientBuilder {
        ArmClientBuilder {
            subscription_id: subscription_id.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval: Duration::from_secs(vmflow_config::DEFAULT_POLL_INTERVAL_SECS),
        }
    }

    pub fn subscription_id(&self) -> &str {
        &self.inner.subscription_id
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    pub fn poll_interval(&self) -> Duration {
        self.inner.poll_interval
    }

    /// `{endpoint}/subscriptions/{sub}/resourceGroups/{rg}/providers/{provider}/{name}`
    pub fn resource_path(&self, resource_group: &str, provider: &str, name: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/{}/{}",
            self.inner.endpoint, self.inner.subscription_id, resource_group, provider, name
        )
    }

    /// `{endpoint}/subscriptions/{sub}/providers/{provider}`
    pub fn subscription_path(&self, provider: &str) -> String {
        format!(
            "{}/subscriptions/{}/providers/{}",
            self.inner.endpoint, self.inner.subscription_id, provider
        )
    }

    /// Send a request and turn non-success statuses into [`AzureError::Api`]
    pub(crate) async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response> {
        tracing::debug!("{} {}", method, url);
        let mut request = self
            .inner
            .http
            .request(method, url)
            .bearer_auth(&self.inner.token.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("-> {}", status);
        if status.is_success() {
            return Ok(response);
        }

        match response.text().await {
            Ok(text) => Err(api_error(status.as_u16(), &text)),
            Err(e) => Err(unreadable_error_body(status.as_u16(), &e)),
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send(Method::GET, url, None).await?;
        Ok(response.json().await?)
    }

    /// Every item across all pages, following `nextLink`
    pub(crate) async fn list_pages<T: DeserializeOwned>(&self, first: String) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first);
        while let Some(url) = next {
            let page: Page<T> = self.get_json(&url).await?;
            items.extend(page.value);
            next = page.next_link.filter(|link| !link.is_empty());
        }
        Ok(items)
    }
}

pub(crate) fn with_api_version(url: &str, api_version: &str) -> String {
    format!("{}?api-version={}", url, api_version)
}
