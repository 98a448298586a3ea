//! Long-running operation polling
//!
//! Resource Manager reports asynchronous work in one of three ways:
//!
//! - an `Azure-AsyncOperation` header pointing at an operation status resource
//! - `202 Accepted` with a `Location` header that keeps answering 202 until done
//! - a synchronous body whose `provisioningState` is not terminal yet
//!
//! Polling waits `Retry-After` seconds when the service sends it, otherwise the
//! client's poll interval. There is no overall timeout.

use crate::arm::{ArmClient, read_body};
use crate::error::{AzureError, Result};
use reqwest::header::HeaderMap;
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use vmflow_cloud::model::{is_failed_state, is_terminal_state};

const ASYNC_OPERATION: &str = "azure-asyncoperation";
const LOCATION: &str = "location";
const RETRY_AFTER: &str = "retry-after";

#[derive(Debug, Deserialize)]
struct OperationStatus {
    status: String,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    header(headers, RETRY_AFTER)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn failed(status: &str, error: Option<OperationError>) -> AzureError {
    let (code, message) = match error {
        Some(e) => (
            e.code.unwrap_or_else(|| status.to_string()),
            e.message.unwrap_or_default(),
        ),
        None => (status.to_string(), String::new()),
    };
    AzureError::OperationFailed {
        status: status.to_string(),
        code,
        message,
    }
}

fn provisioning_state(body: &Value) -> Option<&str> {
    body.pointer("/properties/provisioningState")
        .and_then(Value::as_str)
}

/// Wait for the operation behind `response` to finish.
///
/// `resource_url` is the resource a PUT targeted; when set, the final
/// representation is fetched from it once the operation succeeds.
pub(crate) async fn wait(
    client: &ArmClient,
    response: Response,
    resource_url: Option<&str>,
) -> Result<Option<Value>> {
    let headers = response.headers().clone();
    let status = response.status();
    let mut delay = retry_after(&headers).unwrap_or(client.poll_interval());

    if let Some(operation_url) = header(&headers, ASYNC_OPERATION) {
        loop {
            tokio::time::sleep(delay).await;
            let poll = client.send(Method::GET, &operation_url, None).await?;
            delay = retry_after(poll.headers()).unwrap_or(client.poll_interval());
            let body: OperationStatus = poll.json().await?;
            tracing::debug!("Operation status: {}", body.status);

            if body.status.eq_ignore_ascii_case("succeeded") {
                break;
            }
            if is_failed_state(&body.status) {
                return Err(failed(&body.status, body.error));
            }
        }
        return match resource_url {
            Some(url) => fetch(client, url).await.map(Some),
            None => Ok(None),
        };
    }

    if status == StatusCode::ACCEPTED {
        if let Some(location) = header(&headers, LOCATION) {
            let body = loop {
                tokio::time::sleep(delay).await;
                let poll = client.send(Method::GET, &location, None).await?;
                if poll.status() != StatusCode::ACCEPTED {
                    break read_body(poll).await?;
                }
                tracing::debug!("Operation still running at {}", location);
                delay = retry_after(poll.headers()).unwrap_or(client.poll_interval());
            };
            return match resource_url {
                Some(url) => fetch(client, url).await.map(Some),
                None => Ok(body),
            };
        }
    }

    let body = read_body(response).await?;
    match (body, resource_url) {
        (Some(mut body), Some(url)) => {
            while !is_terminal_state(provisioning_state(&body)) {
                tracing::debug!(
                    "Provisioning state {}; polling {}",
                    provisioning_state(&body).unwrap_or("-"),
                    url
                );
                tokio::time::sleep(delay).await;
                delay = client.poll_interval();
                body = fetch(client, url).await?;
            }
            match provisioning_state(&body).map(str::to_string) {
                Some(state) if is_failed_state(&state) => Err(failed(&state, None)),
                _ => Ok(Some(body)),
            }
        }
        (body, _) => Ok(body),
    }
}

async fn fetch(client: &ArmClient, url: &str) -> Result<Value> {
    let response = client.send(Method::GET, url, None).await?;
    read_body(response)
        .await?
        .ok_or_else(|| AzureError::InvalidResponse(format!("empty body from {}", url)))
}
