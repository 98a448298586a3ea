//! Azure provider error types

use thiserror::Error;
use vmflow_cloud::CloudError;

#[derive(Error, Debug)]
pub enum AzureError {
    /// Error body returned by Azure Resource Manager
    #[error("Azure API error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Operation {status}: {code}: {message}")]
    OperationFailed {
        status: String,
        code: String,
        message: String,
    },

    #[error("Credential unavailable: {0}")]
    CredentialUnavailable(String),

    #[error("Azure CLI not found. Please install it and run `az login`")]
    AzureCliNotFound,

    #[error("Azure CLI command failed: {0}")]
    CommandFailed(String),

    #[error("Token request failed: {0}")]
    TokenRequest(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AzureError {
    fn is_credential(&self) -> bool {
        matches!(
            self,
            AzureError::CredentialUnavailable(_)
                | AzureError::AzureCliNotFound
                | AzureError::CommandFailed(_)
                | AzureError::TokenRequest(_)
                | AzureError::MissingEnvVar(_)
        )
    }
}

impl From<AzureError> for CloudError {
    fn from(err: AzureError) -> Self {
        match err {
            AzureError::Api {
                status,
                code,
                message,
            } => CloudError::Api {
                status: Some(status),
                code: Some(code),
                message,
            },
            AzureError::OperationFailed {
                status,
                code,
                message,
            } => CloudError::OperationFailed {
                status,
                message: format!("{}: {}", code, message),
            },
            AzureError::Http(e) => CloudError::Api {
                status: e.status().map(|s| s.as_u16()),
                code: None,
                message: e.to_string(),
            },
            AzureError::Json(e) => CloudError::Json(e),
            other if other.is_credential() => CloudError::Credential(other.to_string()),
            other => CloudError::api(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AzureError>;
