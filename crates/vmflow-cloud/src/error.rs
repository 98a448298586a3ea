//! Cloud provisioning error types

use thiserror::Error;

/// Cloud provisioning errors
#[derive(Error, Debug)]
pub enum CloudError {
    /// Error returned by the remote management API, passed through unchanged
    #[error("API error{}: {message}", fmt_api_context(.status, .code))]
    Api {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },

    #[error("Long-running operation ended in state {status}: {message}")]
    OperationFailed { status: String, message: String },

    #[error("Authentication failed: {0}")]
    Credential(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn fmt_api_context(status: &Option<u16>, code: &Option<String>) -> String {
    match (status, code) {
        (Some(s), Some(c)) => format!(" ({} {})", s, c),
        (Some(s), None) => format!(" ({})", s),
        (None, Some(c)) => format!(" ({})", c),
        (None, None) => String::new(),
    }
}

impl CloudError {
    pub fn api(message: impl Into<String>) -> Self {
        CloudError::Api {
            status: None,
            code: None,
            message: message.into(),
        }
    }
}

impl From<vmflow_config::ConfigError> for CloudError {
    fn from(err: vmflow_config::ConfigError) -> Self {
        CloudError::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
