use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GasWatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} timed out after {after:?}")]
    Timeout { provider: String, after: Duration },

    #[error("{provider} returned error status: {message}")]
    UpstreamStatus { provider: String, message: String },

    #[error("Malformed response from {provider}: {reason}")]
    MalformedResponse { provider: String, reason: String },

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("History file error: {0}")]
    History(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GasWatchError {
    pub fn malformed(provider: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    pub fn upstream(provider: &str, message: impl Into<String>) -> Self {
        Self::UpstreamStatus {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = GasWatchError> = std::result::Result<T, E>;
