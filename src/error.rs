//! Error types for ddns-sync.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for ddns-sync.
pub type Result<T> = std::result::Result<T, SyncError>;

/// A single error object from the DNS provider's response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

/// Failures of a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote endpoint unreachable or non-success HTTP status.
    #[error("Connection error: {0}")]
    Connectivity(String),

    /// Response body is not a valid IP address.
    #[error("Invalid IP response: {0}")]
    Format(String),

    /// Cache file missing on load.
    #[error("Cache load error: {0}")]
    CacheLoad(String),

    /// Cache file already present on create, or save without a value.
    #[error("Cache creation error: {0}")]
    CacheCreation(String),

    /// The provider accepted the request but rejected the update.
    #[error("DNS update rejected by provider: {}", format_provider_errors(.0))]
    RemoteRejection(Vec<ProviderError>),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_provider_errors(errors: &[ProviderError]) -> String {
    if errors.is_empty() {
        return "no error details supplied".to_string();
    }

    errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::Connectivity(e.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(e: toml::de::Error) -> Self {
        SyncError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(e: toml::ser::Error) -> Self {
        SyncError::Config(e.to_string())
    }
}
