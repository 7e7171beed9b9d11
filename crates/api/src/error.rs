//! Error types for the notes API client

use thiserror::Error;

/// Result type alias using the API client error
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// API client error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API request to {url} failed with status code {status}")]
    RequestFailed { url: String, status: u16 },

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ApiError {
    /// Build an assertion failure for a property path
    pub fn assertion(path: &str, expectation: impl std::fmt::Display) -> Self {
        ApiError::Assertion(format!("expected {} {}", path, expectation))
    }

    /// Whether this is a validator failure rather than an I/O problem
    pub fn is_assertion(&self) -> bool {
        matches!(self, ApiError::Assertion(_))
    }
}
