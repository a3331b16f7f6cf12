//! Error types and handling for the catalog concierge

use thiserror::Error;

/// Result type alias for concierge operations
pub type Result<T> = std::result::Result<T, ConciergeError>;

/// Main error type for the concierge
#[derive(Error, Debug)]
pub enum ConciergeError {
    /// A credential field was empty; raised before any network call
    #[error("{field} is required")]
    MissingCredentials { field: &'static str },

    /// Transport-level failure talking to the completion endpoint
    #[error("Network error: {message}")]
    Network { message: String },

    /// The completion endpoint answered with a non-success status
    #[error("API Error ({status}): {body}")]
    UpstreamHttp { status: u16, body: String },

    /// Success status, but no `choices[0].message.content` in the body
    #[error("No response from API")]
    EmptyCompletion,

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Catalog source errors
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    /// Caller-imposed deadline expired
    #[error("Timeout: {message}")]
    Timeout { message: String },

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ConciergeError {
    /// Create a missing credentials error for the named field
    pub fn missing_credentials(field: &'static str) -> Self {
        Self::MissingCredentials { field }
    }

    /// Create a network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an upstream HTTP error
    pub fn upstream_http<S: Into<String>>(status: u16, body: S) -> Self {
        Self::UpstreamHttp {
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog<S: Into<String>>(message: S) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Timeout for a resolve call that outlived `limit`
    pub fn response_timeout(limit: std::time::Duration) -> Self {
        Self::timeout(format!("no response within {}s", limit.as_secs_f64()))
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ConciergeError::MissingCredentials { .. } => "missing_credentials",
            ConciergeError::Network { .. } => "network",
            ConciergeError::UpstreamHttp { .. } => "upstream_http",
            ConciergeError::EmptyCompletion => "empty_completion",
            ConciergeError::Config { .. } => "config",
            ConciergeError::Validation { .. } => "validation",
            ConciergeError::Catalog { .. } => "catalog",
            ConciergeError::Timeout { .. } => "timeout",
            ConciergeError::Serde(_) => "serialization",
        }
    }
}
