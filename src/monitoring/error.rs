//! Error types for the Cloud Monitoring client

use thiserror::Error;

/// Errors that can occur when talking to the Cloud Monitoring API
#[derive(Debug, Error)]
pub enum MonitoringError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Could not obtain an access token
    #[error("Failed to obtain access token: {0}")]
    Token(String),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse the API response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Rate limit exceeded - please try again later")]
    RateLimited,
}

impl MonitoringError {
    /// Map a non-success status and body onto the matching variant
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::Unauthorized(message),
            403 => Self::PermissionDenied(message),
            404 => Self::NotFound(message),
            429 => Self::RateLimited,
            _ => Self::ApiError { status, message },
        }
    }
}

pub type Result<T> = std::result::Result<T, MonitoringError>;
