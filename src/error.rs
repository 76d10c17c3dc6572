//! Error types for adminctl

use thiserror::Error;

/// Result type alias for adminctl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Admin API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Token request rejected with status {status}: {body}")]
    AuthFailed { status: u16, body: String },

    #[error("Authentication failed. Check the admin credentials.")]
    Unauthorized,

    #[error("Access denied. The admin user lacks permission for this resource.")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Map a non-success status and its body to an error variant
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound(body),
            400 | 422 => ApiError::BadRequest(body),
            500..=599 => ApiError::ServerError(body),
            _ => ApiError::Status { status, body },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to admin API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Session store errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Could not determine cache directory")]
    NoHome,

    #[error("Session storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Session I/O error: {0}")]
    Io(String),

    #[error("Session store lock poisoned")]
    Poisoned,
}
