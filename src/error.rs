//! Error types for ask-the-universe

use thiserror::Error;

/// Main error type for randomness provider operations
#[derive(Error, Debug)]
pub enum Error {
    /// Request parameters violate the backend's bounds. Raised before any I/O.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Non-success HTTP status, connection failure, or subprocess failure
    #[error("Transport error: {message}")]
    Transport {
        /// HTTP status code, when the failure came from a response
        status: Option<u16>,
        message: String,
    },

    /// The remote service reported a structured failure
    #[error("API error: {message}{}", code_suffix(.code))]
    Api { code: Option<i64>, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Sampling exhausted: {0}")]
    Exhausted(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn code_suffix(code: &Option<i64>) -> String {
    match code {
        Some(code) => format!(" (code: {})", code),
        None => String::new(),
    }
}

impl Error {
    /// Build a transport error from a failed reqwest call
    pub(crate) fn from_reqwest(service: &str, err: reqwest::Error) -> Self {
        Error::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: format!("{} request failed: {}", service, err),
        }
    }

    /// Build a transport error from a non-success HTTP status
    pub(crate) fn from_status(service: &str, status: reqwest::StatusCode) -> Self {
        Error::Transport {
            status: Some(status.as_u16()),
            message: format!("{} returned status: {}", service, status),
        }
    }

    /// HTTP status carried by a transport error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result type alias for ask-the-universe operations
pub type Result<T> = std::result::Result<T, Error>;
