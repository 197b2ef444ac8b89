use thiserror::Error;

/// Message shown to users instead of raw connectivity errors
pub const OFFLINE_MESSAGE: &str =
    "Unable to connect. Please check your internet connection and try again.";

/// Errors raised at the hosted-backend boundary
#[derive(Debug, Error, Clone)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl BackendError {
    /// True when the failure looks like a connectivity problem rather than a
    /// rejection by the backend
    pub fn is_network(&self) -> bool {
        match self {
            BackendError::Network(_) => true,
            BackendError::Http { message, .. } => looks_like_network(message),
            _ => false,
        }
    }

    /// Text suitable for a notification
    pub fn user_message(&self) -> String {
        if self.is_network() {
            return OFFLINE_MESSAGE.to_string();
        }
        match self {
            BackendError::Http { message, .. } => message.clone(),
            BackendError::Unauthorized(msg)
            | BackendError::NotFound(msg)
            | BackendError::Decode(msg)
            | BackendError::Config(msg)
            | BackendError::Storage(msg)
            | BackendError::Network(msg) => msg.clone(),
        }
    }
}

fn looks_like_network(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    ["failed to fetch", "network", "connection", "timed out"]
        .iter()
        .any(|needle| lower.contains(needle))
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            BackendError::Network(err.to_string())
        } else if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}
