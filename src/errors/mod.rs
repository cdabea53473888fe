//! Error handling module for the ACM client.
//!
//! Provides a single error type for the request layer, the cache and the session, with
//! mapping from HTTP status codes and backend error bodies.

use serde::Deserialize;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

/// Client error type.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Request or response failed schema validation
    Validation(String),
    /// Transport failure or unexpected HTTP status
    Network {
        status: Option<u16>,
        message: String,
    },
    /// Authentication required or session expired
    Auth(String),
    /// Role not permitted for the operation
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// Persisted session could not be read or written
    Storage(String),
    /// Invalid configuration
    Config(String),
}

impl ClientError {
    /// Get the HTTP status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Network { status, .. } => *status,
            ClientError::Auth(_) => Some(401),
            ClientError::Forbidden(_) => Some(403),
            ClientError::NotFound(_) => Some(404),
            ClientError::Validation(_) | ClientError::Storage(_) | ClientError::Config(_) => None,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => codes::VALIDATION_ERROR,
            ClientError::Network { .. } => codes::NETWORK_ERROR,
            ClientError::Auth(_) => codes::UNAUTHORIZED,
            ClientError::Forbidden(_) => codes::FORBIDDEN,
            ClientError::NotFound(_) => codes::NOT_FOUND,
            ClientError::Storage(_) => codes::STORAGE_ERROR,
            ClientError::Config(_) => codes::CONFIG_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Network { message, .. } => message.clone(),
            ClientError::Auth(msg) => msg.clone(),
            ClientError::Forbidden(msg) => msg.clone(),
            ClientError::NotFound(msg) => msg.clone(),
            ClientError::Storage(msg) => msg.clone(),
            ClientError::Config(msg) => msg.clone(),
        }
    }

    /// Map a non-success HTTP response to an error.
    ///
    /// The backend reports failures as `{ status?, code, message }`; the message is used
    /// when the body parses, the raw body otherwise.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => match parsed.code {
                Some(code) => format!("{}: {}", code, parsed.message),
                None => parsed.message,
            },
            Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
            Err(_) => body.trim().to_string(),
        };

        match status {
            401 => ClientError::Auth(message),
            403 => ClientError::Forbidden(message),
            404 => ClientError::NotFound(message),
            _ => ClientError::Network {
                status: Some(status),
                message,
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("HTTP error: {:?}", err);
        if err.is_decode() {
            return ClientError::Validation(format!("Response decode error: {}", err));
        }
        ClientError::Network {
            status: err.status().map(|s| s.as_u16()),
            message: format!("HTTP error: {}", err),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!("JSON error: {:?}", err);
        ClientError::Validation(format!("JSON error: {}", err))
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::Validation(format!("Schema validation failed: {}", err))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Storage error: {:?}", err);
        ClientError::Storage(format!("Storage error: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for ClientError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ClientError::Auth(format!("Token error: {}", err))
    }
}

/// Error body returned by the backend.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, ClientError>;
