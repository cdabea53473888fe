//! Configuration module for the ACM client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ClientError;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin, without the `/api/v1` prefix
    pub api_base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Path to the persisted session file
    pub session_path: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("ACM_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "ACM_API_BASE_URL must be an http(s) URL, got {}",
                api_base_url
            )));
        }

        let timeout_secs = match env::var("ACM_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                ClientError::Config(format!("Invalid ACM_REQUEST_TIMEOUT_SECS: {}", raw))
            })?,
            Err(_) => 10,
        };

        let session_path = env::var("ACM_SESSION_PATH")
            .unwrap_or_else(|_| "./data/session.json".to_string())
            .into();

        let log_level = env::var("ACM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            session_path,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("ACM_API_BASE_URL");
        env::remove_var("ACM_REQUEST_TIMEOUT_SECS");
        env::remove_var("ACM_SESSION_PATH");
        env::remove_var("ACM_LOG_LEVEL");

        let config = Config::from_env().unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.session_path, PathBuf::from("./data/session.json"));
        assert_eq!(config.log_level, "info");
    }
}
