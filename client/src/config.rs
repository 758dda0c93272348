//! Client configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the client providers.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the platform API, no trailing slash.
    pub api_url: String,

    /// Per-request timeout for the HTTP client.
    pub request_timeout: Duration,

    /// Path of the persisted session record.
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// - `TICKETLINE_API_URL` (default `http://localhost:8080`)
    /// - `TICKETLINE_REQUEST_TIMEOUT_SECS` (default `30`)
    /// - `TICKETLINE_SESSION_FILE` (default `.ticketline/session.json`)
    #[must_use]
    pub fn from_env() -> Self {
        let api_url = std::env::var("TICKETLINE_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        let request_timeout = std::env::var("TICKETLINE_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(Duration::from_secs(30), Duration::from_secs);

        let session_file = std::env::var("TICKETLINE_SESSION_FILE")
            .map_or_else(|_| PathBuf::from(".ticketline/session.json"), PathBuf::from);

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            request_timeout,
            session_file,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            request_timeout: Duration::from_secs(30),
            session_file: PathBuf::from(".ticketline/session.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
