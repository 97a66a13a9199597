//! Client configuration loaded from environment variables.

use crate::auth::StaticCredentials;

/// Platform client configuration.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// API base URL, no trailing slash (default:
    /// `http://localhost:5000/api`).
    pub base_url: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Bearer token, when the embedding provides one via the environment.
    pub token: Option<String>,
}

impl PlatformConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                           | Default                     |
    /// |-----------------------------------|-----------------------------|
    /// | `ASTROVAULT_API_URL`              | `http://localhost:5000/api` |
    /// | `ASTROVAULT_REQUEST_TIMEOUT_SECS` | `30`                        |
    /// | `ASTROVAULT_TOKEN`                | unset                       |
    pub fn from_env() -> Self {
        let base_url = std::env::var("ASTROVAULT_API_URL")
            .unwrap_or_else(|_| "http://localhost:5000/api".into());

        let request_timeout_secs: u64 = std::env::var("ASTROVAULT_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("ASTROVAULT_REQUEST_TIMEOUT_SECS must be a valid u64");

        let token = std::env::var("ASTROVAULT_TOKEN").ok();

        Self {
            base_url,
            request_timeout_secs,
            token,
        }
    }

    /// Credentials built from the configured token, signed out when none
    /// is set.
    pub fn credentials(&self) -> StaticCredentials {
        match &self.token {
            Some(token) => StaticCredentials::signed_in(token.clone()),
            None => StaticCredentials::signed_out(),
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            request_timeout_secs: 30,
            token: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
