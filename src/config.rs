//! Runtime configuration.
//!
//! Values come from the environment (optionally seeded from a `.env` file)
//! and may be overridden by command-line flags.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for talking to the backend and for logging.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the API, without a trailing slash, e.g. `http://localhost:8000/api`.
    pub api_url: String,
    /// Bearer token for the signed-in manager.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// File the tracing subscriber writes to.
    pub log_file: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("API URL must start with http:// or https://, got {0:?}")]
    InvalidApiUrl(String),
}

impl Config {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                      |
    /// |-----------------------|------------------------------|
    /// | `ASSIGN_API_URL`      | `http://localhost:8000/api`  |
    /// | `ASSIGN_API_TOKEN`    | unset                        |
    /// | `ASSIGN_TIMEOUT_SECS` | `30`                         |
    /// | `ASSIGN_LOG_FILE`     | `$HOME/.assign/assign.log`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("ASSIGN_API_URL").unwrap_or_else(|| "http://localhost:8000/api".into());
        let token = lookup("ASSIGN_API_TOKEN").filter(|t| !t.trim().is_empty());

        let timeout_secs = match lookup("ASSIGN_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(ConfigError::InvalidTimeout { var: "ASSIGN_TIMEOUT_SECS", value: raw }),
            },
            None => 30,
        };

        let log_file = match lookup("ASSIGN_LOG_FILE") {
            Some(path) => PathBuf::from(path),
            None => {
                let home = lookup("HOME").unwrap_or_else(|| ".".to_string());
                PathBuf::from(home).join(".assign").join("assign.log")
            }
        };

        Config {
            api_url: String::new(),
            token,
            timeout: Duration::from_secs(timeout_secs),
            log_file,
        }
        .with_api_url(api_url)
    }

    /// Replace the API base URL, normalising away any trailing slash.
    pub fn with_api_url(mut self, api_url: String) -> Result<Self, ConfigError> {
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(api_url));
        }
        self.api_url = api_url.trim_end_matches('/').to_string();
        Ok(self)
    }
}
