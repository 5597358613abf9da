// SPDX-License-Identifier: AGPL-3.0
// Civet Core - Client configuration
//
// The base URL comes from the environment, matching how the deployed
// clients are configured. Everything else has sensible defaults.

use crate::types::AppError;
use serde::{Deserialize, Serialize};

/// Quiet period for coalescing split writes, in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Client configuration (frontend-agnostic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the Civet API
    pub api_url: String,
    /// Platform identifier sent with every request
    pub platform: String,
    /// Debounce window for split sync, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            platform: "cli".to_string(),
            debounce_ms: default_debounce_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Build a config from the environment, falling back to defaults.
    ///
    /// Recognized variables: `CIVET_API_URL`, `CIVET_PLATFORM`,
    /// `CIVET_DEBOUNCE_MS`.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CIVET_API_URL") {
            if url.trim().is_empty() {
                return Err(AppError::InvalidConfig(
                    "CIVET_API_URL is set but empty".to_string(),
                ));
            }
            config.api_url = url;
        }

        if let Ok(platform) = std::env::var("CIVET_PLATFORM") {
            config.platform = platform;
        }

        if let Ok(ms) = std::env::var("CIVET_DEBOUNCE_MS") {
            config.debounce_ms = ms.parse().map_err(|_| {
                AppError::InvalidConfig(format!("CIVET_DEBOUNCE_MS is not a number: {}", ms))
            })?;
        }

        tracing::debug!("Config: api_url={}, platform={}", config.api_url, config.platform);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.platform, "cli");
    }

    #[test]
    fn test_debounce_default_survives_partial_json() {
        let config: AppConfig =
            serde_json::from_str(r#"{"api_url":"http://api.test","platform":"ios"}"#).unwrap();
        assert_eq!(config.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert_eq!(config.connect_timeout_secs, 10);
    }
}
