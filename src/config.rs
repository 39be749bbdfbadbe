use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Deployment configuration for the admin API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the admin REST backend, without a trailing slash.
    pub base_url: String,
    pub request_timeout_seconds: u64,
    /// Page size used when a view does not pick its own. Must be one of
    /// the allowed page sizes.
    pub default_page_size: u32,
    /// Remaining scroll distance (in pixels) below which the next page is
    /// requested.
    pub scroll_threshold_px: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_seconds: 30,
            default_page_size: 50,
            scroll_threshold_px: 100.0,
        }
    }
}

impl ClientConfig {
    /// Build a config from environment variables, falling back to defaults
    /// for anything unset or unparsable.
    ///
    /// Recognized variables: `ADMIN_API_BASE_URL`,
    /// `ADMIN_API_TIMEOUT_SECONDS`, `ADMIN_API_PAGE_SIZE`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = env::var("ADMIN_API_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Ok(raw) = env::var("ADMIN_API_TIMEOUT_SECONDS") {
            match raw.parse::<u64>() {
                Ok(seconds) if seconds > 0 => config.request_timeout_seconds = seconds,
                _ => warn!("Ignoring invalid ADMIN_API_TIMEOUT_SECONDS value: {}", raw),
            }
        }

        if let Ok(raw) = env::var("ADMIN_API_PAGE_SIZE") {
            match raw.parse::<u32>() {
                Ok(size) if crate::collection::ALLOWED_PAGE_SIZES.contains(&size) => {
                    config.default_page_size = size;
                }
                _ => warn!("Ignoring invalid ADMIN_API_PAGE_SIZE value: {}", raw),
            }
        }

        config
    }
}
