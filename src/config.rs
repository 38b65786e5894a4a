//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::quota::DEFAULT_STORAGE_PATH;

/// Base URL of the Govee developer API.
pub const GOVEE_API_BASE_URL: &str = "https://developer-api.govee.com/v1";

/// Settings for a [`crate::GoveeClient`].
///
/// Every field except `api_key` has a default, so a config can be
/// deserialized from as little as `{"api_key": "..."}`.
///
/// # Examples
///
/// ```
/// use govee_lights_rs::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(r#"{"api_key": "secret"}"#).unwrap();
/// assert!(config.enable_rate_limiting);
/// assert_eq!(config.storage_path.to_str(), Some("govee_rate_limit.json"));
///
/// let config = ClientConfig::new("secret")
///     .storage_path("/var/lib/govee/quota.json")
///     .rate_limiting(false);
/// assert!(!config.enable_rate_limiting);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where the daily quota record is persisted.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    #[serde(default = "default_true")]
    pub enable_rate_limiting: bool,
    /// Per-request timeout in milliseconds; zero means the default.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ClientConfig {
    pub fn new(api_key: &str) -> Self {
        ClientConfig {
            api_key: api_key.to_string(),
            base_url: default_base_url(),
            storage_path: default_storage_path(),
            enable_rate_limiting: true,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    pub fn rate_limiting(mut self, enabled: bool) -> Self {
        self.enable_rate_limiting = enabled;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// The request timeout. A zero value falls back to the default.
    pub fn timeout(&self) -> Duration {
        match self.request_timeout_ms {
            0 => Duration::from_millis(default_request_timeout_ms()),
            ms => Duration::from_millis(ms),
        }
    }
}

fn default_base_url() -> String {
    GOVEE_API_BASE_URL.to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORAGE_PATH)
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_ms() -> u64 {
    10_000
}
