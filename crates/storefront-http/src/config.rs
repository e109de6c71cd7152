//! # API Configuration
//!
//! Where the storefront backend lives and how long to wait for it.
//! Values come from the environment (a `.env` file is honored).

use std::env;
use std::time::Duration;
use storefront_core::{ShopError, ShopResult};

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Storefront API configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Backend origin, e.g. `https://shop.example.com`
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STOREFRONT_API_URL`
    ///
    /// Optional:
    /// - `STOREFRONT_HTTP_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> ShopResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let base_url = env::var("STOREFRONT_API_URL").map_err(|_| {
            ShopError::Configuration("STOREFRONT_API_URL not set".to_string())
        })?;

        let timeout = match env::var("STOREFRONT_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ShopError::Configuration(format!(
                    "STOREFRONT_HTTP_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Self::new(base_url).map(|config| config.with_timeout(Duration::from_secs(timeout)))
    }

    /// Create config for an explicit backend origin
    pub fn new(base_url: impl Into<String>) -> ShopResult<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ShopError::Configuration(format!(
                "API URL must start with http:// or https://, got {:?}",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Root all endpoints hang off
    pub fn api_root(&self) -> String {
        format!("{}/api", self.base_url)
    }

    /// Full URL of an endpoint path such as `products/featured`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_root(), path.trim_start_matches('/'))
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
