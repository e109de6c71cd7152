//! # Storefront Settings
//!
//! Tunables that are not secrets: display currency, shipping policy and the
//! confirmation retry budget. Loaded from `config/storefront.toml` when
//! present; every field has a default.
//!
//! ```toml
//! currency = "eur"
//!
//! [shipping]
//! free_threshold = 100
//! flat_rate = 9.90
//!
//! [poller]
//! max_attempts = 5
//! retry_delay_ms = 2000
//! ```

use crate::cart::ShippingPolicy;
use crate::money::Currency;
use crate::poller::{PollerConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub currency: Currency,

    #[serde(default)]
    pub shipping: ShippingPolicy,

    #[serde(default)]
    pub poller: PollerSettings,
}

impl Settings {
    /// Parse settings from a TOML document
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerSettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY.as_millis() as u64
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl From<PollerSettings> for PollerConfig {
    fn from(settings: PollerSettings) -> Self {
        PollerConfig {
            max_attempts: settings.max_attempts,
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
        }
    }
}
