//! # CLI Configuration
//!
//! Where the cart lives on disk, where the payment page sends the customer
//! back to, and the non-secret settings from `config/storefront.toml`.

use anyhow::Context;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use storefront_core::{CartStore, Currency, FileStorage, PollerConfig, Settings};

pub const DEFAULT_DATA_DIR: &str = ".storefront";
pub const DEFAULT_CALLBACK_ADDR: &str = "127.0.0.1:8765";

/// Searched in order; the first readable file wins
const SETTINGS_PATHS: [&str; 3] = [
    "config/storefront.toml",
    "../config/storefront.toml",
    "../../config/storefront.toml",
];

#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory holding the persisted cart
    pub data_dir: PathBuf,
    /// Local address the return-URL listener binds to
    pub callback_addr: SocketAddr,
    pub settings: Settings,
}

impl CliConfig {
    /// Load from environment variables and the settings file.
    ///
    /// `STOREFRONT_CURRENCY` overrides the file's `currency`.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("STOREFRONT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        let callback_addr = env::var("STOREFRONT_CALLBACK_ADDR")
            .unwrap_or_else(|_| DEFAULT_CALLBACK_ADDR.to_string());
        let callback_addr: SocketAddr = callback_addr
            .parse()
            .with_context(|| format!("Invalid STOREFRONT_CALLBACK_ADDR: {}", callback_addr))?;

        let mut settings = load_settings(&SETTINGS_PATHS.map(Path::new))?;
        if let Ok(currency) = env::var("STOREFRONT_CURRENCY") {
            settings.currency = currency
                .parse::<Currency>()
                .map_err(|e| anyhow::anyhow!("Invalid STOREFRONT_CURRENCY: {}", e))?;
        }

        Ok(Self {
            data_dir,
            callback_addr,
            settings,
        })
    }

    /// Origin the backend builds the success and cancel URLs from
    pub fn return_origin(&self) -> String {
        format!("http://{}", self.callback_addr)
    }

    /// Open the persisted cart (an unreadable cart file loads as empty)
    pub fn open_cart(&self) -> anyhow::Result<CartStore> {
        let storage = FileStorage::open(self.data_dir.clone())
            .with_context(|| format!("Cannot use data directory {}", self.data_dir.display()))?;
        Ok(CartStore::load(storage))
    }

    pub fn poller_config(&self) -> PollerConfig {
        self.settings.poller.into()
    }
}

/// Load settings from the first existing file in `paths`, or defaults
pub fn load_settings(paths: &[&Path]) -> anyhow::Result<Settings> {
    for path in paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let settings = Settings::from_toml(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            tracing::debug!("Loaded settings from {}", path.display());
            return Ok(settings);
        }
    }

    tracing::debug!("No settings file found, using defaults");
    Ok(Settings::default())
}
