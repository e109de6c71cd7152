//! # storefront-http
//!
//! REST client for the storefront backend.
//!
//! `HttpStorefrontClient` implements every gateway trait from
//! `storefront-core`, so one instance can back the catalog commands, the
//! order submitter and the confirmation poller at once.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storefront_core::{OrderSubmitter, PaymentConfirmationPoller};
//! use storefront_http::HttpStorefrontClient;
//!
//! // Reads STOREFRONT_API_URL (and .env if present)
//! let api = Arc::new(HttpStorefrontClient::from_env()?);
//!
//! let redirect = OrderSubmitter::new(api.clone())
//!     .submit_cart(&cart, form, "http://127.0.0.1:8765")
//!     .await?;
//!
//! // Send the customer to redirect.url
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::HttpStorefrontClient;
pub use config::{ApiConfig, DEFAULT_TIMEOUT_SECS};
