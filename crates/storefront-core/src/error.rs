//! # Storefront Error Types
//!
//! Typed error handling for the storefront client.
//! All fallible operations return `Result<T, ShopError>`.

use thiserror::Error;

/// Message shown when a collaborator fails without saying why.
pub const GENERIC_CHECKOUT_FAILURE: &str = "checkout failed, please try again";

/// Core error type for all storefront operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (missing base URL, unreadable settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input rejected locally before any side effect
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Order or session creation refused by the backend
    #[error("Rejected by backend (HTTP {status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Rejected { status: u16, detail: Option<String> },

    /// Product not found in catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Network/HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Checkout session expired
    #[error("Checkout session expired: {session_id}")]
    SessionExpired { session_id: String },

    /// Durable cart storage could not be written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, ShopError::Network(_))
    }

    /// Returns true for errors raised before anything left the process
    pub fn is_validation(&self) -> bool {
        matches!(self, ShopError::Validation(_))
    }

    /// The text to show the customer in a notification.
    ///
    /// Validation messages and backend `detail` strings are passed through
    /// verbatim; everything else collapses to a generic failure description.
    pub fn user_message(&self) -> String {
        match self {
            ShopError::Validation(message) => message.clone(),
            ShopError::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ShopError::ProductNotFound { product_id } => {
                format!("product {} is no longer available", product_id)
            }
            ShopError::SessionExpired { .. } => {
                "your payment session expired, please start checkout again".to_string()
            }
            _ => GENERIC_CHECKOUT_FAILURE.to_string(),
        }
    }
}

impl From<serde_json::Error> for ShopError {
    fn from(err: serde_json::Error) -> Self {
        ShopError::Serialization(err.to_string())
    }
}

/// Result type alias for storefront operations
pub type ShopResult<T> = Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status: u16) -> ShopError {
        ShopError::Rejected {
            status,
            detail: None,
        }
    }

    #[test]
    fn test_retryable_errors() {
        assert!(ShopError::Network("timeout".into()).is_retryable());
        assert!(!ShopError::Validation("cart is empty".into()).is_retryable());
        assert!(!rejected(400).is_retryable());
    }

    #[test]
    fn test_user_message_forwards_detail() {
        let err = ShopError::Rejected {
            status: 400,
            detail: Some("Stock insuffisant pour Sac Élise".into()),
        };
        assert_eq!(err.user_message(), "Stock insuffisant pour Sac Élise");
    }

    #[test]
    fn test_user_message_falls_back_to_generic() {
        assert_eq!(
            rejected(500).user_message(),
            GENERIC_CHECKOUT_FAILURE
        );
        assert_eq!(
            ShopError::Network("connection reset".into()).user_message(),
            GENERIC_CHECKOUT_FAILURE
        );
    }

    #[test]
    fn test_rejected_display() {
        let err = rejected(502);
        assert_eq!(err.to_string(), "Rejected by backend (HTTP 502): no detail");
    }
}
