//! # Storefront Gateways
//!
//! The network collaborators the core depends on, one trait per concern.
//! `storefront-http` implements all of them against the REST API; tests
//! substitute in-memory fakes.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     storefront backend                       │
//! │  ├── CatalogGateway        products, featured, by id         │
//! │  ├── OrderGateway          orders, checkout sessions         │
//! │  ├── SessionStatusGateway  checkout/status/{id}              │
//! │  └── FeedbackGateway       reviews, contact form             │
//! └──────────────────────────────────────────────────────────────┘
//!                               ▲
//!                 ┌─────────────┴─────────────┐
//!         ┌───────┴────────┐         ┌────────┴───────┐
//!         │ HttpStorefront │         │  test fakes    │
//!         │     Client     │         │                │
//!         └────────────────┘         └────────────────┘
//! ```

use crate::error::ShopResult;
use crate::order::{CheckoutSessionCreated, CheckoutSessionRequest, OrderReceipt, OrderRequest};
use crate::product::{ContactMessage, NewReview, Product, ProductQuery, Review};
use crate::session::SessionStatus;
use async_trait::async_trait;

/// Read access to the product catalog
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// List products matching `query` (filters are applied server-side)
    async fn list_products(&self, query: &ProductQuery) -> ShopResult<Vec<Product>>;

    /// Fetch one product; unknown ids yield `ShopError::ProductNotFound`
    async fn get_product(&self, product_id: &str) -> ShopResult<Product>;

    /// Products highlighted on the landing page
    async fn featured_products(&self) -> ShopResult<Vec<Product>>;
}

/// Order creation and payment handoff
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Create an order; a refusal is `ShopError::Rejected` with the backend detail
    async fn create_order(&self, order: &OrderRequest) -> ShopResult<OrderReceipt>;

    /// Ask the processor for a hosted checkout page for `request.order_id`
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> ShopResult<CheckoutSessionCreated>;
}

/// Settlement status of a processor session
#[async_trait]
pub trait SessionStatusGateway: Send + Sync {
    async fn session_status(&self, session_id: &str) -> ShopResult<SessionStatus>;
}

/// Reviews and the contact form
#[async_trait]
pub trait FeedbackGateway: Send + Sync {
    async fn reviews(&self, product_id: &str) -> ShopResult<Vec<Review>>;

    async fn submit_review(&self, review: &NewReview) -> ShopResult<()>;

    async fn send_contact(&self, message: &ContactMessage) -> ShopResult<()>;
}
