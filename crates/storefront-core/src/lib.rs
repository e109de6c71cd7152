//! # storefront-core
//!
//! Client-side core of the storefront: cart, order submission and
//! payment confirmation.
//!
//! This crate provides:
//! - `CartStore` for the persisted, single-device cart
//! - `OrderSubmitter` for turning the cart into a hosted payment page URL
//! - `PaymentConfirmationPoller` for settling the payment after the
//!   customer returns from the processor
//! - Gateway traits the network layer implements
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use storefront_core::{CartStore, FileStorage, OrderSubmitter, PaymentConfirmationPoller};
//!
//! // Restore the cart from disk (an unreadable file just means an empty cart)
//! let mut cart = CartStore::load(FileStorage::open(".storefront")?);
//! cart.add(&product, 2)?;
//!
//! // Hand off to the processor
//! let redirect = OrderSubmitter::new(api.clone())
//!     .submit_cart(&cart, form, "http://127.0.0.1:8765")
//!     .await?;
//!
//! // ...customer pays and comes back with a session id...
//! let cart = cart.into_shared();
//! let state = PaymentConfirmationPoller::new(api, cart.clone())
//!     .run(Some(&session_id))
//!     .await;
//! ```

pub mod cart;
pub mod error;
pub mod gateway;
pub mod money;
pub mod order;
pub mod poller;
pub mod product;
pub mod session;
pub mod settings;
pub mod storage;
pub mod submitter;

// Re-exports for convenience
pub use cart::{CartStore, CartTotals, LineItem, SharedCart, ShippingPolicy, CART_STORAGE_KEY};
pub use error::{ShopError, ShopResult, GENERIC_CHECKOUT_FAILURE};
pub use gateway::{CatalogGateway, FeedbackGateway, OrderGateway, SessionStatusGateway};
pub use money::{Currency, Money};
pub use order::{
    CheckoutForm, CheckoutRedirect, CheckoutSessionCreated, CheckoutSessionRequest, OrderItem,
    OrderReceipt, OrderRequest, DEFAULT_COUNTRY,
};
pub use poller::{
    evaluate, ConfirmationListener, ConfirmationState, PaymentConfirmationPoller, PollHandle,
    PollState, PollerConfig, Step,
};
pub use product::{
    average_rating, clamp_to_stock, ContactMessage, NewReview, Product, ProductQuery, Review,
};
pub use session::{PaymentStatus, SessionState, SessionStatus};
pub use settings::{PollerSettings, Settings};
pub use storage::{CartStorage, FileStorage, MemoryStorage};
pub use submitter::OrderSubmitter;
