//! # Order Submission
//!
//! Turns a cart snapshot into a backend order, then into a hosted payment
//! page URL. Two round trips, no retries: any failure aborts the whole
//! submission and the customer resubmits explicitly.

use crate::cart::{CartStore, LineItem};
use crate::error::{ShopError, ShopResult};
use crate::gateway::OrderGateway;
use crate::order::{CheckoutForm, CheckoutRedirect, CheckoutSessionRequest, OrderRequest};
use std::sync::Arc;
use tracing::{error, info, instrument};

pub struct OrderSubmitter {
    orders: Arc<dyn OrderGateway>,
}

impl OrderSubmitter {
    pub fn new(orders: Arc<dyn OrderGateway>) -> Self {
        Self { orders }
    }

    /// Submit the current contents of `cart`. The cart itself is left alone;
    /// it is only cleared once payment is confirmed.
    pub async fn submit_cart(
        &self,
        cart: &CartStore,
        form: CheckoutForm,
        return_origin: &str,
    ) -> ShopResult<CheckoutRedirect> {
        self.submit(&cart.snapshot(), form, return_origin).await
    }

    /// Create the order for `lines` and obtain the redirect target.
    ///
    /// Validation happens before any network call: an empty cart, a blank
    /// form field or a blank origin fail with `ShopError::Validation`.
    #[instrument(skip(self, lines, form), fields(lines = lines.len()))]
    pub async fn submit(
        &self,
        lines: &[LineItem],
        form: CheckoutForm,
        return_origin: &str,
    ) -> ShopResult<CheckoutRedirect> {
        if lines.is_empty() {
            return Err(ShopError::Validation("your cart is empty".to_string()));
        }
        form.validate()?;
        if return_origin.trim().is_empty() {
            return Err(ShopError::Validation(
                "return origin is required".to_string(),
            ));
        }

        let order = OrderRequest::from_cart(form, lines);

        let receipt = self.orders.create_order(&order).await.map_err(|e| {
            error!("Order creation failed: {}", e);
            e
        })?;
        info!(
            "Order {} accepted: {} units",
            receipt.id,
            order.item_count()
        );

        let session = self
            .orders
            .create_checkout_session(&CheckoutSessionRequest {
                order_id: receipt.id.clone(),
                origin_url: return_origin.to_string(),
            })
            .await
            .map_err(|e| {
                error!("Checkout session creation failed for {}: {}", receipt.id, e);
                e
            })?;

        let url = session
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                error!("No checkout URL received for order {}", receipt.id);
                ShopError::Internal("no checkout URL received".to_string())
            })?;

        info!("Checkout session ready for order {}", receipt.id);

        Ok(CheckoutRedirect {
            url,
            order_id: receipt.id,
            session_id: session.session_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERIC_CHECKOUT_FAILURE;
    use crate::order::{CheckoutSessionCreated, OrderReceipt, DEFAULT_COUNTRY};
    use crate::product::Product;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeOrders {
        reject_order: Option<ShopError>,
        session_url: Option<String>,
        orders: Mutex<Vec<OrderRequest>>,
        sessions: Mutex<Vec<CheckoutSessionRequest>>,
    }

    impl FakeOrders {
        fn accepting() -> Self {
            Self {
                session_url: Some("https://pay.example/cs_test_1".into()),
                ..Default::default()
            }
        }

        fn calls(&self) -> (usize, usize) {
            (
                self.orders.lock().unwrap().len(),
                self.sessions.lock().unwrap().len(),
            )
        }
    }

    #[async_trait]
    impl OrderGateway for FakeOrders {
        async fn create_order(&self, order: &OrderRequest) -> ShopResult<OrderReceipt> {
            self.orders.lock().unwrap().push(order.clone());
            if let Some(ShopError::Rejected { status, detail }) = &self.reject_order {
                return Err(ShopError::Rejected {
                    status: *status,
                    detail: detail.clone(),
                });
            }
            Ok(OrderReceipt {
                id: "ord_42".into(),
                status: Some("pending".into()),
                total: None,
                created_at: None,
            })
        }

        async fn create_checkout_session(
            &self,
            request: &CheckoutSessionRequest,
        ) -> ShopResult<CheckoutSessionCreated> {
            self.sessions.lock().unwrap().push(request.clone());
            Ok(CheckoutSessionCreated {
                url: self.session_url.clone(),
                session_id: Some("cs_test_1".into()),
            })
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            customer_name: "Camille Martin".into(),
            customer_email: "camille@example.fr".into(),
            shipping_address: "12 rue des Lilas".into(),
            shipping_city: "Lyon".into(),
            shipping_postal: "69003".into(),
            shipping_country: DEFAULT_COUNTRY.into(),
        }
    }

    fn cart_with_items() -> CartStore {
        let mut cart = CartStore::load(MemoryStorage::new());
        cart.add(&Product::new("p1", "Sac", dec!(120), 3), 2).unwrap();
        cart.add(&Product::new("p2", "Collier", dec!(45), 5), 1).unwrap();
        cart
    }

    #[tokio::test]
    async fn test_empty_cart_rejected_before_network() {
        let gateway = Arc::new(FakeOrders::accepting());
        let submitter = OrderSubmitter::new(gateway.clone());
        let cart = CartStore::load(MemoryStorage::new());

        let err = submitter
            .submit_cart(&cart, form(), "http://localhost:3000")
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(gateway.calls(), (0, 0));
    }

    #[tokio::test]
    async fn test_blank_field_rejected_before_network() {
        let gateway = Arc::new(FakeOrders::accepting());
        let submitter = OrderSubmitter::new(gateway.clone());
        let mut incomplete = form();
        incomplete.customer_email = String::new();

        let err = submitter
            .submit_cart(&cart_with_items(), incomplete, "http://localhost:3000")
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "customer_email is required");
        assert_eq!(gateway.calls(), (0, 0));
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let gateway = Arc::new(FakeOrders::accepting());
        let submitter = OrderSubmitter::new(gateway.clone());
        let cart = cart_with_items();

        let redirect = submitter
            .submit_cart(&cart, form(), "http://localhost:3000")
            .await
            .unwrap();

        assert_eq!(redirect.url, "https://pay.example/cs_test_1");
        assert_eq!(redirect.order_id, "ord_42");
        assert_eq!(redirect.session_id.as_deref(), Some("cs_test_1"));

        let orders = gateway.orders.lock().unwrap();
        assert_eq!(orders[0].item_count(), 3);
        assert_eq!(orders[0].items()[0].product_id, "p1");

        let sessions = gateway.sessions.lock().unwrap();
        assert_eq!(sessions[0].order_id, "ord_42");
        assert_eq!(sessions[0].origin_url, "http://localhost:3000");

        // submission never touches the cart
        assert_eq!(cart.count(), 3);
    }

    #[tokio::test]
    async fn test_rejection_detail_forwarded() {
        let gateway = Arc::new(FakeOrders {
            reject_order: Some(ShopError::Rejected {
                status: 400,
                detail: Some("Stock insuffisant pour Sac".into()),
            }),
            ..FakeOrders::accepting()
        });
        let submitter = OrderSubmitter::new(gateway.clone());

        let err = submitter
            .submit_cart(&cart_with_items(), form(), "http://localhost:3000")
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Stock insuffisant pour Sac");
        assert_eq!(gateway.calls(), (1, 0));
    }

    #[tokio::test]
    async fn test_missing_redirect_url_aborts() {
        let gateway = Arc::new(FakeOrders::default());
        let submitter = OrderSubmitter::new(gateway.clone());

        let err = submitter
            .submit_cart(&cart_with_items(), form(), "http://localhost:3000")
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), GENERIC_CHECKOUT_FAILURE);
        assert_eq!(gateway.calls(), (1, 1));
    }
}
