//! # Storefront REST Client
//!
//! `reqwest` implementation of every storefront gateway. JSON in, JSON out;
//! non-2xx responses become `ShopError::Rejected` carrying the backend's
//! `detail` string when it sends one.

use crate::config::ApiConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use storefront_core::{
    CatalogGateway, CheckoutSessionCreated, CheckoutSessionRequest, ContactMessage,
    FeedbackGateway, NewReview, OrderGateway, OrderReceipt, OrderRequest, Product, ProductQuery,
    Review, SessionStatus, SessionStatusGateway, ShopError, ShopResult,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// HTTP client for the storefront backend
#[derive(Debug, Clone)]
pub struct HttpStorefrontClient {
    config: ApiConfig,
    client: Client,
}

impl HttpStorefrontClient {
    /// Create a client for `config`
    pub fn new(config: ApiConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ShopError::Configuration(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> ShopResult<Self> {
        let config = ApiConfig::from_env()?;
        Self::new(config)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> ShopResult<T> {
        let request = self.client.get(self.config.endpoint(path)).query(query);
        let body = self.execute(request).await?;
        parse(path, &body)
    }

    /// Send a request, returning the body of a 2xx response
    async fn execute(&self, request: RequestBuilder) -> ShopResult<String> {
        let response = request
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!("Storefront API error: status={}, body={}", status, body);
            return Err(rejection(status, &body));
        }

        Ok(body)
    }
}

#[async_trait]
impl CatalogGateway for HttpStorefrontClient {
    #[instrument(skip(self, query))]
    async fn list_products(&self, query: &ProductQuery) -> ShopResult<Vec<Product>> {
        let products: Vec<Product> = self.get_json("products", &query.to_pairs()).await?;
        debug!("Fetched {} products", products.len());
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get_product(&self, product_id: &str) -> ShopResult<Product> {
        match self
            .get_json(&format!("products/{}", product_id), &[])
            .await
        {
            Err(ShopError::Rejected { status: 404, .. }) => Err(ShopError::ProductNotFound {
                product_id: product_id.to_string(),
            }),
            other => other,
        }
    }

    #[instrument(skip(self))]
    async fn featured_products(&self) -> ShopResult<Vec<Product>> {
        self.get_json("products/featured", &[]).await
    }
}

#[async_trait]
impl OrderGateway for HttpStorefrontClient {
    #[instrument(skip(self, order), fields(items = order.items().len()))]
    async fn create_order(&self, order: &OrderRequest) -> ShopResult<OrderReceipt> {
        // One key per submission so a retried request cannot double-book
        let idempotency_key = Uuid::new_v4().to_string();

        let request = self
            .client
            .post(self.config.endpoint("orders"))
            .header("Idempotency-Key", &idempotency_key)
            .json(order);

        let body = self.execute(request).await.map_err(|e| {
            error!("Order rejected: {}", e);
            e
        })?;
        let receipt: OrderReceipt = parse("orders", &body)?;

        info!("Created order: id={}", receipt.id);
        Ok(receipt)
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> ShopResult<CheckoutSessionCreated> {
        let http = self
            .client
            .post(self.config.endpoint("checkout/create-session"))
            .json(request);

        let body = self.execute(http).await?;
        let created: CheckoutSessionCreated = parse("checkout/create-session", &body)?;

        info!(
            "Created checkout session: id={}",
            created.session_id.as_deref().unwrap_or("unknown")
        );
        Ok(created)
    }
}

#[async_trait]
impl SessionStatusGateway for HttpStorefrontClient {
    #[instrument(skip(self))]
    async fn session_status(&self, session_id: &str) -> ShopResult<SessionStatus> {
        let status: SessionStatus = self
            .get_json(&format!("checkout/status/{}", session_id), &[])
            .await?;
        debug!(
            "Session {}: payment_status={:?}, status={:?}",
            session_id, status.payment_status, status.status
        );
        Ok(status)
    }
}

#[async_trait]
impl FeedbackGateway for HttpStorefrontClient {
    #[instrument(skip(self))]
    async fn reviews(&self, product_id: &str) -> ShopResult<Vec<Review>> {
        self.get_json(&format!("reviews/{}", product_id), &[]).await
    }

    #[instrument(skip(self, review), fields(product_id = %review.product_id))]
    async fn submit_review(&self, review: &NewReview) -> ShopResult<()> {
        review.validate()?;
        let request = self.client.post(self.config.endpoint("reviews")).json(review);
        self.execute(request).await?;
        info!("Review submitted");
        Ok(())
    }

    #[instrument(skip(self, message))]
    async fn send_contact(&self, message: &ContactMessage) -> ShopResult<()> {
        message.validate()?;
        let request = self.client.post(self.config.endpoint("contact")).json(message);
        self.execute(request).await?;
        info!("Contact message sent");
        Ok(())
    }
}

// =============================================================================
// Response handling
// =============================================================================

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Map a non-2xx response to `ShopError::Rejected`.
///
/// Only a string `detail` is forwarded; structured validation payloads are
/// not meant for customers.
fn rejection(status: StatusCode, body: &str) -> ShopError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| match d {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        });

    ShopError::Rejected {
        status: status.as_u16(),
        detail,
    }
}

fn parse<T: DeserializeOwned>(endpoint: &str, body: &str) -> ShopResult<T> {
    serde_json::from_str(body).map_err(|e| {
        ShopError::Serialization(format!("failed to parse {} response: {}", endpoint, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use storefront_core::{CheckoutForm, LineItem, PaymentStatus, SessionState};
    use wiremock::matchers::{body_partial_json, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> HttpStorefrontClient {
        HttpStorefrontClient::new(ApiConfig::new(server.uri()).unwrap()).unwrap()
    }

    fn product_json(id: &str, price: f64) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Sac Élise",
            "description": "Cuir grainé",
            "price": price,
            "stock": 4,
            "category": "sacs",
            "images": ["https://cdn.example/elise.jpg"],
            "featured": true
        })
    }

    #[test]
    fn test_rejection_forwards_string_detail() {
        let err = rejection(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Stock insuffisant pour Sac Élise"}"#,
        );
        assert_eq!(err.user_message(), "Stock insuffisant pour Sac Élise");
    }

    #[test]
    fn test_rejection_ignores_structured_detail() {
        let err = rejection(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "customer_email"], "msg": "field required"}]}"#,
        );
        assert!(matches!(
            err,
            ShopError::Rejected {
                status: 422,
                detail: None
            }
        ));
    }

    #[test]
    fn test_rejection_non_json_body() {
        let err = rejection(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(
            err,
            ShopError::Rejected {
                status: 502,
                detail: None
            }
        ));
    }

    #[tokio::test]
    async fn test_list_products_sends_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products"))
            .and(query_param("category", "sacs"))
            .and(query_param("max_price", "150"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json("p1", 129.9)])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let products = client
            .list_products(
                &ProductQuery::new()
                    .category("sacs")
                    .price_range(None, Some(dec!(150))),
            )
            .await
            .unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, dec!(129.9));
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"detail": "Product not found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.get_product("missing").await.unwrap_err();

        assert!(matches!(err, ShopError::ProductNotFound { ref product_id } if product_id == "missing"));
    }

    #[tokio::test]
    async fn test_create_order_posts_flat_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/orders"))
            .and(header_exists("Idempotency-Key"))
            .and(body_partial_json(json!({
                "customer_name": "Camille Martin",
                "shipping_country": "France",
                "items": [{"product_id": "p1", "quantity": 2}]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "ord_42", "status": "pending"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let product: Product = serde_json::from_value(product_json("p1", 129.9)).unwrap();
        let order = OrderRequest::from_cart(
            CheckoutForm {
                customer_name: "Camille Martin".into(),
                customer_email: "camille@example.fr".into(),
                shipping_address: "12 rue des Lilas".into(),
                shipping_city: "Lyon".into(),
                shipping_postal: "69003".into(),
                shipping_country: "France".into(),
            },
            &[LineItem {
                product,
                quantity: 2,
            }],
        );

        let client = client_for(&server).await;
        let receipt = client.create_order(&order).await.unwrap();
        assert_eq!(receipt.id, "ord_42");
    }

    #[tokio::test]
    async fn test_create_order_rejected_with_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/orders"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"detail": "Stock insuffisant pour Sac Élise"})),
            )
            .mount(&server)
            .await;

        let order: OrderRequest = serde_json::from_value(json!({
            "customer_name": "a", "customer_email": "b", "shipping_address": "c",
            "shipping_city": "d", "shipping_postal": "e", "shipping_country": "France",
            "items": [{"product_id": "p1", "quantity": 9}]
        }))
        .unwrap();

        let client = client_for(&server).await;
        let err = client.create_order(&order).await.unwrap_err();
        assert_eq!(err.user_message(), "Stock insuffisant pour Sac Élise");
    }

    #[tokio::test]
    async fn test_session_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/checkout/status/cs_test_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "payment_status": "paid",
                "status": "complete",
                "amount_total": 25880,
                "currency": "eur",
                "metadata": {"order_id": "ord_42"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let status = client.session_status("cs_test_1").await.unwrap();

        assert_eq!(status.payment_status, PaymentStatus::Paid);
        assert_eq!(status.status, SessionState::Complete);
        assert_eq!(status.amount_total, Some(25880));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Grab a free port, then release it so nothing is listening
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let config = ApiConfig::new(format!("http://127.0.0.1:{}", port))
            .unwrap()
            .with_timeout(std::time::Duration::from_secs(2));
        let client = HttpStorefrontClient::new(config).unwrap();
        let err = client.session_status("cs_test_1").await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_invalid_review_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/reviews"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .submit_review(&NewReview {
                product_id: "p1".into(),
                author: "Léa".into(),
                rating: 9,
                comment: String::new(),
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_send_contact() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/contact"))
            .and(body_partial_json(json!({"email": "lea@example.fr"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client
            .send_contact(&ContactMessage {
                name: "Léa".into(),
                email: "lea@example.fr".into(),
                subject: "Livraison".into(),
                message: "Bonjour".into(),
            })
            .await
            .unwrap();
    }
}
