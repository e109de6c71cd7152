//! # Order Types
//!
//! Order and checkout-session payloads exchanged with the storefront API.

use crate::cart::LineItem;
use crate::error::{ShopError, ShopResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default shipping country offered by the checkout form
pub const DEFAULT_COUNTRY: &str = "France";

/// Customer and shipping fields collected at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub customer_name: String,
    pub customer_email: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_postal: String,
    #[serde(default = "default_country")]
    pub shipping_country: String,
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

impl CheckoutForm {
    /// Reject the form if any required field is blank
    pub fn validate(&self) -> ShopResult<()> {
        let fields = [
            ("customer_name", &self.customer_name),
            ("customer_email", &self.customer_email),
            ("shipping_address", &self.shipping_address),
            ("shipping_city", &self.shipping_city),
            ("shipping_postal", &self.shipping_postal),
            ("shipping_country", &self.shipping_country),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ShopError::Validation(format!("{} is required", name)));
            }
        }
        Ok(())
    }
}

/// A `{product_id, quantity}` pair captured from the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: u32,
}

impl From<&LineItem> for OrderItem {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product.id.clone(),
            quantity: item.quantity,
        }
    }
}

/// The body of `POST orders`. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(flatten)]
    form: CheckoutForm,
    items: Vec<OrderItem>,
}

impl OrderRequest {
    /// Snapshot the cart lines into an order
    pub fn from_cart(form: CheckoutForm, lines: &[LineItem]) -> Self {
        Self {
            form,
            items: lines.iter().map(OrderItem::from).collect(),
        }
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Total units ordered
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// What the backend returns once an order is accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The body of `POST checkout/create-session`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub order_id: String,
    pub origin_url: String,
}

/// The raw answer of `POST checkout/create-session`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionCreated {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Where to send the customer to pay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRedirect {
    /// Hosted payment page URL
    pub url: String,

    /// Order this payment belongs to
    #[serde(default)]
    pub order_id: String,

    /// Processor session id, when the backend reports it up front
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;
    use rust_decimal_macros::dec;

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

    #[test]
    fn test_form_validation() {
        assert!(form().validate().is_ok());

        let mut blank = form();
        blank.shipping_city = "   ".into();
        let err = blank.validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: shipping_city is required");
    }

    #[test]
    fn test_order_request_wire_shape() {
        let lines = vec![
            LineItem {
                product: Product::new("p1", "Sac", dec!(120), 3),
                quantity: 2,
            },
            LineItem {
                product: Product::new("p2", "Collier", dec!(45), 8),
                quantity: 1,
            },
        ];

        let order = OrderRequest::from_cart(form(), &lines);
        assert_eq!(order.item_count(), 3);

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["customer_name"], "Camille Martin");
        assert_eq!(json["shipping_country"], "France");
        assert_eq!(json["items"][0]["product_id"], "p1");
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["items"][1]["product_id"], "p2");
    }

    #[test]
    fn test_receipt_tolerates_extra_fields() {
        let json = r#"{"id":"ord_1","status":"pending","total":249.9,"items":[]}"#;
        let receipt: OrderReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.id, "ord_1");
        assert_eq!(receipt.total, Some(dec!(249.9)));
    }
}
