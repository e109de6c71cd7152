//! # Catalog Types
//!
//! Products, reviews and catalog queries as served by the storefront API.
//! The core never mutates these; it only snapshots products into the cart.

use crate::error::{ShopError, ShopResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Long description
    #[serde(default)]
    pub description: String,

    /// Unit price in major currency units. Read from JSON numbers or
    /// strings; written as an exact decimal string.
    pub price: Decimal,

    /// Units available for sale
    #[serde(default)]
    pub stock: u32,

    /// Category tag (e.g., "sacs", "bijoux")
    #[serde(default)]
    pub category: String,

    /// Image URLs, first one is the cover
    #[serde(default)]
    pub images: Vec<String>,

    /// Shown on the landing page
    #[serde(default)]
    pub featured: bool,
}

impl Product {
    /// Create a product with the fields the cart cares about
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        stock: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            stock,
            category: String::new(),
            images: Vec::new(),
            featured: false,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Cover image, if any
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Clamp a requested add-to-cart quantity against the product's stock.
///
/// `in_cart` is the quantity already held for this product. The result is
/// at least 1 and never exceeds what is still available. Fails when nothing
/// is left to add.
pub fn clamp_to_stock(product: &Product, requested: u32, in_cart: u32) -> ShopResult<u32> {
    if !product.in_stock() {
        return Err(ShopError::Validation(format!(
            "{} is out of stock",
            product.name
        )));
    }

    let available = product.stock.saturating_sub(in_cart);
    if available == 0 {
        return Err(ShopError::Validation(format!(
            "only {} of {} in stock, all already in your cart",
            product.stock, product.name
        )));
    }

    Ok(requested.max(1).min(available))
}

/// Catalog listing parameters, passed through verbatim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn price_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Query-string pairs in a stable order
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref category) = self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("min_price", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("max_price", max.to_string()));
        }
        if let Some(ref search) = self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(ref sort) = self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }
}

/// A published customer review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: String,
    pub product_id: String,
    pub author: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Average rating, `None` when there are no reviews
pub fn average_rating(reviews: &[Review]) -> Option<f32> {
    if reviews.is_empty() {
        return None;
    }
    let sum: u32 = reviews.iter().map(|r| r.rating as u32).sum();
    Some(sum as f32 / reviews.len() as f32)
}

/// A review to be submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub product_id: String,
    pub author: String,
    pub rating: u8,
    pub comment: String,
}

impl NewReview {
    pub fn validate(&self) -> ShopResult<()> {
        if self.author.trim().is_empty() {
            return Err(ShopError::Validation("author is required".to_string()));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(ShopError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        Ok(())
    }
}

/// A message sent through the contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    pub fn validate(&self) -> ShopResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(ShopError::Validation(format!("{} is required", field)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_product_from_api_json() {
        let json = r#"{
            "id": "sac-elise",
            "name": "Sac Élise",
            "price": 189.9,
            "stock": 4,
            "category": "sacs",
            "images": ["https://cdn.example/elise.jpg"],
            "rating": 4.5
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, dec!(189.9));
        assert_eq!(product.stock, 4);
        assert_eq!(product.cover_image(), Some("https://cdn.example/elise.jpg"));
        assert!(!product.featured);
    }

    #[test]
    fn test_price_written_as_exact_string() {
        let product = Product::new("p1", "Bracelet", dec!(45.10), 3);
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["price"], "45.10");

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back.price, dec!(45.10));
    }

    #[test]
    fn test_clamp_to_stock() {
        let product = Product::new("p1", "Bracelet", dec!(45), 3);

        assert_eq!(clamp_to_stock(&product, 2, 0).unwrap(), 2);
        assert_eq!(clamp_to_stock(&product, 10, 0).unwrap(), 3);
        assert_eq!(clamp_to_stock(&product, 0, 0).unwrap(), 1);
        assert_eq!(clamp_to_stock(&product, 5, 2).unwrap(), 1);
        assert!(clamp_to_stock(&product, 1, 3).is_err());
    }

    #[test]
    fn test_clamp_out_of_stock() {
        let product = Product::new("p1", "Bracelet", dec!(45), 0);
        let err = clamp_to_stock(&product, 1, 0).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_query_pairs() {
        let query = ProductQuery::new()
            .category("bijoux")
            .price_range(None, Some(dec!(150)))
            .sort("price_asc");

        assert_eq!(
            query.to_pairs(),
            vec![
                ("category", "bijoux".to_string()),
                ("max_price", "150".to_string()),
                ("sort", "price_asc".to_string()),
            ]
        );
    }

    #[test]
    fn test_average_rating() {
        let review = |rating| Review {
            id: String::new(),
            product_id: "p1".into(),
            author: "Camille".into(),
            rating,
            comment: String::new(),
            created_at: None,
        };
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[review(5), review(4)]), Some(4.5));
    }

    #[test]
    fn test_new_review_validation() {
        let mut review = NewReview {
            product_id: "p1".into(),
            author: "Camille".into(),
            rating: 6,
            comment: "Superbe".into(),
        };
        assert!(review.validate().is_err());
        review.rating = 5;
        assert!(review.validate().is_ok());
    }
}
