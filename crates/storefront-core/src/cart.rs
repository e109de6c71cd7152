//! # Cart Store
//!
//! The single source of truth for the customer's cart.
//!
//! Every mutation is computed on a copy, flushed to durable storage, and only
//! then committed to memory and broadcast to subscribers. A failed flush
//! leaves the store exactly as it was, so the persisted cart always
//! reconstructs the in-memory one.

use crate::error::{ShopError, ShopResult};
use crate::product::Product;
use crate::storage::CartStorage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

/// Storage key holding the serialized cart
pub const CART_STORAGE_KEY: &str = "storefront_cart";

/// A cart shared between tasks (e.g. the checkout flow and the poller)
pub type SharedCart = Arc<Mutex<CartStore>>;

/// A product/quantity pairing inside the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Full product snapshot taken when the item was last added
    pub product: Product,
    /// Always ≥ 1 inside a `CartStore`
    pub quantity: u32,
}

impl LineItem {
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// Unit price × quantity
    pub fn total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Flat-rate shipping with a free-shipping threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingPolicy {
    /// Subtotal from which shipping is free
    pub free_threshold: Decimal,
    /// Cost below the threshold
    pub flat_rate: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_threshold: Decimal::new(100, 0),
            flat_rate: Decimal::new(990, 2),
        }
    }
}

impl ShippingPolicy {
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal >= self.free_threshold {
            Decimal::ZERO
        } else {
            self.flat_rate
        }
    }
}

/// Derived amounts for display at cart and checkout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    /// How much more to spend for free shipping (zero once reached)
    pub remaining_for_free_shipping: Decimal,
}

/// Owns the line items and their persisted copy.
pub struct CartStore {
    items: Vec<LineItem>,
    storage: Box<dyn CartStorage>,
    notifier: watch::Sender<Vec<LineItem>>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the cart from storage.
    ///
    /// Missing or corrupt data yields an empty cart; this never fails.
    pub fn load(storage: impl CartStorage + 'static) -> Self {
        let items = match storage.load(CART_STORAGE_KEY) {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<LineItem>>(&raw) {
                Ok(items) => normalize(items),
                Err(e) => {
                    warn!("Discarding corrupt stored cart: {}", e);
                    Vec::new()
                }
            },
        };

        debug!("Cart loaded with {} line items", items.len());
        let (notifier, _) = watch::channel(items.clone());

        Self {
            items,
            storage: Box::new(storage),
            notifier,
        }
    }

    /// Wrap into a `SharedCart`
    pub fn into_shared(self) -> SharedCart {
        Arc::new(Mutex::new(self))
    }

    /// Add `quantity` units of `product`.
    ///
    /// Merges into an existing line (refreshing its product snapshot) or
    /// appends a new one. A non-positive quantity never creates a line: it
    /// decrements an existing one and removes it once it reaches zero.
    pub fn add(&mut self, product: &Product, quantity: i64) -> ShopResult<()> {
        let mut items = self.items.clone();

        match items.iter().position(|i| i.product.id == product.id) {
            Some(idx) => {
                let next = i64::from(items[idx].quantity)
                    .checked_add(quantity)
                    .ok_or_else(|| {
                        ShopError::Validation(format!("quantity {} is out of range", quantity))
                    })?;
                if next <= 0 {
                    items.remove(idx);
                } else {
                    items[idx].quantity = to_quantity(next)?;
                    items[idx].product = product.clone();
                }
            }
            None if quantity > 0 => items.push(LineItem {
                product: product.clone(),
                quantity: to_quantity(quantity)?,
            }),
            None => return Ok(()),
        }

        self.commit(items)
    }

    /// Remove the line for `product_id`, if any
    pub fn remove(&mut self, product_id: &str) -> ShopResult<()> {
        if !self.contains(product_id) {
            return Ok(());
        }
        let items = self
            .items
            .iter()
            .filter(|i| i.product.id != product_id)
            .cloned()
            .collect();
        self.commit(items)
    }

    /// Set the quantity of an existing line in place; `≤ 0` removes it
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> ShopResult<()> {
        if quantity <= 0 {
            return self.remove(product_id);
        }
        let Some(idx) = self.position(product_id) else {
            return Ok(());
        };

        let mut items = self.items.clone();
        items[idx].quantity = to_quantity(quantity)?;
        self.commit(items)
    }

    /// Empty the cart
    pub fn clear(&mut self) -> ShopResult<()> {
        self.commit(Vec::new())
    }

    /// Sum of price × quantity, computed on every call
    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::total).sum()
    }

    /// Sum of quantities
    pub fn count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Subtotal, shipping and grand total under `policy`
    pub fn totals(&self, policy: &ShippingPolicy) -> CartTotals {
        let subtotal = self.total();
        let shipping = policy.shipping_for(subtotal);
        CartTotals {
            subtotal,
            shipping,
            total: subtotal + shipping,
            remaining_for_free_shipping: (policy.free_threshold - subtotal).max(Decimal::ZERO),
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Owned copy of the current lines
    pub fn snapshot(&self) -> Vec<LineItem> {
        self.items.clone()
    }

    pub fn get(&self, product_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product.id == product_id)
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.position(product_id).is_some()
    }

    /// Quantity held for `product_id` (0 when absent)
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.get(product_id).map(|i| i.quantity).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Observe the cart after every committed mutation
    pub fn subscribe(&self) -> watch::Receiver<Vec<LineItem>> {
        self.notifier.subscribe()
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.product.id == product_id)
    }

    fn commit(&mut self, items: Vec<LineItem>) -> ShopResult<()> {
        let raw = serde_json::to_string(&items)?;
        self.storage.save(CART_STORAGE_KEY, &raw)?;

        self.items = items;
        self.notifier.send_replace(self.items.clone());
        debug!(
            "Cart persisted: {} lines, {} units",
            self.items.len(),
            self.count()
        );
        Ok(())
    }
}

fn to_quantity(value: i64) -> ShopResult<u32> {
    u32::try_from(value)
        .map_err(|_| ShopError::Validation(format!("quantity {} is out of range", value)))
}

/// Enforce line invariants on data read back from storage
fn normalize(raw: Vec<LineItem>) -> Vec<LineItem> {
    let mut items: Vec<LineItem> = Vec::with_capacity(raw.len());
    for item in raw {
        if item.quantity == 0 {
            warn!("Dropping stored line {} with zero quantity", item.product.id);
            continue;
        }
        match items.iter_mut().find(|i| i.product.id == item.product.id) {
            Some(existing) => {
                warn!("Merging duplicate stored line {}", item.product.id);
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => items.push(item),
        }
    }
    items
}
