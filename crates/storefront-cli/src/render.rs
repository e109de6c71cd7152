//! Terminal formatting for catalog, cart and payment outcomes.

use rust_decimal::Decimal;
use std::fmt::Write;
use storefront_core::{
    average_rating, CartStore, ConfirmationState, Currency, Money, Product, Review,
    ShippingPolicy,
};

fn price(amount: Decimal, currency: Currency) -> String {
    Money::new(amount, currency).display()
}

/// One catalog row
pub fn product_line(product: &Product, currency: Currency) -> String {
    let stock = if product.in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "out of stock".to_string()
    };
    format!(
        "{:<12} {:<32} {:>10}  ({})",
        product.id,
        product.name,
        price(product.price, currency),
        stock
    )
}

pub fn product_list(products: &[Product], currency: Currency) -> String {
    if products.is_empty() {
        return "No products found.".to_string();
    }
    products
        .iter()
        .map(|p| product_line(p, currency))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Product page with its reviews
pub fn product_detail(product: &Product, reviews: &[Review], currency: Currency) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", product.name, product.id);
    let _ = writeln!(out, "{}", price(product.price, currency));
    if !product.category.is_empty() {
        let _ = writeln!(out, "Category: {}", product.category);
    }
    if !product.description.is_empty() {
        let _ = writeln!(out, "\n{}", product.description);
    }
    if let Some(image) = product.cover_image() {
        let _ = writeln!(out, "\nImage: {}", image);
    }

    match average_rating(reviews) {
        None => {
            let _ = write!(out, "\nNo reviews yet.");
        }
        Some(avg) => {
            let _ = write!(out, "\nRated {:.1}/5 ({} reviews)", avg, reviews.len());
            for review in reviews {
                let _ = write!(out, "\n  {}★ {}: {}", review.rating, review.author, review.comment);
            }
        }
    }
    out
}

/// Cart lines with subtotal, shipping and total
pub fn cart_summary(cart: &CartStore, policy: &ShippingPolicy, currency: Currency) -> String {
    if cart.is_empty() {
        return "Your cart is empty.".to_string();
    }

    let mut out = String::new();
    for item in cart.items() {
        let _ = writeln!(
            out,
            "{:<12} {:<32} {:>3} × {:>10} = {:>10}",
            item.product.id,
            item.product.name,
            item.quantity,
            price(item.product.price, currency),
            price(item.total(), currency)
        );
    }

    let totals = cart.totals(policy);
    let _ = writeln!(out, "\n{} items", cart.count());
    let _ = writeln!(out, "Subtotal: {}", price(totals.subtotal, currency));
    if totals.shipping.is_zero() {
        let _ = writeln!(out, "Shipping: free");
    } else {
        let _ = writeln!(
            out,
            "Shipping: {} ({} more for free shipping)",
            price(totals.shipping, currency),
            price(totals.remaining_for_free_shipping, currency)
        );
    }
    let _ = write!(out, "Total:    {}", price(totals.total, currency));
    out
}

/// Final word on a payment confirmation
pub fn confirmation_message(state: &ConfirmationState, currency: Currency) -> String {
    match state {
        ConfirmationState::Loading => "Checking your payment...".to_string(),
        ConfirmationState::Success(status) => match status.amount(currency) {
            Some(amount) => format!("Payment confirmed: {}. Thank you for your order!", amount),
            None => "Payment confirmed. Thank you for your order!".to_string(),
        },
        ConfirmationState::Expired => {
            "Your payment session expired. Run `storefront checkout` again.".to_string()
        }
        ConfirmationState::Pending => {
            "Your payment is still being processed. You will receive a confirmation email once it completes."
                .to_string()
        }
        ConfirmationState::Error(reason) => {
            format!("We could not confirm your payment ({}).", reason)
        }
    }
}
