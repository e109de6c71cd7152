//! # Commands
//!
//! The `storefront` command surface and what each command does.

use crate::callback::{self, CheckoutReturn};
use crate::config::CliConfig;
use crate::render;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::sync::Arc;
use storefront_core::{
    clamp_to_stock, CartStore, CatalogGateway, CheckoutForm, ConfirmationState, ContactMessage,
    FeedbackGateway, NewReview, OrderSubmitter, PaymentConfirmationPoller, Product, ProductQuery,
    SharedCart, ShopError, ShopResult, DEFAULT_COUNTRY,
};
use storefront_http::HttpStorefrontClient;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "storefront", author, version, about = "Browse the shop, fill a cart and pay for it", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List products, optionally filtered
    Products(ProductsArgs),
    /// Show one product with its reviews
    Product { product_id: String },
    /// List featured products
    Featured,
    /// Inspect or change the cart
    #[command(subcommand)]
    Cart(CartCommand),
    /// Place the order and pay for it
    Checkout(CheckoutArgs),
    /// Confirm a payment session after returning from the payment page
    Confirm { session_id: String },
    /// Review a product
    Review(ReviewArgs),
    /// Send a message to the shop
    Contact(ContactArgs),
}

#[derive(Debug, Args)]
pub struct ProductsArgs {
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub min_price: Option<Decimal>,
    #[arg(long)]
    pub max_price: Option<Decimal>,
    #[arg(long)]
    pub search: Option<String>,
    /// Sort order understood by the backend (e.g. price_asc)
    #[arg(long)]
    pub sort: Option<String>,
}

impl ProductsArgs {
    pub fn query(&self) -> ProductQuery {
        let mut query = ProductQuery::new().price_range(self.min_price, self.max_price);
        if let Some(ref category) = self.category {
            query = query.category(category.clone());
        }
        if let Some(ref search) = self.search {
            query = query.search(search.clone());
        }
        if let Some(ref sort) = self.sort {
            query = query.sort(sort.clone());
        }
        query
    }
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Show lines and totals
    Show,
    /// Add a product, capped at what is left in stock
    Add {
        product_id: String,
        #[arg(default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product
    Remove { product_id: String },
    /// Set a line's quantity; 0 or less removes it
    Set {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub postal: String,
    #[arg(long, default_value = DEFAULT_COUNTRY)]
    pub country: String,
    /// Print the payment URL and exit instead of waiting for the return
    #[arg(long)]
    pub no_wait: bool,
}

impl CheckoutArgs {
    pub fn form(&self) -> CheckoutForm {
        CheckoutForm {
            customer_name: self.name.clone(),
            customer_email: self.email.clone(),
            shipping_address: self.address.clone(),
            shipping_city: self.city.clone(),
            shipping_postal: self.postal.clone(),
            shipping_country: self.country.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct ReviewArgs {
    pub product_id: String,
    #[arg(long)]
    pub author: String,
    /// 1 to 5
    #[arg(long)]
    pub rating: u8,
    #[arg(long, default_value = "")]
    pub comment: String,
}

#[derive(Debug, Args)]
pub struct ContactArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, default_value = "")]
    pub subject: String,
    #[arg(long)]
    pub message: String,
}

/// Run one command to completion
pub async fn execute(command: Command, config: &CliConfig) -> anyhow::Result<()> {
    let currency = config.settings.currency;

    match command {
        Command::Products(args) => {
            let products = connect()?
                .list_products(&args.query())
                .await
                .map_err(customer_error)?;
            println!("{}", render::product_list(&products, currency));
        }
        Command::Featured => {
            let products = connect()?
                .featured_products()
                .await
                .map_err(customer_error)?;
            println!("{}", render::product_list(&products, currency));
        }
        Command::Product { product_id } => {
            let api = connect()?;
            let product = api.get_product(&product_id).await.map_err(customer_error)?;
            let reviews = api.reviews(&product_id).await.unwrap_or_else(|e| {
                warn!("Reviews unavailable for {}: {}", product_id, e);
                Vec::new()
            });
            println!("{}", render::product_detail(&product, &reviews, currency));
        }
        Command::Cart(cart_command) => run_cart_command(cart_command, config).await?,
        Command::Checkout(args) => checkout(args, config).await?,
        Command::Confirm { session_id } => {
            let cart = config.open_cart()?.into_shared();
            confirm(connect()?, cart, Some(session_id), config).await?;
        }
        Command::Review(args) => {
            connect()?
                .submit_review(&NewReview {
                    product_id: args.product_id,
                    author: args.author,
                    rating: args.rating,
                    comment: args.comment,
                })
                .await
                .map_err(customer_error)?;
            println!("Thank you for your review!");
        }
        Command::Contact(args) => {
            connect()?
                .send_contact(&ContactMessage {
                    name: args.name,
                    email: args.email,
                    subject: args.subject,
                    message: args.message,
                })
                .await
                .map_err(customer_error)?;
            println!("Message sent. We will get back to you shortly.");
        }
    }

    Ok(())
}

fn connect() -> anyhow::Result<Arc<HttpStorefrontClient>> {
    Ok(Arc::new(HttpStorefrontClient::from_env()?))
}

/// Log the technical error, surface the customer-facing text
fn customer_error(err: ShopError) -> anyhow::Error {
    error!("{}", err);
    anyhow::anyhow!(err.user_message())
}

async fn run_cart_command(command: CartCommand, config: &CliConfig) -> anyhow::Result<()> {
    let mut cart = config.open_cart()?;

    match command {
        CartCommand::Show => {}
        CartCommand::Add {
            product_id,
            quantity,
        } => {
            let api = connect()?;
            let (product, added) = add_to_cart(api.as_ref(), &mut cart, &product_id, quantity)
                .await
                .map_err(customer_error)?;
            println!("Added {} × {}", added, product.name);
        }
        CartCommand::Remove { product_id } => cart.remove(&product_id)?,
        CartCommand::Set {
            product_id,
            quantity,
        } => {
            if !cart.contains(&product_id) {
                anyhow::bail!("{} is not in your cart", product_id);
            }
            cart.update_quantity(&product_id, quantity)?;
        }
        CartCommand::Clear => cart.clear()?,
    }

    println!(
        "{}",
        render::cart_summary(&cart, &config.settings.shipping, config.settings.currency)
    );
    Ok(())
}

/// Fetch `product_id` and add up to `requested` units of it.
///
/// The quantity is capped at the stock not already in the cart; returns the
/// product and how many units were actually added.
pub async fn add_to_cart(
    catalog: &dyn CatalogGateway,
    cart: &mut CartStore,
    product_id: &str,
    requested: u32,
) -> ShopResult<(Product, u32)> {
    let product = catalog.get_product(product_id).await?;
    let quantity = clamp_to_stock(&product, requested, cart.quantity_of(product_id))?;
    if quantity < requested {
        warn!(
            "Only {} of {} more {} available",
            quantity, requested, product.name
        );
    }

    cart.add(&product, i64::from(quantity))?;
    Ok((product, quantity))
}

async fn checkout(args: CheckoutArgs, config: &CliConfig) -> anyhow::Result<()> {
    let api = connect()?;
    let cart = config.open_cart()?;

    println!(
        "{}\n",
        render::cart_summary(&cart, &config.settings.shipping, config.settings.currency)
    );

    let redirect = OrderSubmitter::new(api.clone())
        .submit_cart(&cart, args.form(), &config.return_origin())
        .await
        .map_err(customer_error)?;

    println!(
        "Order {} created. Complete your payment at:\n\n  {}\n",
        redirect.order_id, redirect.url
    );

    if args.no_wait {
        println!("Once paid, run `storefront confirm <session_id>`.");
        return Ok(());
    }

    match callback::wait_for_return(config.callback_addr).await? {
        CheckoutReturn::Cancelled => {
            println!("Payment cancelled. Your cart is unchanged.");
            Ok(())
        }
        CheckoutReturn::Completed { session_id } => {
            let session_id = session_id.or(redirect.session_id);
            confirm(api, cart.into_shared(), session_id, config).await
        }
    }
}

async fn confirm(
    api: Arc<HttpStorefrontClient>,
    cart: SharedCart,
    session_id: Option<String>,
    config: &CliConfig,
) -> anyhow::Result<()> {
    let poller_config = config.poller_config();
    let mut handle = PaymentConfirmationPoller::new(api, cart)
        .with_config(poller_config)
        .start(session_id.clone());

    println!(
        "{}",
        render::confirmation_message(&ConfirmationState::Loading, config.settings.currency)
    );
    while let Some(progress) = handle.changed().await {
        if progress.state.is_terminal() {
            break;
        }
        info!(
            "Payment not settled yet, check {} of {}",
            progress.attempt + 1,
            poller_config.max_checks()
        );
    }

    let state = handle.wait().await;
    println!(
        "{}",
        render::confirmation_message(&state, config.settings.currency)
    );

    match state {
        ConfirmationState::Expired => Err(customer_error(ShopError::SessionExpired {
            session_id: session_id.unwrap_or_default(),
        })),
        ConfirmationState::Error(reason) => Err(anyhow::anyhow!(reason)),
        _ => Ok(()),
    }
}
