//! # storefront-cli
//!
//! Command-line storefront built on `storefront-core` and `storefront-http`.
//!
//! This crate provides:
//! - The `storefront` command surface (catalog, cart, checkout, reviews, contact)
//! - A local listener catching the return from the hosted payment page
//! - Terminal rendering of carts, products and payment outcomes
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `products` | List products (`--category`, `--min-price`, `--max-price`, `--search`, `--sort`) |
//! | `product <id>` | Product detail with reviews |
//! | `featured` | Featured products |
//! | `cart show\|add\|remove\|set\|clear` | Edit the persisted cart |
//! | `checkout` | Submit the order, wait for the payment return, confirm |
//! | `confirm <session_id>` | Confirm a payment session |
//! | `review <id>` | Review a product |
//! | `contact` | Contact the shop |

pub mod callback;
pub mod commands;
pub mod config;
pub mod render;

pub use commands::{execute, Cli, Command};
pub use config::CliConfig;
