//! # storefront
//!
//! Shop from the terminal.
//!
//! ## Usage
//!
//! ```bash
//! # Point at the backend
//! export STOREFRONT_API_URL=https://shop.example.com
//!
//! storefront products --category sacs
//! storefront cart add p1 2
//! storefront checkout --name "Camille Martin" --email camille@example.fr \
//!     --address "12 rue des Lilas" --city Lyon --postal 69003
//! ```

use clap::Parser;
use storefront_cli::{execute, Cli, CliConfig};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr keeps stdout for command output)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = CliConfig::from_env()?;
    execute(cli.command, &config).await
}
