//! Proforma CLI - print link and invoice request tools.
//!
//! # Usage
//!
//! ```bash
//! # Issue a signed print URL
//! proforma-cli sign --order 1001 --shop your-store.myshopify.com
//!
//! # Verify a print link signature
//! proforma-cli verify --order 1001 --shop your-store.myshopify.com --sig <hex>
//!
//! # Print an order's invoice eligibility as JSON
//! proforma-cli eligibility --order 1001
//!
//! # Request invoicing for an order
//! proforma-cli request --order 1001
//! ```
//!
//! # Commands
//!
//! - `sign` / `verify` - HMAC print links
//! - `eligibility` / `request` - Invoice state against the Shopify Admin API

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "proforma-cli")]
#[command(author, version, about = "Proforma service tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a signed proforma print URL
    Sign {
        /// Order id (numeric or GID)
        #[arg(short, long)]
        order: String,

        /// Shop domain (your-store.myshopify.com)
        #[arg(short, long)]
        shop: String,
    },
    /// Verify a print link signature
    Verify {
        /// Order id exactly as it appears in the link path
        #[arg(short, long)]
        order: String,

        /// Shop exactly as it appears in the link query
        #[arg(short, long)]
        shop: String,

        /// Hex signature (`sig` query parameter)
        #[arg(long)]
        sig: String,
    },
    /// Print an order's invoice eligibility report
    Eligibility {
        /// Order id (numeric or GID)
        #[arg(short, long)]
        order: String,
    },
    /// Validate and request invoicing for an order
    Request {
        /// Order id (numeric or GID)
        #[arg(short, long)]
        order: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Sign { order, shop } => {
            let link = commands::links::sign(&order, &shop)?;
            println!("{}", link.url);
        }
        Commands::Verify { order, shop, sig } => {
            commands::links::verify(&order, &shop, &sig)?;
            println!("ok");
        }
        Commands::Eligibility { order } => {
            let report = commands::invoice::eligibility(&order).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Request { order } => {
            let payload = commands::invoice::request(&order).await?;
            println!("{}", payload.to_json()?);
        }
    }
    Ok(())
}
