//! Atelier CLI - drive the storefront state engine from a terminal.
//!
//! Commands:
//! - `atelier cart` - Show and edit the cart
//! - `atelier coupon` - Apply, remove and check coupon codes
//! - `atelier filter` - Show and edit the price range filter
//! - `atelier shipping` - Shipping fee for a subtotal
//! - `atelier config` - Show, validate or create configuration
//!
//! State is kept as JSON documents in the data directory, one file per
//! document, so consecutive invocations behave like one shopping session.

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CartArgs, ConfigArgs, CouponArgs, FilterArgs, ShippingArgs};

/// Atelier CLI - cart, coupons and price filter for the Atelier storefront
#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory holding session state (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or edit the cart
    Cart(CartArgs),

    /// Apply, remove or check coupon codes
    Coupon(CouponArgs),

    /// Show or edit the price range filter
    Filter(FilterArgs),

    /// Show the shipping fee for a subtotal
    Shipping(ShippingArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let ctx = context::Context::load(cli.config.as_deref(), cli.data_dir.as_deref(), output)?;

    // Execute command
    let result = match cli.command {
        Commands::Cart(args) => commands::cart::run(args, &ctx),
        Commands::Coupon(args) => commands::coupon::run(args, &ctx),
        Commands::Filter(args) => commands::filter::run(args, &ctx),
        Commands::Shipping(args) => commands::shipping::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
