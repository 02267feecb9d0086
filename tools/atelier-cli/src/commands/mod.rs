//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod coupon;
pub mod filter;
pub mod shipping;

use clap::{Args, Subcommand, ValueEnum};

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart and the product catalog.
    Show,
    /// Add a product to the cart.
    Add {
        /// Product id or slug.
        product: String,
        /// Quantity to add.
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Set the quantity of a cart line (0 or less removes it).
    Set {
        /// Product id or slug.
        product: String,
        /// New quantity.
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product from the cart.
    Remove {
        /// Product id or slug.
        product: String,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the coupon command.
#[derive(Args)]
pub struct CouponArgs {
    #[command(subcommand)]
    pub command: CouponCommand,
}

#[derive(Subcommand)]
pub enum CouponCommand {
    /// Apply a coupon code to the cart.
    Apply {
        /// Coupon code (case-insensitive).
        code: String,
    },
    /// Remove the applied coupon.
    Remove,
    /// Check a code without applying it.
    Check {
        /// Coupon code (case-insensitive).
        code: String,
        /// Subtotal to check against instead of the cart's (major units).
        #[arg(long)]
        subtotal: Option<f64>,
    },
    /// List known coupons.
    List,
}

/// Arguments for the filter command.
#[derive(Args)]
pub struct FilterArgs {
    #[command(subcommand)]
    pub command: Option<FilterCommand>,
}

#[derive(Subcommand)]
pub enum FilterCommand {
    /// Show the current range and presets.
    Show,
    /// Set the lower bound.
    Min {
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
    /// Set the upper bound.
    Max {
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
    /// Move one bound as a key press would.
    Step {
        /// Which bound to move.
        #[arg(value_enum)]
        side: SideArg,
        /// Key: left, right, up, down, home or end.
        #[arg(value_enum)]
        key: KeyArg,
        /// Number of presses.
        #[arg(short, long, default_value_t = 1)]
        times: u32,
    },
    /// Apply a preset by label.
    Preset {
        /// Preset label (case-insensitive).
        label: String,
    },
    /// Clear the filter.
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SideArg {
    Min,
    Max,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KeyArg {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

/// Arguments for the shipping command.
#[derive(Args)]
pub struct ShippingArgs {
    /// Subtotal in major units (e.g. 397.50). Defaults to the cart subtotal.
    pub subtotal: Option<f64>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Validate the config file.
    Validate,
    /// Write a sample config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
