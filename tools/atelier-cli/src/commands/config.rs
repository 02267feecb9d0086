//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};
use atelier_commerce::coupon::format_coupon_discount;

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig};
use crate::context::Context;

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Validate => validate_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    let config = &ctx.config;
    let storefront = &config.storefront;

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }
    ctx.output.kv("currency", storefront.currency.code());
    ctx.output.kv("locale", &storefront.locale);
    ctx.output.kv("data_dir", &ctx.data_dir().display().to_string());

    // Shipping section
    let policy = storefront.shipping_policy();
    ctx.output.info("");
    ctx.output.info("[shipping]");
    ctx.output.kv("free_shipping_threshold", &policy.free_shipping_threshold.display());
    ctx.output.kv("flat_fee", &policy.flat_fee.display());

    // Price filter section
    let filter = &storefront.price_filter;
    ctx.output.info("");
    ctx.output.info("[price_filter]");
    ctx.output.kv("range", &format!("{} to {}", filter.min, filter.max));
    ctx.output.kv("step", &filter.step.to_string());
    ctx.output.kv("debounce_ms", &filter.debounce_ms.to_string());
    for preset in &filter.presets {
        ctx.output.list_item(&format!("{}: {}-{}", preset.label, preset.min, preset.max));
    }

    // Storage section
    ctx.output.info("");
    ctx.output.info("[storage]");
    ctx.output.kv("namespace", &storefront.storage.namespace);

    ctx.output.info("");
    ctx.output.info(&format!("{} products", config.products.len()));
    for coupon in &config.coupons {
        ctx.output.list_item(&format!("{} {}", coupon.code, format_coupon_discount(coupon)));
    }

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    let Some(path) = &ctx.config_path else {
        ctx.output.info("No config file found, using defaults");
        return Ok(());
    };

    // Reload so the file on disk is what gets checked.
    let config = CliConfig::load(path)?;
    if let Err(e) = config.validate() {
        bail!("{}: {:#}", path.display(), e);
    }

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "valid": true, "path": path }));
    } else {
        ctx.output.success(&format!("{} is valid", path.display()));
        ctx.output.kv("products", &config.products.len().to_string());
        ctx.output.kv("coupons", &config.coupons.len().to_string());
    }
    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let path = ctx.cwd.join("atelier.toml");

    if path.exists() && !force {
        bail!("{} already exists. Use --force to overwrite.", path.display());
    }

    fs::write(&path, generate_default_config())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    ctx.output.success(&format!("Created {}", path.display()));
    Ok(())
}
