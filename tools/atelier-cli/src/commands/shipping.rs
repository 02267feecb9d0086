//! Shipping command.

use anyhow::Result;
use atelier_commerce::Money;
use serde::Serialize;

use super::ShippingArgs;
use crate::context::Context;
use crate::output::progress_bar;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShippingQuote {
    subtotal: Money,
    shipping: Money,
    remaining_for_free_shipping: Money,
    total: Money,
    free_shipping_progress: u8,
}

/// Run the shipping command.
pub fn run(args: ShippingArgs, ctx: &Context) -> Result<()> {
    let policy = ctx.config.storefront.shipping_policy();
    let subtotal = match args.subtotal {
        Some(amount) => Money::from_decimal(amount, ctx.config.storefront.currency),
        None => ctx.open_shop()?.session.subtotal(),
    };

    let quote = ShippingQuote {
        subtotal,
        shipping: policy.calculate_shipping(subtotal),
        remaining_for_free_shipping: policy.remaining_for_free_shipping(subtotal),
        total: policy.calculate_total(subtotal),
        free_shipping_progress: policy.free_shipping_progress(subtotal),
    };

    if ctx.output.is_json() {
        ctx.output.json(&quote);
        return Ok(());
    }

    ctx.output.header("Shipping");
    ctx.output.kv("Subtotal", &quote.subtotal.display());
    if quote.shipping.is_zero() {
        ctx.output.kv("Shipping", "Free");
    } else {
        ctx.output.kv("Shipping", &quote.shipping.display());
        ctx.output.kv(
            "Free shipping",
            &format!(
                "{} {} to go",
                progress_bar(quote.free_shipping_progress, 20),
                quote.remaining_for_free_shipping.display()
            ),
        );
    }
    ctx.output.kv("Total", &quote.total.display());
    Ok(())
}
