//! Cart commands.

use anyhow::Result;
use atelier_commerce::checkout::CheckoutTotals;
use atelier_commerce::session::StorefrontSession;
use dialoguer::Confirm;
use serde::Serialize;

use super::{CartArgs, CartCommand};
use crate::context::{Context, Shop};
use crate::output::{money_cell, progress_bar};

/// Run the cart command.
pub fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let Shop { mut session, .. } = ctx.open_shop()?;

    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => {
            show_cart(&session, ctx);
            if !ctx.output.is_json() {
                show_catalog(ctx);
            }
            return Ok(());
        }
        CartCommand::Add { product, quantity } => {
            let product = ctx.find_product(&product)?;
            let name = product.name.clone();
            if session.add_item(product, quantity) {
                ctx.output.success(&format!("Added {} x {}", quantity, name));
            } else {
                ctx.output.warn("Nothing added: quantity must be at least 1");
            }
        }
        CartCommand::Set { product, quantity } => {
            let product = ctx.find_product(&product)?;
            if session.update_quantity(&product.id, quantity) {
                ctx.output.success(&set_quantity_message(&product.name, quantity));
            } else {
                ctx.output.warn(&format!("{} is not in the cart", product.name));
            }
        }
        CartCommand::Remove { product } => {
            let product = ctx.find_product(&product)?;
            if session.remove_item(&product.id) {
                ctx.output.success(&format!("Removed {}", product.name));
            } else {
                ctx.output.warn(&format!("{} is not in the cart", product.name));
            }
        }
        CartCommand::Clear { yes } => {
            if session.cart().is_empty() {
                ctx.output.info("Cart is already empty");
            } else {
                if !yes && !ctx.output.is_json() {
                    let confirmed = Confirm::new()
                        .with_prompt(format!("Remove all {} items?", session.item_count()))
                        .default(false)
                        .interact()?;

                    if !confirmed {
                        ctx.output.warn("Cart left unchanged");
                        return Ok(());
                    }
                }
                session.clear_cart();
                ctx.output.success("Cart cleared");
            }
        }
    }

    report_coupon_notice(&mut session, ctx);
    show_cart(&session, ctx);
    Ok(())
}

/// Tell the user when a cart change knocked out the applied coupon.
pub fn report_coupon_notice(session: &mut StorefrontSession, ctx: &Context) {
    if let Some(reason) = session.take_coupon_notice() {
        let message = session.coupon_message(&reason);
        ctx.output.warn(&format!("Coupon {} removed: {}", reason.code(), message));
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartView<'a> {
    items: &'a [atelier_commerce::cart::CartItem],
    item_count: u64,
    applied_coupon: Option<&'a str>,
    totals: CheckoutTotals,
    free_shipping_progress: u8,
}

/// Print the cart lines and totals.
pub fn show_cart(session: &StorefrontSession, ctx: &Context) {
    let totals = session.totals();

    if ctx.output.is_json() {
        ctx.output.json(&CartView {
            items: session.items(),
            item_count: session.item_count(),
            applied_coupon: session.applied_coupon().map(|a| a.coupon.code.as_str()),
            totals,
            free_shipping_progress: session.free_shipping_progress(),
        });
        return;
    }

    ctx.output.header(&format!("Cart ({} items)", session.item_count()));
    if session.cart().is_empty() {
        ctx.output.info("Your cart is empty");
    } else {
        let widths = [24, 5, 12, 12];
        ctx.output.table_row(&["Product", "Qty", "Unit", "Total"], &widths);
        for item in session.items() {
            ctx.output.table_row(
                &[
                    &item.product.name,
                    &item.quantity.to_string(),
                    &item.product.unit_price.display(),
                    &item.line_total().display(),
                ],
                &widths,
            );
        }
    }

    ctx.output.info("");
    ctx.output.kv("Subtotal", &totals.subtotal.display());
    if let Some(applied) = session.applied_coupon() {
        ctx.output.kv(
            &format!("Discount ({})", applied.coupon.code),
            &money_cell(totals.discount, true),
        );
    }
    if totals.shipping.is_zero() {
        ctx.output.kv("Shipping", "Free");
    } else {
        ctx.output.kv("Shipping", &totals.shipping.display());
        ctx.output.kv(
            "Free shipping",
            &format!(
                "{} {} to go",
                progress_bar(session.free_shipping_progress(), 20),
                totals.remaining_for_free_shipping.display()
            ),
        );
    }
    ctx.output.kv("Total", &totals.total.display());
}

fn show_catalog(ctx: &Context) {
    let catalog = ctx.catalog();
    if catalog.is_empty() {
        ctx.output.info("No products configured. Run `atelier config init` for a sample catalog.");
        return;
    }
    ctx.output.header("Catalog");
    for product in catalog.products() {
        ctx.output.list_item(&format!(
            "{} ({}) {}",
            product.name,
            product.id,
            product.unit_price.display()
        ));
    }
}

/// Outcome line for `cart set`. Zero or less removes the line.
fn set_quantity_message(name: &str, quantity: i64) -> String {
    if quantity <= 0 {
        format!("Removed {}", name)
    } else {
        format!("{} quantity set to {}", name, quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_quantity_message() {
        assert_eq!(set_quantity_message("Fine Chain", 3), "Fine Chain quantity set to 3");
        assert_eq!(set_quantity_message("Fine Chain", 0), "Removed Fine Chain");
        assert_eq!(set_quantity_message("Fine Chain", -2), "Removed Fine Chain");
    }
}
