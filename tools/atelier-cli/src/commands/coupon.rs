//! Coupon commands.

use anyhow::{bail, Result};
use atelier_commerce::coupon::{format_coupon_discount, CouponValidation};
use atelier_commerce::Money;
use serde::Serialize;

use super::{CouponArgs, CouponCommand};
use crate::commands::cart::show_cart;
use crate::context::{Context, Shop};
use crate::output::active_badge;

/// Run the coupon command.
pub fn run(args: CouponArgs, ctx: &Context) -> Result<()> {
    match args.command {
        CouponCommand::Apply { code } => apply(&code, ctx),
        CouponCommand::Remove => remove(ctx),
        CouponCommand::Check { code, subtotal } => check(&code, subtotal, ctx),
        CouponCommand::List => list(ctx),
    }
}

fn apply(code: &str, ctx: &Context) -> Result<()> {
    let Shop { mut session, .. } = ctx.open_shop()?;

    match session.apply_coupon(code) {
        Ok(applied) => {
            ctx.output.success(&format!(
                "Coupon {} applied ({}), you save {}",
                applied.coupon.code,
                format_coupon_discount(&applied.coupon),
                applied.discount.display()
            ));
            show_cart(&session, ctx);
            Ok(())
        }
        Err(e) => {
            let message = session.coupon_message(&e);
            if ctx.output.is_json() {
                ctx.output.json(&CouponValidation::from_result(
                    &Err(e),
                    session.coupons().catalog(),
                    &ctx.config.storefront.locale,
                ));
            }
            bail!(message)
        }
    }
}

fn remove(ctx: &Context) -> Result<()> {
    let Shop { mut session, .. } = ctx.open_shop()?;
    match session.remove_coupon() {
        Some(removed) => ctx.output.success(&format!("Coupon {} removed", removed.coupon.code)),
        None => ctx.output.info("No coupon was applied"),
    }
    show_cart(&session, ctx);
    Ok(())
}

fn check(code: &str, subtotal: Option<f64>, ctx: &Context) -> Result<()> {
    let Shop { session, .. } = ctx.open_shop()?;
    let currency = ctx.config.storefront.currency;

    let (subtotal, validation) = match subtotal {
        Some(amount) => {
            let subtotal = Money::from_decimal(amount, currency);
            let validation = session.coupons().check_coupon(
                code,
                subtotal,
                &ctx.config.storefront.locale,
            );
            (subtotal, validation)
        }
        None => (session.subtotal(), session.check_coupon(code)),
    };

    if ctx.output.is_json() {
        ctx.output.json(&validation);
        return Ok(());
    }

    ctx.output.kv("Subtotal", &subtotal.display());
    match (validation.is_valid, validation.discount_amount, validation.message) {
        (true, Some(discount), _) => {
            ctx.output.success(&format!("{} is valid: {} off", code.trim().to_uppercase(), discount.display()))
        }
        (_, _, Some(message)) => ctx.output.warn(&message),
        _ => ctx.output.warn("Coupon is not valid"),
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CouponRow<'a> {
    code: &'a str,
    discount: String,
    description: Option<&'a str>,
    min_purchase: Option<Money>,
    applied: bool,
}

fn list(ctx: &Context) -> Result<()> {
    let Shop { session, .. } = ctx.open_shop()?;
    let locale = &ctx.config.storefront.locale;
    let applied = session.applied_coupon().map(|a| a.coupon.code.clone());

    let rows: Vec<CouponRow> = session
        .coupons()
        .catalog()
        .coupons()
        .iter()
        .map(|c| CouponRow {
            code: c.code.as_str(),
            discount: format_coupon_discount(c),
            description: c.description.resolve(locale),
            min_purchase: c.min_purchase,
            applied: applied.as_ref() == Some(&c.code),
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header("Coupons");
    if rows.is_empty() {
        ctx.output.info("No coupons configured");
        return Ok(());
    }
    let widths = [12, 12, 40, 8];
    for row in &rows {
        ctx.output.table_row(
            &[
                row.code,
                &row.discount,
                row.description.unwrap_or(""),
                &active_badge(row.applied),
            ],
            &widths,
        );
    }
    Ok(())
}
