//! Price filter commands.
//!
//! Each invocation is one burst of edits: they go through the debounced
//! channel and are flushed before the command exits.

use anyhow::{anyhow, Result};
use atelier_commerce::filter::{PriceRange, RangeSide, StepKey};
use atelier_commerce::session::StorefrontSession;
use serde::Serialize;

use super::{FilterArgs, FilterCommand, KeyArg, SideArg};
use crate::context::{Context, Shop};
use crate::output::active_badge;

/// Run the filter command.
pub fn run(args: FilterArgs, ctx: &Context) -> Result<()> {
    let Shop { session, scheduler } = ctx.open_shop()?;
    let filter = session.filter();

    match args.command.unwrap_or(FilterCommand::Show) {
        FilterCommand::Show => {}
        FilterCommand::Min { value } => {
            filter.set_min(value);
        }
        FilterCommand::Max { value } => {
            filter.set_max(value);
        }
        FilterCommand::Step { side, key, times } => {
            let side = match side {
                SideArg::Min => RangeSide::Min,
                SideArg::Max => RangeSide::Max,
            };
            let key = step_key(key);
            for _ in 0..times {
                filter.step_by_keyboard(side, key);
            }
        }
        FilterCommand::Preset { label } => {
            session
                .apply_preset(&label)
                .ok_or_else(|| anyhow!("Unknown preset '{}'", label))?;
        }
        FilterCommand::Reset => {
            filter.reset();
        }
    }

    if filter.flush() {
        ctx.output.debug(&format!("committed after {:?} of virtual time", scheduler.now()));
    }
    show_filter(&session, ctx);
    Ok(())
}

fn step_key(key: KeyArg) -> StepKey {
    match key {
        KeyArg::Left => StepKey::Left,
        KeyArg::Right => StepKey::Right,
        KeyArg::Up => StepKey::Up,
        KeyArg::Down => StepKey::Down,
        KeyArg::Home => StepKey::Home,
        KeyArg::End => StepKey::End,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterView<'a> {
    range: PriceRange,
    global_min: i64,
    global_max: i64,
    step: i64,
    filtered: bool,
    active_preset: Option<&'a str>,
    matching_products: Vec<&'a str>,
}

fn show_filter(session: &StorefrontSession, ctx: &Context) {
    let filter = session.filter();
    let bounds = filter.bounds();
    let range = filter.committed();
    let catalog = ctx.catalog();
    let matching = filter.filter_products(catalog.products());

    if ctx.output.is_json() {
        ctx.output.json(&FilterView {
            range,
            global_min: bounds.global_min(),
            global_max: bounds.global_max(),
            step: bounds.step(),
            filtered: filter.is_filtered(),
            active_preset: session.active_preset().map(|p| p.label.as_str()),
            matching_products: matching.iter().map(|p| p.id.as_str()).collect(),
        });
        return;
    }

    ctx.output.header("Price filter");
    ctx.output.kv("Range", &format!("{} to {}", range.min, range.max));
    ctx.output.kv(
        "Bounds",
        &format!("{} to {} (step {})", bounds.global_min(), bounds.global_max(), bounds.step()),
    );

    if !session.presets().is_empty() {
        ctx.output.info("");
        ctx.output.info("Presets:");
        let widths = [16, 12, 8];
        for preset in session.presets() {
            ctx.output.table_row(
                &[
                    &preset.label,
                    &format!("{}-{}", preset.min, preset.max),
                    &active_badge(filter.is_preset_active(preset)),
                ],
                &widths,
            );
        }
    }

    if !catalog.is_empty() {
        ctx.output.info("");
        ctx.output.info(&format!(
            "{} of {} products match",
            matching.len(),
            catalog.len()
        ));
        for product in matching {
            ctx.output.list_item(&format!("{} {}", product.name, product.unit_price.display()));
        }
    }
}
