//! Bulk percentage price adjustment
//!
//! Rewrites the pending price override of every item and modifier option in
//! view as `base * (1 + pct / 100)`, rounded half away from zero and clamped
//! at 0. Always computed from the base price, so applying twice does not
//! compound. Nothing is persisted; entries are only marked dirty.

use rust_decimal::prelude::*;
use serde::Serialize;
use shared::ErrorCode;
use shared::models::{CatalogItem, CompositeKey, ModifierOption};

use super::error::{MenuError, MenuResult};
use super::session::EditSession;

pub const MIN_PERCENT: Decimal = Decimal::from_parts(100, 0, 0, true, 0);
pub const MAX_PERCENT: Decimal = Decimal::ONE_THOUSAND;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdjustmentSummary {
    pub items: usize,
    pub modifier_options: usize,
}

/// `round_half_up(base * (1 + pct/100))`, never below 0
pub fn adjusted_price(base_price: i64, pct: Decimal) -> MenuResult<i64> {
    let factor = Decimal::ONE + pct / Decimal::ONE_HUNDRED;
    let adjusted = Decimal::from(base_price)
        .checked_mul(factor)
        .ok_or_else(|| overflow(base_price, pct))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let price = adjusted.to_i64().ok_or_else(|| overflow(base_price, pct))?;
    Ok(price.max(0))
}

fn overflow(base_price: i64, pct: Decimal) -> MenuError {
    MenuError::validation(
        ErrorCode::ValueOutOfRange,
        format!("Adjusting {base_price} by {pct}% overflows"),
    )
}

fn validate_percent(pct: Decimal) -> MenuResult<()> {
    if pct < MIN_PERCENT || pct > MAX_PERCENT {
        return Err(MenuError::validation(
            ErrorCode::ValueOutOfRange,
            format!("Adjustment must be between {MIN_PERCENT}% and {MAX_PERCENT}%, got {pct}%"),
        ));
    }
    Ok(())
}

/// Apply `pct` to every item and modifier option in view
///
/// All prices are computed before the session is touched, so a failure
/// leaves the session unchanged.
pub fn apply_percent_adjustment(
    session: &mut EditSession,
    items: &[CatalogItem],
    modifier_options: &[ModifierOption],
    pct: Decimal,
) -> MenuResult<AdjustmentSummary> {
    validate_percent(pct)?;
    let menu_group_id = session.menu_group_id();

    let mut updates = Vec::with_capacity(items.len() + modifier_options.len());
    for item in items {
        let key = CompositeKey::item(item.pos_item_id, menu_group_id);
        updates.push((key, adjusted_price(item.base_price, pct)?));
    }
    for option in modifier_options {
        let key = CompositeKey::modifier(
            option.pos_item_id,
            option.modifier_group_id,
            option.modifier_option_id,
            menu_group_id,
        );
        updates.push((key, adjusted_price(option.base_price, pct)?));
    }

    for (key, price) in updates {
        session.set_price(key, Some(price))?;
    }

    tracing::debug!(
        menu_group_id,
        %pct,
        items = items.len(),
        modifier_options = modifier_options.len(),
        "Applied percent adjustment"
    );
    Ok(AdjustmentSummary {
        items: items.len(),
        modifier_options: modifier_options.len(),
    })
}
