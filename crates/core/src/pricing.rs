//! Upgrade pricing: line totals, subtotal, and GST.
//!
//! All arithmetic is exact decimal. GST is 15% of the upgrade subtotal and is
//! never rounded before storage; [`round_currency`] is for display only.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Money;

/// GST rate applied to the upgrade subtotal (15%).
pub const GST_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// A priced quantity of one upgrade.
pub trait PricedLine {
    fn unit_price(&self) -> Money;
    fn quantity(&self) -> i32;
}

/// Price of `quantity` units at `price` each.
pub fn line_total(price: Money, quantity: i32) -> Money {
    price * Decimal::from(quantity)
}

/// Sum of price × quantity over every line.
pub fn upgrade_subtotal<L: PricedLine>(lines: &[L]) -> Money {
    lines
        .iter()
        .map(|l| line_total(l.unit_price(), l.quantity()))
        .sum()
}

/// GST owed on a subtotal.
pub fn gst(subtotal: Money) -> Money {
    subtotal * GST_RATE
}

/// Round to cents, midpoint away from zero.
pub fn round_currency(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Subtotal, GST and GST-inclusive total for a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceSummary {
    pub subtotal: Money,
    pub gst: Money,
    pub total: Money,
}

impl PriceSummary {
    pub fn from_lines<L: PricedLine>(lines: &[L]) -> Self {
        let subtotal = upgrade_subtotal(lines);
        let gst = gst(subtotal);
        Self {
            subtotal,
            gst,
            total: subtotal + gst,
        }
    }
}

/// Largest amount a stored money column (`NUMERIC(12,2)`) can hold.
pub const MAX_AMOUNT: Money = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Prices may be zero (included items) but never negative.
pub fn validate_price(price: Money) -> Result<(), CoreError> {
    validate_amount("Price", price)
}

/// A stored amount lies in `0..=MAX_AMOUNT`.
pub fn validate_amount(field: &str, amount: Money) -> Result<(), CoreError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CoreError::Validation(format!(
            "{field} must not be negative (got {amount})"
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(CoreError::Validation(format!(
            "{field} must not exceed {MAX_AMOUNT} (got {amount})"
        )));
    }
    Ok(())
}

pub fn validate_max_quantity(max_quantity: i32) -> Result<(), CoreError> {
    if max_quantity < 1 {
        return Err(CoreError::Validation(format!(
            "Maximum quantity must be at least 1 (got {max_quantity})"
        )));
    }
    Ok(())
}

/// A selected quantity must be between 1 and the upgrade's maximum.
pub fn validate_quantity(name: &str, quantity: i32, max_quantity: i32) -> Result<(), CoreError> {
    if quantity < 1 {
        return Err(CoreError::Validation(format!(
            "Quantity for '{name}' must be at least 1"
        )));
    }
    if quantity > max_quantity {
        return Err(CoreError::Validation(format!(
            "Quantity {quantity} for '{name}' exceeds the maximum of {max_quantity}"
        )));
    }
    Ok(())
}
