//! Money calculation utilities using rust_decimal for precision
//!
//! Wire values are `f64`; every sum, comparison and split is done in
//! `Decimal` and converted back only when a payload is built.

use rust_decimal::prelude::*;
use shared::order::OrderLine;
use std::str::FromStr;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for tender/target comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Auto-balance treats anything at or below this as an empty field (0.001)
pub const ZERO_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Upper bound of a single tender field (1,000,000)
pub const MAX_PAYMENT_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Convert f64 to Decimal for calculation
///
/// NaN/Infinity log an error and become zero.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for the wire, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

/// Round to 2 decimal places, midpoint away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `quantity * unit_price`; an overflowing product logs an error and counts as zero
pub fn line_total(line: &OrderLine) -> Decimal {
    to_decimal(line.unit_price)
        .checked_mul(Decimal::from(line.quantity))
        .unwrap_or_else(|| {
            tracing::error!(
                product = %line.product_name,
                unit_price = line.unit_price,
                quantity = line.quantity,
                "Line total overflow, defaulting to zero"
            );
            Decimal::ZERO
        })
}

/// Sum of `quantity * unit_price` over the lines
pub fn lines_total(lines: &[OrderLine]) -> Decimal {
    checked_sum(lines.iter().map(line_total))
}

/// Sum that skips any addend which would overflow
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).unwrap_or_else(|| {
            tracing::error!(sum = %acc, amount = %amount, "Monetary sum overflow, amount skipped");
            acc
        })
    })
}

/// Clamp an amount into `0..=MAX_PAYMENT_AMOUNT`
pub fn clamp_amount(amount: Decimal) -> Decimal {
    if amount > MAX_PAYMENT_AMOUNT {
        tracing::warn!(amount = %amount, max = %MAX_PAYMENT_AMOUNT, "Amount capped");
        MAX_PAYMENT_AMOUNT
    } else {
        amount.max(Decimal::ZERO)
    }
}

/// Parse the text of a tender field
///
/// Empty, unparsable or negative input counts as an empty field. A comma
/// is accepted as the decimal separator. Amounts above
/// `MAX_PAYMENT_AMOUNT` are capped.
pub fn parse_amount(text: &str) -> Decimal {
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return Decimal::ZERO;
    }
    match Decimal::from_str(&normalized) {
        Ok(amount) if amount.is_sign_positive() => clamp_amount(amount),
        Ok(_) => Decimal::ZERO,
        Err(_) => {
            tracing::debug!(input = %text, "Unparsable amount treated as empty");
            Decimal::ZERO
        }
    }
}
