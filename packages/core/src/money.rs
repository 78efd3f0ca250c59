// ABOUTME: Money helpers built on rust_decimal
// ABOUTME: Amounts are stored as decimal text and rounded to cents

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::validation::ValidationError;

/// Upper bound for a unit price or a per-vehicle fee
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Round an amount to cents, halves away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a stored or user-provided amount
pub fn parse_money(value: &str) -> Result<Decimal, ValidationError> {
    Decimal::from_str(value.trim()).map_err(|_| ValidationError::InvalidAmount(value.to_string()))
}

/// Total price of a quote line
pub fn line_total(quantity: i64, unit_price: Decimal) -> Result<Decimal, ValidationError> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .map(round_money)
        .ok_or_else(|| ValidationError::InvalidAmount(format!("{} x {}", quantity, unit_price)))
}

/// Sum amounts, failing instead of overflowing
pub fn checked_sum<I>(amounts: I) -> Result<Decimal, ValidationError>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount)
            .ok_or_else(|| ValidationError::InvalidAmount(amount.to_string()))
    })
}
