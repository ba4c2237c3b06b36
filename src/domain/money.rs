//! Conversions between decimal amounts and the integer minor units stored in
//! the database.

use rust_decimal::Decimal;
use thiserror::Error;

/// Number of decimal places kept for every monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount accepted for a single price: ten digits, two of them decimals.
pub fn max_amount() -> Decimal {
    Decimal::new(9_999_999_999, MONEY_SCALE)
}

/// Convert integer cents into a decimal amount with two decimal places.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}

/// Amount that cannot be represented as `i64` cents.
#[derive(Debug, Error, PartialEq)]
#[error("amount {0} does not fit the stored range")]
pub struct AmountOutOfRange(pub Decimal);

/// Convert a decimal amount into integer cents, rounding half to even.
pub fn to_cents(amount: Decimal) -> Result<i64, AmountOutOfRange> {
    let mut rounded = amount.round_dp(MONEY_SCALE);
    rounded.rescale(MONEY_SCALE);
    i64::try_from(rounded.mantissa()).map_err(|_| AmountOutOfRange(amount))
}
