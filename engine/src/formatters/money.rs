// Monetary fields: integer cents, zero-filled. 1500.00 -> "0000000150000".
use super::raw_value;
use cnab_shared::utils::brazilian_format::parse_decimal;
use cnab_shared::FieldValue;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Converts an amount to whole cents, rounding half away from zero.
/// The sign is dropped; CNAB amount fields carry magnitudes only.
pub fn to_cents(amount: Decimal) -> Option<u128> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .abs()
        .to_u128()
}

pub fn format_money(value: Option<&FieldValue>, width: usize) -> String {
    let zeros = || "0".repeat(width);

    let amount = match raw_value(value) {
        None => return zeros(),
        Some(FieldValue::Decimal(d)) => *d,
        Some(FieldValue::Integer(i)) => Decimal::from(*i),
        Some(FieldValue::Text(s)) => match parse_decimal(s) {
            Ok(d) => d,
            Err(_) => return zeros(),
        },
        Some(FieldValue::Date(_)) => return zeros(),
    };

    match to_cents(amount) {
        Some(cents) => format!("{:0>width$}", cents, width = width),
        None => zeros(),
    }
}
