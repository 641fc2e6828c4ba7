//! Amount rounding with decimal precision.
//!
//! All monetary amounts are `rust_decimal::Decimal`. The external API
//! reports amounts with arbitrary scale; they are normalized to the
//! accounting precision (2 decimal places) on ingestion using banker's
//! rounding, so equality checks downstream are exact.

use rust_decimal::{Decimal, RoundingStrategy};

/// Accounting precision: cents.
pub const AMOUNT_SCALE: u32 = 2;

/// Rounds an amount to the accounting precision using banker's rounding.
#[must_use]
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_round_amount_passthrough() {
        assert_eq!(round_amount(dec!(113.08)), dec!(113.08));
        assert_eq!(round_amount(dec!(-113.08)), dec!(-113.08));
    }

    #[test]
    fn test_round_amount_bankers() {
        // Midpoints round to the even neighbour.
        assert_eq!(round_amount(dec!(0.125)), dec!(0.12));
        assert_eq!(round_amount(dec!(0.135)), dec!(0.14));
        assert_eq!(round_amount(dec!(-0.125)), dec!(-0.12));
    }

    #[test]
    fn test_round_amount_excess_scale() {
        assert_eq!(round_amount(dec!(10.0000001)), dec!(10.00));
    }
}
