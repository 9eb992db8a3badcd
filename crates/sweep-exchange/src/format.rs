//! Wire formatting for prices and sizes.
//!
//! The venue accepts at most 5 significant figures and at most the
//! per-asset decimal count; trailing zeros are stripped. Values are
//! truncated, never rounded up, so formatting can only shrink an amount
//! the caller already floored.

use rust_decimal::Decimal;
use sweep_core::floor_to_decimals;

/// Maximum significant figures accepted in order prices and sizes.
pub const MAX_SIG_FIGS: u32 = 5;

/// Format a ledger amount (transfer/withdraw) at the given precision.
pub fn format_amount(value: Decimal, max_decimals: u32) -> String {
    floor_to_decimals(value, max_decimals).normalize().to_string()
}

/// Format an order price or size for the wire: 5 significant figures,
/// `max_decimals` fractional digits, no trailing zeros.
pub fn format_wire(value: Decimal, max_decimals: u32) -> String {
    let sig = truncate_to_sig_figs(value, MAX_SIG_FIGS);
    floor_to_decimals(sig, max_decimals).normalize().to_string()
}

/// Truncate a positive decimal to `sig_figs` significant figures (floor).
fn truncate_to_sig_figs(value: Decimal, sig_figs: u32) -> Decimal {
    if value.is_zero() {
        return Decimal::ZERO;
    }

    let scale = sig_figs as i32 - magnitude_of(value.abs()) - 1;
    if scale >= 0 {
        floor_to_decimals(value, scale as u32)
    } else {
        // Truncate integer digits: 123456 with 5 sig figs -> 123450.
        let factor = Decimal::from(10i64.pow((-scale) as u32));
        (value / factor).trunc() * factor
    }
}

/// Order of magnitude: 12345 -> 4, 1.23 -> 0, 0.0205 -> -2.
fn magnitude_of(value: Decimal) -> i32 {
    let ten = Decimal::TEN;
    let mut mag = 0i32;
    let mut v = value;
    if v >= Decimal::ONE {
        while v >= ten {
            v /= ten;
            mag += 1;
        }
    } else {
        while v < Decimal::ONE {
            v *= ten;
            mag -= 1;
        }
    }
    mag
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_amount_floors_and_strips() {
        assert_eq!(format_amount(dec!(50.123456789), 8), "50.12345678");
        assert_eq!(format_amount(dec!(100.00), 8), "100");
        assert_eq!(format_amount(dec!(1.100), 2), "1.1");
    }

    #[test]
    fn test_format_wire_sig_figs() {
        assert_eq!(format_wire(dec!(123456.789), 4), "123450");
        assert_eq!(format_wire(dec!(12345.6789), 4), "12345");
        assert_eq!(format_wire(dec!(1234.5678), 4), "1234.5");
        assert_eq!(format_wire(dec!(1.2345678), 4), "1.2345");
        assert_eq!(format_wire(dec!(0.0204385), 6), "0.020438");
    }

    #[test]
    fn test_format_wire_decimals_more_restrictive() {
        assert_eq!(format_wire(dec!(1.234567), 2), "1.23");
    }

    #[test]
    fn test_format_wire_small_values() {
        assert_eq!(format_wire(dec!(0.000012345), 8), "0.00001234");
        assert_eq!(format_wire(dec!(0.00001234), 8), "0.00001234");
    }

    #[test]
    fn test_format_wire_whole_sizes() {
        assert_eq!(format_wire(dec!(100.00), 2), "100");
        assert_eq!(format_wire(dec!(0), 2), "0");
    }

    #[test]
    fn test_magnitude() {
        assert_eq!(magnitude_of(dec!(12345)), 4);
        assert_eq!(magnitude_of(dec!(1.23)), 0);
        assert_eq!(magnitude_of(dec!(0.0205)), -2);
        assert_eq!(magnitude_of(dec!(0.00001234)), -5);
    }
}
