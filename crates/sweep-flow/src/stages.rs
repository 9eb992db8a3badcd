//! Amount selection and destination validation for the ledger stages.
//!
//! Both the spot->perps transfer and the withdrawal pick their amount the
//! same way: an explicit request is capped by the live balance and
//! floored; "use everything" additionally gives up one tick as a safety
//! buffer against residual rounding from the prior stage.

use crate::error::{FlowError, FlowResult};
use rust_decimal::Decimal;
use sweep_core::{floor_to_decimals, sub_tick};

/// Select the amount to move at `decimals` precision.
///
/// - `Some(requested)`: `floor(min(requested, available), decimals)`
/// - `None`: `floor(available, decimals)` minus one tick
///
/// Fails with `InvalidComputedAmount` when the result is not positive;
/// the caller must not reach any signing path in that case.
pub fn select_amount(
    what: &'static str,
    requested: Option<Decimal>,
    available: Decimal,
    decimals: u32,
) -> FlowResult<Decimal> {
    let amount = match requested {
        Some(r) => floor_to_decimals(r.min(available), decimals),
        None => sub_tick(floor_to_decimals(available, decimals), decimals),
    };

    if amount.is_sign_negative() || amount.is_zero() {
        return Err(FlowError::InvalidComputedAmount {
            what,
            requested,
            available,
        });
    }
    Ok(amount)
}

/// Validate an EVM destination address before anything is signed.
///
/// A malformed address must fail locally rather than reach the signed
/// request.
pub fn validate_destination(dest: &str) -> FlowResult<()> {
    let hex_part = dest
        .strip_prefix("0x")
        .ok_or_else(|| FlowError::InvalidDestination(dest.to_string()))?;
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FlowError::InvalidDestination(dest.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_full_balance_keeps_one_tick_buffer() {
        let amount = select_amount("transfer amount", None, dec!(12.3456789), 8).unwrap();
        assert_eq!(amount, dec!(12.34567889));
    }

    #[test]
    fn test_requested_amount_capped_by_balance() {
        let amount = select_amount("transfer amount", Some(dec!(100)), dec!(12.5), 8).unwrap();
        assert_eq!(amount, dec!(12.5));
    }

    #[test]
    fn test_requested_amount_floored_not_buffered() {
        let amount = select_amount("transfer amount", Some(dec!(10.123456789)), dec!(50), 8).unwrap();
        assert_eq!(amount, dec!(10.12345678));
    }

    #[test]
    fn test_withdrawal_floors_to_eight_decimals() {
        let amount = select_amount("withdrawal amount", Some(dec!(50.123456789)), dec!(100), 8).unwrap();
        assert_eq!(amount, dec!(50.12345678));
    }

    #[test]
    fn test_zero_balance_fails() {
        let err = select_amount("transfer amount", None, dec!(0), 8).unwrap_err();
        assert!(matches!(err, FlowError::InvalidComputedAmount { .. }));
    }

    #[test]
    fn test_dust_balance_consumed_by_buffer_fails() {
        // One tick at 8 decimals; buffer eats it entirely.
        let err = select_amount("transfer amount", None, dec!(0.00000001), 8).unwrap_err();
        assert!(matches!(err, FlowError::InvalidComputedAmount { .. }));
    }

    #[test]
    fn test_requested_zero_fails() {
        let err = select_amount("transfer amount", Some(dec!(0)), dec!(100), 8).unwrap_err();
        assert!(matches!(err, FlowError::InvalidComputedAmount { .. }));
    }

    #[test]
    fn test_valid_destination() {
        assert!(validate_destination("0x1111111111111111111111111111111111111111").is_ok());
        assert!(validate_destination("0xDeaDbeefdEAdbeefdEadbEEFdeadbeEFdEaDbeeF").is_ok());
    }

    #[test]
    fn test_invalid_destinations() {
        for dest in [
            "",
            "1111111111111111111111111111111111111111",
            "0x123",
            "0x11111111111111111111111111111111111111111",
            "0xz111111111111111111111111111111111111111",
        ] {
            assert!(
                matches!(
                    validate_destination(dest),
                    Err(FlowError::InvalidDestination(_))
                ),
                "expected {dest:?} to be rejected"
            );
        }
    }
}
