//! Liquidation planning.
//!
//! Turns "sell this much, roughly at market" into a concrete IOC limit
//! order: the quantity is capped by the live balance and floored to the
//! base asset's decimals, and the limit price is the reference price with
//! a downward basis-point cushion, floored to the pair's price decimals.
//! The cushion bounds the worst-case execution price while still crossing
//! the book's bid side.

use crate::error::{FlowError, FlowResult};
use rust_decimal::Decimal;
use sweep_core::{CoreError, OrderPlan, Price, Size};

/// Divisor converting basis points to a fraction.
const BPS_DENOMINATOR: i64 = 10_000;

/// Apply a downward cushion of `slippage_bps` to a reference price.
pub fn cushioned_price(reference: Price, slippage_bps: u32) -> Price {
    let cushion = Decimal::ONE - Decimal::from(slippage_bps) / Decimal::from(BPS_DENOMINATOR);
    reference * cushion
}

/// Derive the sell order.
///
/// Quantity: `min(requested, available)` when requested, otherwise the
/// full available balance; floored to `sz_decimals`. Price: cushioned
/// reference floored to `price_decimals`. Fails with
/// `InvalidComputedAmount` before anything is signed if either leg
/// floors to zero.
pub fn plan_sell(
    requested: Option<Size>,
    available: Size,
    reference: Price,
    slippage_bps: u32,
    sz_decimals: u32,
    price_decimals: u32,
) -> FlowResult<OrderPlan> {
    let target = match requested {
        Some(r) => r.min(available),
        None => available,
    };
    let size = target.floor_to(sz_decimals);
    let limit_px = cushioned_price(reference, slippage_bps).floor_to(price_decimals);

    // Positivity is enforced by the plan constructor; translate its
    // rejection into the flow taxonomy with the amounts that caused it.
    OrderPlan::ioc_sell(size, limit_px).map_err(|e| match e {
        CoreError::InvalidSize(_) => FlowError::InvalidComputedAmount {
            what: "sell size",
            requested: requested.map(|r| r.inner()),
            available: available.inner(),
        },
        _ => FlowError::InvalidComputedAmount {
            what: "limit price",
            requested: None,
            available: reference.inner(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sweep_core::{Side, TimeInForce};

    #[test]
    fn test_full_liquidation_at_cushioned_bid() {
        // available 100, no requested amount, bid 0.0205, 30 bps cushion
        let plan = plan_sell(
            None,
            Size::new(dec!(100)),
            Price::new(dec!(0.0205)),
            30,
            2,
            6,
        )
        .unwrap();

        assert_eq!(plan.size, Size::new(dec!(100.00)));
        // 0.0205 * 0.9970 = 0.0204385, floored at 6 decimals
        assert_eq!(plan.limit_px, Price::new(dec!(0.020438)));
        assert_eq!(plan.side, Side::Sell);
        assert_eq!(plan.tif, TimeInForce::ImmediateOrCancel);
    }

    #[test]
    fn test_requested_amount_capped_by_available() {
        let plan = plan_sell(
            Some(Size::new(dec!(500))),
            Size::new(dec!(42.129)),
            Price::new(dec!(1.5)),
            30,
            2,
            4,
        )
        .unwrap();
        assert_eq!(plan.size, Size::new(dec!(42.12)));
    }

    #[test]
    fn test_requested_below_available_is_honored() {
        let plan = plan_sell(
            Some(Size::new(dec!(10))),
            Size::new(dec!(100)),
            Price::new(dec!(1)),
            0,
            0,
            4,
        )
        .unwrap();
        assert_eq!(plan.size, Size::new(dec!(10)));
    }

    #[test]
    fn test_cushion_is_strictly_downward() {
        let reference = Price::new(dec!(0.0205));
        for bps in [1u32, 30, 100, 500] {
            assert!(cushioned_price(reference, bps) < reference);
        }
        assert_eq!(cushioned_price(reference, 0), reference);
    }

    #[test]
    fn test_size_flooring_to_zero_aborts() {
        // 0.009 floors to 0 at 2 decimals
        let err = plan_sell(
            None,
            Size::new(dec!(0.009)),
            Price::new(dec!(1)),
            30,
            2,
            4,
        )
        .unwrap_err();
        assert!(matches!(err, FlowError::InvalidComputedAmount { what: "sell size", .. }));
    }

    #[test]
    fn test_zero_available_aborts() {
        let err = plan_sell(None, Size::ZERO, Price::new(dec!(1)), 30, 2, 4).unwrap_err();
        assert!(matches!(err, FlowError::InvalidComputedAmount { .. }));
    }

    #[test]
    fn test_tiny_price_flooring_to_zero_aborts() {
        // 0.0000004 floors to 0 at 6 decimals after the cushion
        let err = plan_sell(
            None,
            Size::new(dec!(100)),
            Price::new(dec!(0.0000004)),
            30,
            2,
            6,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FlowError::InvalidComputedAmount { what: "limit price", .. }
        ));
    }
}
