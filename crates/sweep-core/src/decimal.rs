//! Precision-safe decimal types and flooring rules.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, avoiding
//! floating-point rounding errors critical in financial calculations.
//! Every quantity sent to the exchange is floored (truncated toward
//! zero) to the asset's decimal count first; rounding up a size or an
//! amount can overdraw a balance and get the signed request rejected.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

/// Withdrawal amounts are capped at 8 fractional digits regardless of the
/// asset's native decimals; the bridge settles on a chain with that ceiling.
pub const WITHDRAW_DECIMALS: u32 = 8;

/// Truncate `value` toward zero at `decimals` fractional digits.
///
/// Never rounds up: `floor_to_decimals(v, d) <= v` for non-negative `v`,
/// and applying it twice is the same as applying it once.
pub fn floor_to_decimals(value: Decimal, decimals: u32) -> Decimal {
    value.trunc_with_scale(decimals)
}

/// The smallest representable unit at `decimals` fractional digits.
pub fn one_tick(decimals: u32) -> Decimal {
    Decimal::new(1, decimals)
}

/// Subtract one tick at `decimals` from `value`.
///
/// Used to leave a safety margin against off-by-one rejection from the
/// exchange's own rounding. May return a negative value; callers must
/// treat a non-positive result as "too small to act on".
pub fn sub_tick(value: Decimal, decimals: u32) -> Decimal {
    value - one_tick(decimals)
}

/// Price with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// prices with sizes in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Floor to `decimals` fractional digits.
    #[inline]
    pub fn floor_to(&self, decimals: u32) -> Self {
        Self(floor_to_decimals(self.0, decimals))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Size/quantity with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// sizes with prices in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Floor to `decimals` fractional digits.
    #[inline]
    pub fn floor_to(&self, decimals: u32) -> Self {
        Self(floor_to_decimals(self.0, decimals))
    }

    /// The smaller of two sizes.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Size {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Size {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_floor_truncates_toward_zero() {
        assert_eq!(floor_to_decimals(dec!(1.2399), 2), dec!(1.23));
        assert_eq!(floor_to_decimals(dec!(1.2300), 2), dec!(1.23));
        assert_eq!(floor_to_decimals(dec!(100), 2), dec!(100));
        assert_eq!(floor_to_decimals(dec!(0.0204385), 6), dec!(0.020438));
    }

    #[test]
    fn test_floor_zero_decimals() {
        assert_eq!(floor_to_decimals(dec!(41.9), 0), dec!(41));
    }

    #[test]
    fn test_floor_withdraw_cap() {
        assert_eq!(
            floor_to_decimals(dec!(50.123456789), WITHDRAW_DECIMALS),
            dec!(50.12345678)
        );
    }

    #[test]
    fn test_one_tick() {
        assert_eq!(one_tick(0), dec!(1));
        assert_eq!(one_tick(2), dec!(0.01));
        assert_eq!(one_tick(8), dec!(0.00000001));
    }

    #[test]
    fn test_sub_tick_can_go_negative() {
        assert_eq!(sub_tick(dec!(10.00), 2), dec!(9.99));
        assert!(sub_tick(dec!(0), 2) < Decimal::ZERO);
    }

    #[test]
    fn test_price_floor_to() {
        let px = Price::new(dec!(0.0204385));
        assert_eq!(px.floor_to(6), Price::new(dec!(0.020438)));
    }

    #[test]
    fn test_size_min_and_positive() {
        let a = Size::new(dec!(5));
        let b = Size::new(dec!(3.5));
        assert_eq!(a.min(b), b);
        assert!(b.is_positive());
        assert!(!Size::ZERO.is_positive());
    }
}
