//! Order-related types.
//!
//! The sweep only ever produces one derived order: an immediate-or-cancel
//! limit sell. `OrderPlan` enforces the positivity invariants before the
//! plan can reach anything that signs.

use crate::error::CoreError;
use crate::{Price, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn is_buy(&self) -> bool {
        matches!(self, Self::Buy)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Time-in-force for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-til-cancelled.
    #[serde(rename = "Gtc")]
    GoodTilCancelled,
    /// Immediate-or-cancel: fills against standing liquidity or cancels,
    /// never rests on the book. The only TIF this tool submits.
    #[default]
    #[serde(rename = "Ioc")]
    ImmediateOrCancel,
}

impl TimeInForce {
    /// Wire name used in order payloads.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::GoodTilCancelled => "Gtc",
            Self::ImmediateOrCancel => "Ioc",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// A fully-derived order, ready for submission.
///
/// Construction fails on non-positive size or price, so no plan with a
/// zero/negative leg can exist downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    pub side: Side,
    pub size: Size,
    pub limit_px: Price,
    pub tif: TimeInForce,
}

impl OrderPlan {
    pub fn new(side: Side, size: Size, limit_px: Price, tif: TimeInForce) -> Result<Self, CoreError> {
        if !size.is_positive() {
            return Err(CoreError::InvalidSize(format!(
                "order size must be positive, got {size}"
            )));
        }
        if !limit_px.is_positive() {
            return Err(CoreError::InvalidPrice(format!(
                "limit price must be positive, got {limit_px}"
            )));
        }
        Ok(Self {
            side,
            size,
            limit_px,
            tif,
        })
    }

    /// An IOC sell, the shape every liquidation plan takes.
    pub fn ioc_sell(size: Size, limit_px: Price) -> Result<Self, CoreError> {
        Self::new(Side::Sell, size, limit_px, TimeInForce::ImmediateOrCancel)
    }
}
