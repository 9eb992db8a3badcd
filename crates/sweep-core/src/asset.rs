//! Asset and pair metadata plus venue/balance types.
//!
//! A run deals with exactly one spot pair. Both legs must resolve from
//! exchange metadata before any balance is read, since all downstream
//! decimal math depends on the reported decimal counts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spot asset ids are offset from the pair's index in the spot universe.
pub const SPOT_ASSET_OFFSET: u32 = 10_000;

/// Spot prices carry at most `8 - base szDecimals` fractional digits.
pub const MAX_SPOT_PRICE_DECIMALS: u32 = 8;

/// Metadata for a single token, as reported by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    /// Human-readable symbol (e.g., "PURR", "USDC").
    pub symbol: String,
    /// Token index in the exchange's spot token table.
    pub index: u32,
    /// Decimal places for order sizes (szDecimals).
    pub sz_decimals: u32,
    /// On-chain decimal places (weiDecimals), used for ledger amounts.
    pub wei_decimals: u32,
}

/// Resolved metadata for one spot pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairMeta {
    /// Pair name as listed in the spot universe (e.g., "PURR/USDC").
    pub name: String,
    /// Pair index in the spot universe.
    pub index: u32,
    /// Base leg (the asset being sold).
    pub base: TokenMeta,
    /// Quote leg (the proceeds currency).
    pub quote: TokenMeta,
}

impl PairMeta {
    /// Exchange-internal asset id used when placing spot orders.
    pub fn asset_id(&self) -> u32 {
        SPOT_ASSET_OFFSET + self.index
    }

    /// Maximum fractional digits for a limit price on this pair.
    pub fn price_decimals(&self) -> u32 {
        MAX_SPOT_PRICE_DECIMALS.saturating_sub(self.base.sz_decimals)
    }
}

/// Ledger a balance lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    /// Directly-owned tradable assets.
    Spot,
    /// Margin backing perpetual-futures positions.
    Perps,
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spot => write!(f, "spot"),
            Self::Perps => write!(f, "perps"),
        }
    }
}

/// A freshly-read balance.
///
/// Balances are read immediately before every stage that depends on
/// them and never cached across a settlement wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub token: String,
    pub venue: Venue,
    pub available: Decimal,
}

impl Balance {
    pub fn new(token: impl Into<String>, venue: Venue, available: Decimal) -> Self {
        Self {
            token: token.into(),
            venue,
            available,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.available.is_sign_positive() && !self.available.is_zero()
    }
}
