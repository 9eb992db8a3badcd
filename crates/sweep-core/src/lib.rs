//! Core domain types for the spot sweep tool.
//!
//! This crate provides the types shared by the exchange client and the
//! orchestration layer:
//! - `Price`, `Size`: precision-safe numeric wrappers
//! - flooring and tick helpers used for every order/transfer amount
//! - `TokenMeta`, `PairMeta`: exchange metadata for one spot pair
//! - `Side`, `TimeInForce`, `OrderPlan`: the derived sell order
//! - `Venue`, `Balance`: where funds currently sit

pub mod asset;
pub mod decimal;
pub mod error;
pub mod order;

pub use asset::{Balance, PairMeta, TokenMeta, Venue, MAX_SPOT_PRICE_DECIMALS, SPOT_ASSET_OFFSET};
pub use decimal::{floor_to_decimals, one_tick, sub_tick, Price, Size, WITHDRAW_DECIMALS};
pub use error::{CoreError, Result};
pub use order::{OrderPlan, Side, TimeInForce};
