//! Typed Hyperliquid client for the spot sweep tool.
//!
//! Splits the exchange surface into:
//! - `info`: unsigned read-only queries (metadata, balances, order book)
//! - `meta`: spot metadata resolution into domain types
//! - `actions` / `signer`: wire formats and request signing
//! - `client`: the `ExchangeApi` trait the orchestration layer consumes,
//!   plus its HTTP implementation
//!
//! The orchestration layer never sees signatures or raw JSON; it talks to
//! `ExchangeApi` in domain types only.

pub mod actions;
pub mod client;
pub mod error;
pub mod format;
pub mod info;
pub mod meta;
pub mod signer;

pub use actions::{
    ActionSignature, ExchangePayload, OrderAction, OrderWire, UsdClassTransferAction,
    WithdrawAction,
};
pub use client::{
    BoxFuture, ExchangeApi, FillResult, HttpExchange, Network, PriceSource, MAINNET_API_URL,
    TESTNET_API_URL,
};
pub use error::{ExchangeError, ExchangeResult};
pub use format::{format_amount, format_wire};
pub use info::InfoClient;
pub use meta::SpotMeta;
pub use signer::RequestSigner;
