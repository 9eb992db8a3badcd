//! Error taxonomy for the recovery flow.
//!
//! Every error is terminal for the run: there is no internal retry, and
//! completed stages are never rolled back. Messages carry the stage and
//! requested-vs-available context so a re-run can be adjusted.

use rust_decimal::Decimal;
use sweep_exchange::ExchangeError;
use thiserror::Error;

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Missing or malformed configuration; raised before any network call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metadata miss, transport failure, signing failure or API rejection
    /// from the exchange collaborator.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// Nothing available to act on at a stage.
    #[error("Insufficient balance: {context} ({token} available: {available})")]
    InsufficientBalance {
        token: String,
        available: Decimal,
        context: String,
    },

    /// An amount floored to zero or below; no network call was made.
    #[error("Computed {what} <= 0 after flooring (requested: {requested:?}, available: {available})")]
    InvalidComputedAmount {
        what: &'static str,
        requested: Option<Decimal>,
        available: Decimal,
    },

    /// The IOC order matched nothing.
    #[error("Order not filled: {reason}")]
    OrderNotFilled { reason: String },

    /// Malformed withdrawal address, rejected before anything was signed.
    #[error("Invalid destination address: {0}")]
    InvalidDestination(String),
}

/// Result type alias for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;
