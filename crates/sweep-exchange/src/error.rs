//! Error types for the exchange client.

use thiserror::Error;

/// Errors from the exchange surface.
///
/// Metadata misses get their own variants so callers can distinguish
/// "this pair does not exist" from transport failures.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Exchange API error: {0}")]
    Api(String),

    #[error("Token {0} not found in spot metadata")]
    TokenNotFound(String),

    #[error("Pair {0} not found in spot metadata")]
    PairNotFound(String),

    #[error("Empty order book for {0}")]
    EmptyBook(String),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Action serialization failed: {0}")]
    Serialization(String),
}

/// Result type alias for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;
