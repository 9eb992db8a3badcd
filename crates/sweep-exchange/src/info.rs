//! HTTP client for the unsigned info endpoint.
//!
//! All read-only queries go through `POST {api_url}/info` with a typed
//! request body. No credential is attached; balances are keyed by the
//! queried account address.

use crate::error::{ExchangeError, ExchangeResult};
use crate::meta::SpotMeta;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Request type for info endpoint.
#[derive(Debug, Serialize)]
struct InfoRequest {
    #[serde(rename = "type")]
    request_type: &'static str,
}

/// Request type for info endpoint with a user address.
#[derive(Debug, Serialize)]
struct InfoRequestWithUser {
    #[serde(rename = "type")]
    request_type: &'static str,
    /// User address (0x...).
    user: String,
}

/// Request type for info endpoint with a coin.
///
/// For spot books the coin is the pair name (e.g., "PURR/USDC").
#[derive(Debug, Serialize)]
struct InfoRequestWithCoin {
    #[serde(rename = "type")]
    request_type: &'static str,
    coin: String,
}

/// Client for the unsigned info endpoint.
pub struct InfoClient {
    /// HTTP client.
    client: Client,
    /// Info endpoint URL.
    info_url: String,
}

impl InfoClient {
    /// Create a new info client for the given API base URL.
    pub fn new(api_url: impl Into<String>) -> ExchangeResult<Self> {
        let base: String = api_url.into();
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ExchangeError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            info_url: format!("{}/info", base.trim_end_matches('/')),
        })
    }

    async fn post<Req, Resp>(&self, request: &Req) -> ExchangeResult<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let response = self
            .client
            .post(&self.info_url)
            .json(request)
            .send()
            .await
            .map_err(|e| ExchangeError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::HttpClient(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| ExchangeError::HttpClient(format!("Failed to parse response: {e}")))
    }

    /// Fetch spot metadata (token table and pair universe).
    pub async fn spot_meta(&self) -> ExchangeResult<SpotMeta> {
        debug!(url = %self.info_url, "Fetching spot metadata");
        self.post(&InfoRequest {
            request_type: "spotMeta",
        })
        .await
    }

    /// Fetch spot balances for a user.
    pub async fn spot_balances(&self, user: &str) -> ExchangeResult<SpotBalances> {
        debug!(user = %user, "Fetching spot balances");
        self.post(&InfoRequestWithUser {
            request_type: "spotClearinghouseState",
            user: user.to_string(),
        })
        .await
    }

    /// Fetch the perps clearinghouse state for a user.
    ///
    /// `withdrawable` is the live perps balance available for withdrawal.
    pub async fn clearinghouse_state(&self, user: &str) -> ExchangeResult<ClearinghouseState> {
        debug!(user = %user, "Fetching clearinghouse state");
        self.post(&InfoRequestWithUser {
            request_type: "clearinghouseState",
            user: user.to_string(),
        })
        .await
    }

    /// Fetch the L2 book for a coin (pair name for spot).
    pub async fn l2_book(&self, coin: &str) -> ExchangeResult<L2Book> {
        debug!(coin = %coin, "Fetching L2 book");
        self.post(&InfoRequestWithCoin {
            request_type: "l2Book",
            coin: coin.to_string(),
        })
        .await
    }
}

/// Spot balances response.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotBalances {
    #[serde(default)]
    pub balances: Vec<SpotBalance>,
}

/// One spot balance entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotBalance {
    pub coin: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub hold: Decimal,
}

impl SpotBalances {
    /// Free balance for a token: total minus held amount.
    ///
    /// A token absent from the response has a zero balance.
    pub fn free(&self, token: &str) -> Decimal {
        self.balances
            .iter()
            .find(|b| b.coin == token)
            .map(|b| b.total - b.hold)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Perps clearinghouse state (only the field this tool needs).
#[derive(Debug, Clone, Deserialize)]
pub struct ClearinghouseState {
    #[serde(with = "rust_decimal::serde::str")]
    pub withdrawable: Decimal,
}

/// L2 book snapshot. `levels[0]` is bids, `levels[1]` is asks.
#[derive(Debug, Clone, Deserialize)]
pub struct L2Book {
    #[serde(default)]
    pub levels: Vec<Vec<L2Level>>,
}

/// One price level.
#[derive(Debug, Clone, Deserialize)]
pub struct L2Level {
    #[serde(with = "rust_decimal::serde::str")]
    pub px: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub sz: Decimal,
    #[serde(default)]
    pub n: u32,
}

impl L2Book {
    pub fn best_bid(&self) -> Option<Decimal> {
        self.levels.first()?.first().map(|l| l.px)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.levels.get(1)?.first().map(|l| l.px)
    }

    pub fn mid(&self) -> Option<Decimal> {
        Some((self.best_bid()? + self.best_ask()?) / Decimal::from(2))
    }
}
