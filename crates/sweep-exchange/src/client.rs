//! The `ExchangeApi` trait and its HTTP implementation.
//!
//! The orchestration layer is generic over `ExchangeApi`, which keeps it
//! testable without a network and keeps signing out of its sight. The
//! trait is dyn-compatible via boxed futures.

use crate::actions::{
    ExchangePayload, OrderAction, OrderTypeWire, OrderWire, UsdClassTransferAction, WithdrawAction,
};
use crate::error::{ExchangeError, ExchangeResult};
use crate::format::{format_amount, format_wire};
use crate::info::InfoClient;
use crate::signer::RequestSigner;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;
use sweep_core::{Balance, OrderPlan, PairMeta, TokenMeta, Venue};
use tracing::{debug, info};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

pub const MAINNET_API_URL: &str = "https://api.hyperliquid.xyz";
pub const TESTNET_API_URL: &str = "https://api.hyperliquid-testnet.xyz";

/// Default timeout for exchange-endpoint requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Which network the configured API URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// Detect the network from the API base URL.
    pub fn from_api_url(url: &str) -> Self {
        if url.trim_end_matches('/').ends_with("-testnet.xyz") {
            Self::Testnet
        } else {
            Self::Mainnet
        }
    }

    pub fn default_api_url(&self) -> &'static str {
        match self {
            Self::Mainnet => MAINNET_API_URL,
            Self::Testnet => TESTNET_API_URL,
        }
    }

    /// Chain id signatures default to: Arbitrum One / Arbitrum Sepolia.
    ///
    /// Withdrawals settle on this chain; it is derived from the network
    /// and never set independently of it.
    pub fn default_signature_chain_id(&self) -> u64 {
        match self {
            Self::Mainnet => 0xa4b1,
            Self::Testnet => 0x66eee,
        }
    }

    pub fn is_mainnet(&self) -> bool {
        matches!(self, Self::Mainnet)
    }
}

/// Where the reference price for the sell cushion comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceSource {
    /// Best bid: the price a market-like sell transacts against.
    #[default]
    BestBid,
    /// Midpoint of best bid and ask.
    Mid,
}

impl FromStr for PriceSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bid" | "best_bid" => Ok(Self::BestBid),
            "mid" => Ok(Self::Mid),
            other => Err(format!("unknown price source: {other}")),
        }
    }
}

/// Outcome of an IOC order submission.
#[derive(Debug, Clone)]
pub enum FillResult {
    /// The order matched; `total_size` may be a partial fill.
    Filled {
        total_size: Decimal,
        avg_price: Decimal,
        oid: u64,
    },
    /// The order matched nothing or was rejected outright.
    Rejected { reason: String },
}

impl FillResult {
    pub fn filled_size(&self) -> Decimal {
        match self {
            Self::Filled { total_size, .. } => *total_size,
            Self::Rejected { .. } => Decimal::ZERO,
        }
    }

    pub fn is_filled(&self) -> bool {
        !self.filled_size().is_zero()
    }
}

/// Typed operations the orchestration layer depends on.
///
/// All amounts cross this boundary as exact decimals; implementations own
/// wire formatting and signing.
pub trait ExchangeApi: Send + Sync {
    /// Resolve a pair and both legs from spot metadata.
    fn pair_metadata<'a>(
        &'a self,
        pair_name: &'a str,
        base: &'a str,
        quote: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<PairMeta>>;

    /// Resolve a single token from spot metadata.
    fn token_metadata<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, ExchangeResult<TokenMeta>>;

    /// Live available balance for the account on a venue.
    fn balance<'a>(
        &'a self,
        token: &'a str,
        venue: Venue,
    ) -> BoxFuture<'a, ExchangeResult<Balance>>;

    /// Current reference price for a pair.
    fn reference_price<'a>(
        &'a self,
        pair_name: &'a str,
        source: PriceSource,
    ) -> BoxFuture<'a, ExchangeResult<Decimal>>;

    /// Submit the derived order. This is a commit point: once submitted,
    /// the run cannot be aborted.
    fn submit_order<'a>(
        &'a self,
        pair: &'a PairMeta,
        plan: &'a OrderPlan,
    ) -> BoxFuture<'a, ExchangeResult<FillResult>>;

    /// Move quote currency from the spot ledger to the perps ledger.
    fn transfer_to_perps<'a>(&'a self, amount: Decimal) -> BoxFuture<'a, ExchangeResult<()>>;

    /// Withdraw quote currency from the perps ledger to a chain address.
    fn withdraw<'a>(
        &'a self,
        amount: Decimal,
        destination: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<()>>;
}

/// Generic response envelope from the exchange endpoint.
#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    status: String,
    #[serde(default)]
    response: Option<serde_json::Value>,
}

/// Inner order response: `{"type":"order","data":{"statuses":[...]}}`.
#[derive(Debug, Deserialize)]
struct OrderResponse {
    #[serde(default)]
    data: Option<OrderResponseData>,
}

#[derive(Debug, Deserialize)]
struct OrderResponseData {
    #[serde(default)]
    statuses: Vec<OrderStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrderStatus {
    Filled { filled: FillInfo },
    Resting { resting: RestingInfo },
    Error { error: String },
}

#[derive(Debug, Deserialize)]
struct FillInfo {
    #[serde(rename = "totalSz", with = "rust_decimal::serde::str")]
    total_sz: Decimal,
    #[serde(rename = "avgPx", with = "rust_decimal::serde::str")]
    avg_px: Decimal,
    oid: u64,
}

#[derive(Debug, Deserialize)]
struct RestingInfo {
    #[allow(dead_code)]
    oid: u64,
}

fn fill_from_response(response: Option<serde_json::Value>) -> ExchangeResult<FillResult> {
    let value = response.ok_or_else(|| ExchangeError::Api("missing order response".to_string()))?;
    let parsed: OrderResponse = serde_json::from_value(value)
        .map_err(|e| ExchangeError::Api(format!("unrecognized order response: {e}")))?;

    let status = parsed
        .data
        .and_then(|d| d.statuses.into_iter().next())
        .ok_or_else(|| ExchangeError::Api("no order status returned".to_string()))?;

    Ok(match status {
        OrderStatus::Filled { filled } => FillResult::Filled {
            total_size: filled.total_sz,
            avg_price: filled.avg_px,
            oid: filled.oid,
        },
        // An IOC never rests; treat it as zero fill if the venue says otherwise.
        OrderStatus::Resting { .. } => FillResult::Rejected {
            reason: "order rested on the book".to_string(),
        },
        OrderStatus::Error { error } => FillResult::Rejected { reason: error },
    })
}

/// HTTP-backed exchange client.
pub struct HttpExchange {
    info: InfoClient,
    http: Client,
    exchange_url: String,
    signer: RequestSigner,
    /// Account whose balances are queried and whose funds move. May differ
    /// from the signing key's address when an agent wallet is used.
    account: String,
    network: Network,
}

impl HttpExchange {
    pub fn new(
        api_url: &str,
        account_address: impl Into<String>,
        signer: RequestSigner,
    ) -> ExchangeResult<Self> {
        let base = api_url.trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ExchangeError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            info: InfoClient::new(base.clone())?,
            http,
            exchange_url: format!("{base}/exchange"),
            signer,
            account: account_address.into(),
            network: Network::from_api_url(&base),
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Millisecond timestamp, used as the nonce for every signed action.
    fn nonce() -> u64 {
        chrono::Utc::now().timestamp_millis() as u64
    }

    async fn post_exchange(&self, payload: &ExchangePayload) -> ExchangeResult<ExchangeResponse> {
        let response = self
            .http
            .post(&self.exchange_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ExchangeError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::HttpClient(format!("HTTP {status}: {body}")));
        }

        let parsed: ExchangeResponse = response.json().await.map_err(|e| {
            ExchangeError::HttpClient(format!("Failed to parse exchange response: {e}"))
        })?;

        if parsed.status != "ok" {
            let detail = parsed
                .response
                .map(|v| v.to_string())
                .unwrap_or_else(|| "no detail".to_string());
            return Err(ExchangeError::Api(format!(
                "exchange returned {}: {detail}",
                parsed.status
            )));
        }

        Ok(parsed)
    }
}

impl ExchangeApi for HttpExchange {
    fn pair_metadata<'a>(
        &'a self,
        pair_name: &'a str,
        base: &'a str,
        quote: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<PairMeta>> {
        Box::pin(async move {
            let meta = self.info.spot_meta().await?;
            meta.resolve_pair(pair_name, base, quote)
        })
    }

    fn token_metadata<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, ExchangeResult<TokenMeta>> {
        Box::pin(async move {
            let meta = self.info.spot_meta().await?;
            meta.resolve_token(symbol)
        })
    }

    fn balance<'a>(
        &'a self,
        token: &'a str,
        venue: Venue,
    ) -> BoxFuture<'a, ExchangeResult<Balance>> {
        Box::pin(async move {
            let available = match venue {
                Venue::Spot => self.info.spot_balances(&self.account).await?.free(token),
                Venue::Perps => {
                    self.info
                        .clearinghouse_state(&self.account)
                        .await?
                        .withdrawable
                }
            };
            debug!(token = %token, venue = %venue, available = %available, "Balance read");
            Ok(Balance::new(token, venue, available))
        })
    }

    fn reference_price<'a>(
        &'a self,
        pair_name: &'a str,
        source: PriceSource,
    ) -> BoxFuture<'a, ExchangeResult<Decimal>> {
        Box::pin(async move {
            let book = self.info.l2_book(pair_name).await?;
            let price = match source {
                PriceSource::BestBid => book.best_bid(),
                PriceSource::Mid => book.mid(),
            };
            price.ok_or_else(|| ExchangeError::EmptyBook(pair_name.to_string()))
        })
    }

    fn submit_order<'a>(
        &'a self,
        pair: &'a PairMeta,
        plan: &'a OrderPlan,
    ) -> BoxFuture<'a, ExchangeResult<FillResult>> {
        Box::pin(async move {
            let action = OrderAction::single(OrderWire {
                asset: pair.asset_id(),
                is_buy: plan.side.is_buy(),
                limit_px: format_wire(plan.limit_px.inner(), pair.price_decimals()),
                sz: format_wire(plan.size.inner(), pair.base.sz_decimals),
                reduce_only: false,
                order_type: OrderTypeWire::with_tif(plan.tif),
            });

            let nonce = Self::nonce();
            let signature = self.signer.sign_l1_action(&action, nonce).await?;
            let payload = ExchangePayload {
                action: serde_json::to_value(&action)
                    .map_err(|e| ExchangeError::Serialization(e.to_string()))?,
                nonce,
                signature,
                vault_address: None,
            };

            info!(
                pair = %pair.name,
                side = %plan.side,
                sz = %plan.size,
                limit_px = %plan.limit_px,
                tif = %plan.tif,
                "Submitting order"
            );
            let response = self.post_exchange(&payload).await?;
            fill_from_response(response.response)
        })
    }

    fn transfer_to_perps<'a>(&'a self, amount: Decimal) -> BoxFuture<'a, ExchangeResult<()>> {
        Box::pin(async move {
            let nonce = Self::nonce();
            let action = UsdClassTransferAction {
                action_type: "usdClassTransfer".to_string(),
                hyperliquid_chain: self.signer.hyperliquid_chain().to_string(),
                signature_chain_id: self.signer.signature_chain_id_hex(),
                // The caller already floored to the quote asset's decimals.
                amount: amount.normalize().to_string(),
                to_perp: true,
                nonce,
            };
            let signature = self.signer.sign_usd_class_transfer(&action).await?;
            let payload = ExchangePayload {
                action: serde_json::to_value(&action)
                    .map_err(|e| ExchangeError::Serialization(e.to_string()))?,
                nonce,
                signature,
                vault_address: None,
            };

            info!(amount = %action.amount, "Transferring spot -> perps");
            self.post_exchange(&payload).await?;
            Ok(())
        })
    }

    fn withdraw<'a>(
        &'a self,
        amount: Decimal,
        destination: &'a str,
    ) -> BoxFuture<'a, ExchangeResult<()>> {
        Box::pin(async move {
            let time = Self::nonce();
            let action = WithdrawAction {
                action_type: "withdraw3".to_string(),
                hyperliquid_chain: self.signer.hyperliquid_chain().to_string(),
                signature_chain_id: self.signer.signature_chain_id_hex(),
                amount: format_amount(amount, sweep_core::WITHDRAW_DECIMALS),
                time,
                destination: destination.to_string(),
            };
            let signature = self.signer.sign_withdraw(&action).await?;
            let payload = ExchangePayload {
                action: serde_json::to_value(&action)
                    .map_err(|e| ExchangeError::Serialization(e.to_string()))?,
                nonce: time,
                signature,
                vault_address: None,
            };

            info!(amount = %action.amount, destination = %destination, "Withdrawing from perps");
            self.post_exchange(&payload).await?;
            Ok(())
        })
    }
}
