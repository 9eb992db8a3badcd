//! Wire formats for signed exchange actions.
//!
//! Field names and field order must match the venue's reference client
//! exactly: L1 actions are hashed with msgpack before signing, so a
//! reordered or extra key changes the hash and the signature fails
//! verification.

use alloy::primitives::PrimitiveSignature;
use serde::Serialize;
use sweep_core::TimeInForce;

/// Order wire format.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWire {
    /// Asset index (spot: 10000 + pair index).
    #[serde(rename = "a")]
    pub asset: u32,

    /// Buy (true) or Sell (false).
    #[serde(rename = "b")]
    pub is_buy: bool,

    /// Limit price as string.
    #[serde(rename = "p")]
    pub limit_px: String,

    /// Size as string.
    #[serde(rename = "s")]
    pub sz: String,

    /// Reduce-only flag.
    #[serde(rename = "r")]
    pub reduce_only: bool,

    /// Order type.
    #[serde(rename = "t")]
    pub order_type: OrderTypeWire,
}

/// Order type wire format: `{"limit": {"tif": "Ioc"}}`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderTypeWire {
    pub limit: LimitOrderType,
}

impl OrderTypeWire {
    pub fn with_tif(tif: TimeInForce) -> Self {
        Self {
            limit: LimitOrderType {
                tif: tif.wire_name().to_string(),
            },
        }
    }
}

/// Limit order type.
#[derive(Debug, Clone, Serialize)]
pub struct LimitOrderType {
    /// Time in force: "Gtc", "Ioc".
    pub tif: String,
}

/// L1 order action. Signed via msgpack action hash + phantom agent.
#[derive(Debug, Clone, Serialize)]
pub struct OrderAction {
    /// Always "order".
    #[serde(rename = "type")]
    pub action_type: String,

    pub orders: Vec<OrderWire>,

    /// Order grouping; "na" for standalone orders.
    pub grouping: String,
}

impl OrderAction {
    /// A single standalone order.
    pub fn single(order: OrderWire) -> Self {
        Self {
            action_type: "order".to_string(),
            orders: vec![order],
            grouping: "na".to_string(),
        }
    }
}

/// Spot-to-perps (or back) ledger transfer. User-signed EIP-712 action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdClassTransferAction {
    /// Always "usdClassTransfer".
    #[serde(rename = "type")]
    pub action_type: String,

    /// "Mainnet" or "Testnet".
    pub hyperliquid_chain: String,

    /// Hex chain id the signature was produced for (e.g., "0xa4b1").
    pub signature_chain_id: String,

    /// Amount as string, floored to the quote asset's decimals.
    pub amount: String,

    /// true: spot -> perps.
    pub to_perp: bool,

    /// Millisecond timestamp; doubles as the signing nonce.
    pub nonce: u64,
}

/// Withdrawal to an external chain address. User-signed EIP-712 action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawAction {
    /// Always "withdraw3".
    #[serde(rename = "type")]
    pub action_type: String,

    /// "Mainnet" or "Testnet".
    pub hyperliquid_chain: String,

    /// Hex chain id the signature was produced for.
    pub signature_chain_id: String,

    /// Amount as string, at most 8 fractional digits.
    pub amount: String,

    /// Millisecond timestamp; doubles as the signing nonce.
    pub time: u64,

    /// Destination EVM address.
    pub destination: String,
}

/// EIP-712 signature components as the venue expects them.
#[derive(Debug, Clone, Serialize)]
pub struct ActionSignature {
    /// r component (hex with 0x prefix).
    pub r: String,
    /// s component (hex with 0x prefix).
    pub s: String,
    /// Recovery id, 27 or 28.
    pub v: u8,
}

impl ActionSignature {
    /// Convert from a raw signature, normalizing v from 0/1 to 27/28.
    pub fn from_signature(sig: &PrimitiveSignature) -> Self {
        Self {
            r: format!("0x{}", hex::encode(sig.r().to_be_bytes::<32>())),
            s: format!("0x{}", hex::encode(sig.s().to_be_bytes::<32>())),
            v: if sig.v() { 28 } else { 27 },
        }
    }
}

/// Body POSTed to the exchange endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangePayload {
    pub action: serde_json::Value,
    pub nonce: u64,
    pub signature: ActionSignature,
    /// Omitted entirely when None (personal account trading).
    #[serde(rename = "vaultAddress", skip_serializing_if = "Option::is_none")]
    pub vault_address: Option<String>,
}
