//! Environment-driven configuration.
//!
//! Everything except the per-run CLI flags comes from the environment
//! (a `.env` file is honored). Validation happens here, before any
//! network call: a missing credential or pair symbol must never reach
//! the exchange client.

use anyhow::{Context, Result};
use std::env;
use sweep_exchange::{Network, PriceSource};
use sweep_flow::{Mode, DEFAULT_SETTLE_WAIT};

/// Process configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Account whose balances move (0x address).
    pub account_address: String,
    /// Hex private key used for signing.
    pub secret_key: String,
    /// API base URL; picks mainnet or testnet.
    pub api_url: String,
    pub network: Network,
    /// Chain id withdrawals are signed for. Defaults from the network;
    /// overridable only here, never per-invocation.
    pub signature_chain_id: u64,
    pub pair_name: String,
    pub base_token: String,
    pub quote_token: String,
    pub settle_wait_ms: u64,
    pub price_source: PriceSource,
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("Set {key} in your environment (or .env)"))
}

/// Parse a chain id given as hex ("0xa4b1") or decimal.
fn parse_chain_id(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    match trimmed.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16)
            .with_context(|| format!("HL_SIGNATURE_CHAIN_ID is not valid hex: {raw}")),
        None => trimmed
            .parse()
            .with_context(|| format!("HL_SIGNATURE_CHAIN_ID is not a number: {raw}")),
    }
}

impl Config {
    /// Load and validate configuration for the given mode.
    ///
    /// Withdraw mode only moves the quote asset, so the pair and base
    /// symbols are not required there.
    pub fn from_env(mode: Mode) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let account_address = required("HL_ACCOUNT_ADDRESS")?;
        let secret_key = required("HL_SECRET_KEY")?;

        let api_url = optional("HL_API_URL")
            .unwrap_or_else(|| Network::Mainnet.default_api_url().to_string());
        let network = Network::from_api_url(&api_url);
        let signature_chain_id = match optional("HL_SIGNATURE_CHAIN_ID") {
            Some(raw) => parse_chain_id(&raw)?,
            None => network.default_signature_chain_id(),
        };

        let quote_token = required("QUOTE_TOKEN")?;
        let (pair_name, base_token) = if mode == Mode::Withdraw {
            (
                optional("PAIR_NAME").unwrap_or_default(),
                optional("BASE_TOKEN").unwrap_or_default(),
            )
        } else {
            (required("PAIR_NAME")?, required("BASE_TOKEN")?)
        };

        let settle_wait_ms = match optional("SETTLE_WAIT_MS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("SETTLE_WAIT_MS is not a number: {raw}"))?,
            None => DEFAULT_SETTLE_WAIT.as_millis() as u64,
        };

        let price_source = match optional("PRICE_SOURCE") {
            Some(raw) => raw.parse::<PriceSource>().map_err(anyhow::Error::msg)?,
            None => PriceSource::default(),
        };

        Ok(Self {
            account_address,
            secret_key,
            api_url,
            network,
            signature_chain_id,
            pair_name,
            base_token,
            quote_token,
            settle_wait_ms,
            price_source,
        })
    }
}
