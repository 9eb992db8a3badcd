//! Spot metadata response types and pair resolution.
//!
//! Resolution happens once per run, before any balance is read or order
//! constructed: every decimal count downstream comes from here, so an
//! unknown token or pair aborts immediately.

use crate::error::{ExchangeError, ExchangeResult};
use serde::Deserialize;
use sweep_core::{PairMeta, TokenMeta};

/// Spot metadata: the token table plus the pair universe.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotMeta {
    #[serde(default)]
    pub universe: Vec<SpotPair>,
    #[serde(default)]
    pub tokens: Vec<SpotToken>,
}

/// One token entry from the spot token table.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotToken {
    pub name: String,
    pub index: u32,
    #[serde(rename = "szDecimals")]
    pub sz_decimals: u32,
    #[serde(rename = "weiDecimals")]
    pub wei_decimals: u32,
}

/// One pair entry from the spot universe.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotPair {
    pub name: String,
    pub index: u32,
    /// Token indices `[base, quote]`.
    #[serde(default)]
    pub tokens: Vec<u32>,
}

impl SpotMeta {
    /// Look up a token by symbol.
    pub fn resolve_token(&self, symbol: &str) -> ExchangeResult<TokenMeta> {
        self.tokens
            .iter()
            .find(|t| t.name == symbol)
            .map(|t| TokenMeta {
                symbol: t.name.clone(),
                index: t.index,
                sz_decimals: t.sz_decimals,
                wei_decimals: t.wei_decimals,
            })
            .ok_or_else(|| ExchangeError::TokenNotFound(symbol.to_string()))
    }

    /// Resolve a pair name plus its two legs into `PairMeta`.
    ///
    /// Fails fast if either token or the pair itself is missing; nothing
    /// downstream runs with partially-resolved metadata.
    pub fn resolve_pair(
        &self,
        pair_name: &str,
        base: &str,
        quote: &str,
    ) -> ExchangeResult<PairMeta> {
        let base = self.resolve_token(base)?;
        let quote = self.resolve_token(quote)?;
        let pair = self
            .universe
            .iter()
            .find(|p| p.name == pair_name)
            .ok_or_else(|| ExchangeError::PairNotFound(pair_name.to_string()))?;

        Ok(PairMeta {
            name: pair.name.clone(),
            index: pair.index,
            base,
            quote,
        })
    }
}
