//! Request signing for exchange actions.
//!
//! Two signing paths exist, matching the venue's reference client:
//!
//! 1. L1 actions (orders): msgpack-serialize the action, hash it together
//!    with the nonce into an `action_hash`, wrap that in a phantom `Agent`
//!    struct and sign it with EIP-712 under a fixed domain
//!    (`Exchange`, chainId 1337).
//! 2. User-signed actions (ledger transfer, withdrawal): hash the action's
//!    fields directly as an EIP-712 struct under the
//!    `HyperliquidSignTransaction` domain, whose chainId is the configured
//!    signature chain id.
//!
//! The primary types of user-signed actions contain a colon
//! (`HyperliquidTransaction:Withdraw`), which `sol!` cannot name, so their
//! struct hashes are assembled manually.

use crate::actions::{ActionSignature, UsdClassTransferAction, WithdrawAction};
use crate::error::{ExchangeError, ExchangeResult};
use alloy::primitives::{keccak256, Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer as AlloySigner;
use alloy::sol;
use alloy::sol_types::{eip712_domain, Eip712Domain, SolStruct};
use serde::Serialize;
use zeroize::Zeroizing;

/// EIP-712 domain constants for L1 actions.
const L1_DOMAIN_NAME: &str = "Exchange";
const L1_DOMAIN_VERSION: &str = "1";
const L1_CHAIN_ID: u64 = 1337;

/// EIP-712 domain constants for user-signed actions.
const USER_DOMAIN_NAME: &str = "HyperliquidSignTransaction";
const USER_DOMAIN_VERSION: &str = "1";

/// Type strings for the user-signed primary types.
const USD_CLASS_TRANSFER_TYPE: &[u8] =
    b"HyperliquidTransaction:UsdClassTransfer(string hyperliquidChain,string amount,bool toPerp,uint64 nonce)";
const WITHDRAW_TYPE: &[u8] =
    b"HyperliquidTransaction:Withdraw(string hyperliquidChain,string destination,string amount,uint64 time)";

// EIP-712 type definition for the L1 phantom agent.
sol! {
    #[derive(Debug)]
    struct Agent {
        string source;
        bytes32 connectionId;
    }
}

/// Calculate the L1 action hash.
///
/// msgpack(action) || nonce as big-endian u64 || vault tag
/// (0x00 when no vault, 0x01 + address otherwise), keccak256'd.
pub fn action_hash<T: Serialize>(
    action: &T,
    nonce: u64,
    vault_address: Option<Address>,
) -> ExchangeResult<B256> {
    let mut data = rmp_serde::to_vec_named(action)
        .map_err(|e| ExchangeError::Serialization(e.to_string()))?;
    data.extend_from_slice(&nonce.to_be_bytes());
    match vault_address {
        None => data.push(0x00),
        Some(addr) => {
            data.push(0x01);
            data.extend_from_slice(addr.as_slice());
        }
    }
    Ok(keccak256(&data))
}

/// Signs exchange actions with the account's private credential.
///
/// Key material is decoded through `Zeroizing` buffers and never logged.
pub struct RequestSigner {
    signer: PrivateKeySigner,
    is_mainnet: bool,
    signature_chain_id: u64,
}

impl RequestSigner {
    /// Build a signer from a hex-encoded private key (0x prefix optional).
    pub fn from_hex_key(
        secret: &str,
        is_mainnet: bool,
        signature_chain_id: u64,
    ) -> ExchangeResult<Self> {
        let trimmed = secret.trim().trim_start_matches("0x");
        let secret_bytes: Zeroizing<Vec<u8>> = Zeroizing::new(
            hex::decode(trimmed).map_err(|e| ExchangeError::InvalidKey(e.to_string()))?,
        );
        let signer = PrivateKeySigner::from_slice(&secret_bytes)
            .map_err(|e| ExchangeError::InvalidKey(e.to_string()))?;

        Ok(Self {
            signer,
            is_mainnet,
            signature_chain_id,
        })
    }

    /// Address derived from the signing key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// "Mainnet" or "Testnet", as carried inside user-signed actions.
    pub fn hyperliquid_chain(&self) -> &'static str {
        if self.is_mainnet {
            "Mainnet"
        } else {
            "Testnet"
        }
    }

    /// Signature chain id formatted for action payloads (e.g., "0xa4b1").
    pub fn signature_chain_id_hex(&self) -> String {
        format!("{:#x}", self.signature_chain_id)
    }

    /// Sign an L1 action (orders).
    pub async fn sign_l1_action<T: Serialize>(
        &self,
        action: &T,
        nonce: u64,
    ) -> ExchangeResult<ActionSignature> {
        let connection_id = action_hash(action, nonce, None)?;
        let agent = Agent {
            source: if self.is_mainnet { "a" } else { "b" }.to_string(),
            connectionId: connection_id,
        };
        let domain = eip712_domain! {
            name: L1_DOMAIN_NAME,
            version: L1_DOMAIN_VERSION,
            chain_id: L1_CHAIN_ID,
            verifying_contract: Address::ZERO,
        };

        let signing_hash = agent.eip712_signing_hash(&domain);
        let signature = self
            .signer
            .sign_hash(&signing_hash)
            .await
            .map_err(|e| ExchangeError::Signing(e.to_string()))?;

        Ok(ActionSignature::from_signature(&signature))
    }

    /// Sign a spot<->perps ledger transfer.
    pub async fn sign_usd_class_transfer(
        &self,
        action: &UsdClassTransferAction,
    ) -> ExchangeResult<ActionSignature> {
        let mut data = Vec::new();
        data.extend_from_slice(keccak256(USD_CLASS_TRANSFER_TYPE).as_slice());
        data.extend_from_slice(keccak256(action.hyperliquid_chain.as_bytes()).as_slice());
        data.extend_from_slice(keccak256(action.amount.as_bytes()).as_slice());
        data.extend_from_slice(&bool_word(action.to_perp));
        data.extend_from_slice(&u64_word(action.nonce));

        self.sign_user_struct(keccak256(&data)).await
    }

    /// Sign a withdrawal to an external chain address.
    pub async fn sign_withdraw(&self, action: &WithdrawAction) -> ExchangeResult<ActionSignature> {
        let mut data = Vec::new();
        data.extend_from_slice(keccak256(WITHDRAW_TYPE).as_slice());
        data.extend_from_slice(keccak256(action.hyperliquid_chain.as_bytes()).as_slice());
        data.extend_from_slice(keccak256(action.destination.as_bytes()).as_slice());
        data.extend_from_slice(keccak256(action.amount.as_bytes()).as_slice());
        data.extend_from_slice(&u64_word(action.time));

        self.sign_user_struct(keccak256(&data)).await
    }

    fn user_domain(&self) -> Eip712Domain {
        eip712_domain! {
            name: USER_DOMAIN_NAME,
            version: USER_DOMAIN_VERSION,
            chain_id: self.signature_chain_id,
            verifying_contract: Address::ZERO,
        }
    }

    /// signing_hash = keccak256(0x1901 || domain_separator || struct_hash)
    async fn sign_user_struct(&self, struct_hash: B256) -> ExchangeResult<ActionSignature> {
        let domain = self.user_domain();
        let mut data = Vec::with_capacity(66);
        data.extend_from_slice(&[0x19, 0x01]);
        data.extend_from_slice(domain.hash_struct().as_slice());
        data.extend_from_slice(struct_hash.as_slice());
        let signing_hash = keccak256(&data);

        let signature = self
            .signer
            .sign_hash(&signing_hash)
            .await
            .map_err(|e| ExchangeError::Signing(e.to_string()))?;

        Ok(ActionSignature::from_signature(&signature))
    }
}

/// abi-encode a bool as a 32-byte word.
fn bool_word(b: bool) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[31] = b as u8;
    word
}

/// abi-encode a u64 as a 32-byte big-endian word.
fn u64_word(v: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&v.to_be_bytes());
    word
}
