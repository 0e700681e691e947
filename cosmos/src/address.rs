//! Address parsing for request parameters and validator keys.
//!
//! Query parameters arrive as untrusted strings. Cosmos addresses are
//! checked to be valid bech32 with the expected human-readable prefix before
//! being forwarded to the node; Ethereum addresses are parsed into 20 raw
//! bytes.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bech32::{Bech32, Hrp};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::types::staking::ConsensusPubkey;

/// Length of an account / validator / consensus address in bytes.
pub const ADDRESS_LEN: usize = 20;

const ED25519_PUBKEY_TYPE: &str = "/cosmos.crypto.ed25519.PubKey";

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("missing address")]
    Missing,
    #[error("invalid bech32 address {address:?}: {reason}")]
    Bech32 { address: String, reason: String },
    #[error("address {address:?} has prefix {actual:?}, expected {expected:?}")]
    Prefix {
        address: String,
        expected: String,
        actual: String,
    },
    #[error("invalid ethereum address {0:?}")]
    Ethereum(String),
    #[error("unsupported consensus key type {0:?}")]
    KeyType(String),
    #[error("invalid consensus key encoding: {0}")]
    KeyEncoding(String),
}

/// Checks that `address` is valid bech32 carrying `expected_prefix`.
///
/// Returns the address normalized to lower case.
pub fn validate_bech32(address: &str, expected_prefix: &str) -> Result<String, AddressError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(AddressError::Missing);
    }

    let (hrp, _data) = bech32::decode(address).map_err(|e| AddressError::Bech32 {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    let actual = hrp.to_string().to_lowercase();
    if actual != expected_prefix {
        return Err(AddressError::Prefix {
            address: address.to_string(),
            expected: expected_prefix.to_string(),
            actual,
        });
    }

    Ok(address.to_lowercase())
}

/// Encodes raw address bytes with the given bech32 prefix.
pub fn encode_bech32(prefix: &str, bytes: &[u8]) -> Result<String, AddressError> {
    let hrp = Hrp::parse(prefix).map_err(|e| AddressError::Bech32 {
        address: prefix.to_string(),
        reason: e.to_string(),
    })?;
    bech32::encode::<Bech32>(hrp, bytes).map_err(|e| AddressError::Bech32 {
        address: prefix.to_string(),
        reason: e.to_string(),
    })
}

/// Derives the bech32 consensus address (`<prefix>valcons1...`) of a
/// validator from its ed25519 consensus public key.
///
/// The slashing module keys signing infos by this address.
pub fn consensus_address(
    pubkey: &ConsensusPubkey,
    consensus_prefix: &str,
) -> Result<String, AddressError> {
    if pubkey.type_url != ED25519_PUBKEY_TYPE {
        return Err(AddressError::KeyType(pubkey.type_url.clone()));
    }

    let key = BASE64
        .decode(pubkey.key.as_bytes())
        .map_err(|e| AddressError::KeyEncoding(e.to_string()))?;
    let digest = Sha256::digest(&key);

    encode_bech32(consensus_prefix, &digest[..ADDRESS_LEN])
}

/// 20-byte Ethereum account or contract address.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct EthAddress(pub [u8; ADDRESS_LEN]);

impl EthAddress {
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl FromStr for EthAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let bytes = hex::decode(digits).map_err(|_| AddressError::Ethereum(s.to_string()))?;
        let raw: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AddressError::Ethereum(s.to_string()))?;
        Ok(EthAddress(raw))
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
