//! # Addresses
//!
//! An address is the Base58Check encoding of a 21-byte payload:
//!
//! ```text
//! version (1 byte) || RIPEMD-160(compressed public key) (20 bytes)
//! ```
//!
//! The version byte selects the network and therefore the leading character
//! (`A` on mainnet, `D` on devnet). Base58Check appends a 4-byte double
//! SHA-256 checksum, so a mistyped address fails to decode.

use thiserror::Error;

use super::hash::ripemd160;
use super::keys::ArkPublicKey;
use crate::config::RECIPIENT_LENGTH;

/// Errors from decoding an address string.
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("base58check decode failed for {address}: {reason}")]
    Base58 { address: String, reason: String },

    #[error("address payload must be {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

/// Encodes a 21-byte payload as a Base58Check string.
pub fn encode(payload: &[u8; RECIPIENT_LENGTH]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Decodes a Base58Check address into its 21-byte payload.
///
/// Verifies the checksum and the payload length. The version byte is not
/// checked against any particular network.
pub fn decode(address: &str) -> Result<[u8; RECIPIENT_LENGTH], AddressError> {
    let decoded = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|e| AddressError::Base58 {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

    if decoded.len() != RECIPIENT_LENGTH {
        return Err(AddressError::InvalidLength {
            expected: RECIPIENT_LENGTH,
            got: decoded.len(),
        });
    }

    let mut payload = [0u8; RECIPIENT_LENGTH];
    payload.copy_from_slice(&decoded);
    Ok(payload)
}

/// Returns the version byte of an address.
pub fn version_of(address: &str) -> Result<u8, AddressError> {
    decode(address).map(|payload| payload[0])
}

/// Derives the address of `public_key` on the network identified by `version`.
pub fn from_public_key(public_key: &ArkPublicKey, version: u8) -> String {
    let mut payload = [0u8; RECIPIENT_LENGTH];
    payload[0] = version;
    payload[1..].copy_from_slice(&ripemd160(public_key.as_bytes()));
    encode(&payload)
}
