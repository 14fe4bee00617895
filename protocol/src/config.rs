//! # Network Parameters & Wire Constants
//!
//! Every magic number in the transaction engine lives here. Fees and the
//! epoch anchor are not compiled into the builder: they travel in a
//! [`NetworkParams`] value so one binary can sign for mainnet, devnet, or a
//! private fork without recompiling.
//!
//! The wire constants at the top of the file are different. Those describe
//! the byte layout nodes expect, and changing any of them breaks every
//! signature and transaction ID on the network.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transaction::types::TransactionType;

// ---------------------------------------------------------------------------
// Wire Constants
// ---------------------------------------------------------------------------

/// Bytes reserved for the vendor field in the canonical serialization.
pub const VENDOR_FIELD_LENGTH: usize = 64;

/// Longest vendor field that is written verbatim. Anything longer gets an
/// all-zero slot (legacy policy) or is rejected (strict policy).
pub const MAX_VENDOR_FIELD_CONTENT: usize = VENDOR_FIELD_LENGTH - 1;

/// Decoded Base58Check recipient: 1 version byte + 20-byte RIPEMD-160 hash.
pub const RECIPIENT_LENGTH: usize = 21;

/// Compressed secp256k1 public key length.
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// 2017-03-21T13:00:00Z, the instant every transaction timestamp counts from.
pub const EPOCH_ANCHOR_SECS: i64 = 1_490_101_200;

// ---------------------------------------------------------------------------
// Fee Defaults (arktoshi, 10^-8 ARK)
// ---------------------------------------------------------------------------

pub const TRANSFER_FEE: u64 = 10_000_000;
pub const SECOND_SIGNATURE_FEE: u64 = 500_000_000;
pub const DELEGATE_FEE: u64 = 2_500_000_000;
pub const VOTE_FEE: u64 = 100_000_000;

/// Charged once per multi-signature participant, the sender included.
pub const MULTI_SIGNATURE_UNIT_FEE: u64 = 500_000_000;

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Address version byte for mainnet. Encodes to addresses starting with `A`.
pub const MAINNET_ADDRESS_VERSION: u8 = 0x17;

/// Address version byte for devnet. Encodes to addresses starting with `D`.
pub const DEVNET_ADDRESS_VERSION: u8 = 0x1e;

pub const MAINNET_NETHASH: &str =
    "6e84d08bd299ed97c212c886c98a57e36545c8f5d645ca7eeae63a8bd62d8988";

pub const DEVNET_NETHASH: &str =
    "578e820911f24e039733b45e4882b73e301f813a0d2c31330dafda84534ffa23";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while parsing or validating network parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid network parameters JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("nethash must be 32 bytes of hex, got {0:?}")]
    InvalidNethash(String),

    #[error("fee for {0} must be non-zero")]
    ZeroFee(TransactionType),
}

// ---------------------------------------------------------------------------
// FeeTable
// ---------------------------------------------------------------------------

/// Static fee schedule, one entry per transaction type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTable {
    pub transfer: u64,
    pub second_signature: u64,
    pub delegate: u64,
    pub vote: u64,
    /// Per-participant fee. The total is `(keysgroup + 1) * multi_signature`.
    pub multi_signature: u64,
}

impl Default for FeeTable {
    fn default() -> Self {
        Self {
            transfer: TRANSFER_FEE,
            second_signature: SECOND_SIGNATURE_FEE,
            delegate: DELEGATE_FEE,
            vote: VOTE_FEE,
            multi_signature: MULTI_SIGNATURE_UNIT_FEE,
        }
    }
}

impl FeeTable {
    /// Returns the fee for a transaction of `tx_type`.
    ///
    /// `keysgroup_len` is only consulted for multi-signature registrations.
    /// Returns `None` if the multi-signature total overflows a `u64`.
    pub fn fee_for(&self, tx_type: TransactionType, keysgroup_len: usize) -> Option<u64> {
        match tx_type {
            TransactionType::Transfer => Some(self.transfer),
            TransactionType::SecondSignature => Some(self.second_signature),
            TransactionType::Delegate => Some(self.delegate),
            TransactionType::Vote => Some(self.vote),
            TransactionType::MultiSignature => {
                let participants = u64::try_from(keysgroup_len).ok()?.checked_add(1)?;
                participants.checked_mul(self.multi_signature)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// VendorFieldPolicy
// ---------------------------------------------------------------------------

/// What the builder does with a vendor field that does not fit the wire slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorFieldPolicy {
    /// Reject with [`TransactionError::VendorFieldOverflow`](crate::transaction::TransactionError::VendorFieldOverflow).
    #[default]
    Strict,
    /// Accept it and serialize an all-zero slot, as historical clients did.
    /// The memo survives in JSON but is not covered by the signature.
    Legacy,
}

// ---------------------------------------------------------------------------
// NetworkParams
// ---------------------------------------------------------------------------

/// The epoch anchor as a `DateTime`. Infallible: the anchor sits well inside
/// chrono's representable range.
fn default_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default() + Duration::seconds(EPOCH_ANCHOR_SECS)
}

/// Everything the builder needs to know about the target network.
///
/// Cheap to clone and immutable once handed to a
/// [`TransactionBuilder`](crate::transaction::TransactionBuilder), so any
/// number of builders can share one set of parameters across threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkParams {
    /// Human-readable name, used in logs only.
    pub name: String,
    /// Version byte prepended to the RIPEMD-160 hash in addresses.
    pub address_version: u8,
    #[serde(default = "default_epoch")]
    pub epoch: DateTime<Utc>,
    #[serde(default)]
    pub fees: FeeTable,
    #[serde(default)]
    pub vendor_field_policy: VendorFieldPolicy,
    #[serde(default)]
    pub nethash: Option<String>,
}

impl NetworkParams {
    pub fn mainnet() -> Self {
        Self {
            name: "mainnet".to_string(),
            address_version: MAINNET_ADDRESS_VERSION,
            epoch: default_epoch(),
            fees: FeeTable::default(),
            vendor_field_policy: VendorFieldPolicy::Strict,
            nethash: Some(MAINNET_NETHASH.to_string()),
        }
    }

    pub fn devnet() -> Self {
        Self {
            name: "devnet".to_string(),
            address_version: DEVNET_ADDRESS_VERSION,
            epoch: default_epoch(),
            fees: FeeTable::default(),
            vendor_field_policy: VendorFieldPolicy::Strict,
            nethash: Some(DEVNET_NETHASH.to_string()),
        }
    }

    /// Returns a copy with a different vendor field policy.
    pub fn with_vendor_field_policy(mut self, policy: VendorFieldPolicy) -> Self {
        self.vendor_field_policy = policy;
        self
    }

    /// Parses and validates parameters from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Reads a JSON parameters file from disk.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read network parameters from {}", path.display()))?;
        let params = Self::from_json_str(&raw)
            .with_context(|| format!("invalid network parameters in {}", path.display()))?;
        tracing::debug!(network = %params.name, path = %path.display(), "loaded network parameters");
        Ok(params)
    }

    /// Rejects zero fees and a nethash that is not 32 bytes of hex.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fees = [
            (TransactionType::Transfer, self.fees.transfer),
            (TransactionType::SecondSignature, self.fees.second_signature),
            (TransactionType::Delegate, self.fees.delegate),
            (TransactionType::Vote, self.fees.vote),
            (TransactionType::MultiSignature, self.fees.multi_signature),
        ];
        if let Some((tx_type, _)) = fees.iter().find(|(_, fee)| *fee == 0) {
            return Err(ConfigError::ZeroFee(*tx_type));
        }

        if let Some(ref nethash) = self.nethash {
            match hex::decode(nethash) {
                Ok(bytes) if bytes.len() == 32 => {}
                _ => return Err(ConfigError::InvalidNethash(nethash.clone())),
            }
        }

        Ok(())
    }

    /// Seconds elapsed between the epoch anchor and `now`.
    ///
    /// Instants before the anchor saturate to 0, and instants past the u32
    /// range saturate to `u32::MAX`.
    pub fn epoch_time(&self, now: DateTime<Utc>) -> u32 {
        let elapsed = now.signed_duration_since(self.epoch).num_seconds();
        u32::try_from(elapsed.max(0)).unwrap_or(u32::MAX)
    }

    /// [`epoch_time`](Self::epoch_time) for the current wall clock.
    pub fn epoch_time_now(&self) -> u32 {
        self.epoch_time(Utc::now())
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self::mainnet()
    }
}
