//! Error types for transaction construction, serialization, and verification.

use thiserror::Error;

use super::draft::Stage;
use super::types::TransactionType;
use crate::crypto::{AddressError, KeyError};

/// Coarse classification of a [`TransactionError`], for callers that branch
/// on the failure family rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A secret could not be turned into a keypair.
    KeyDerivation,
    /// A lifecycle step was attempted out of order.
    Sequencing,
    /// A value does not fit its fixed wire budget.
    EncodingOverflow,
    /// A recipient address failed Base58Check decoding.
    MalformedAddress,
    /// The record is internally inconsistent or fails verification.
    Integrity,
}

/// Errors that can occur while building, signing, or verifying a transaction.
///
/// Nothing is retried: every operation is local and deterministic, so a
/// failure aborts the one record being built and nothing else.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(#[from] KeyError),

    #[error("second signature requires a primary signature")]
    MissingPrimarySignature,

    #[error("invalid lifecycle transition: {from} -> {to}")]
    InvalidTransition { from: Stage, to: Stage },

    #[error("vendor field is {len} bytes, at most {max} fit the wire slot")]
    VendorFieldOverflow { len: usize, max: usize },

    #[error("fee for {participants} multi-signature participants overflows u64")]
    FeeOverflow { participants: usize },

    #[error("malformed address: {0}")]
    MalformedAddress(#[from] AddressError),

    #[error("malformed hex in {field}: {source}")]
    MalformedHex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error("{tx_type} transaction cannot carry asset {asset}")]
    AssetMismatch {
        tx_type: TransactionType,
        asset: String,
    },

    #[error("vendor field is only allowed on transfers, not {0}")]
    VendorFieldNotAllowed(TransactionType),

    #[error("{tx_type} transaction must carry amount 0, got {amount}")]
    AmountNotAllowed { tx_type: TransactionType, amount: u64 },

    #[error("{0} transaction must not name a recipient")]
    RecipientNotAllowed(TransactionType),

    #[error("{0} transaction requires a recipient")]
    MissingRecipient(TransactionType),

    #[error("transaction ID mismatch: expected {expected}, got {actual}")]
    IdMismatch { expected: String, actual: String },

    #[error("transaction is missing its {0}")]
    MissingSignature(&'static str),

    #[error("{field} does not verify against {public_key}")]
    InvalidSignature {
        field: &'static str,
        public_key: String,
    },
}

impl TransactionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyDerivation(_) => ErrorKind::KeyDerivation,
            Self::MissingPrimarySignature | Self::InvalidTransition { .. } => ErrorKind::Sequencing,
            Self::VendorFieldOverflow { .. } | Self::FeeOverflow { .. } => {
                ErrorKind::EncodingOverflow
            }
            Self::MalformedAddress(_) => ErrorKind::MalformedAddress,
            Self::MalformedHex { .. }
            | Self::AssetMismatch { .. }
            | Self::VendorFieldNotAllowed(_)
            | Self::AmountNotAllowed { .. }
            | Self::RecipientNotAllowed(_)
            | Self::MissingRecipient(_)
            | Self::IdMismatch { .. }
            | Self::MissingSignature(_)
            | Self::InvalidSignature { .. } => ErrorKind::Integrity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_group_variants() {
        assert_eq!(
            TransactionError::MissingPrimarySignature.kind(),
            ErrorKind::Sequencing
        );
        assert_eq!(
            TransactionError::InvalidTransition {
                from: Stage::Signed,
                to: Stage::Signed
            }
            .kind(),
            ErrorKind::Sequencing
        );
        assert_eq!(
            TransactionError::VendorFieldOverflow { len: 70, max: 63 }.kind(),
            ErrorKind::EncodingOverflow
        );
        assert_eq!(
            TransactionError::from(KeyError::EmptyPassphrase).kind(),
            ErrorKind::KeyDerivation
        );
        assert_eq!(
            TransactionError::from(AddressError::InvalidLength {
                expected: 21,
                got: 3
            })
            .kind(),
            ErrorKind::MalformedAddress
        );
    }

    #[test]
    fn messages_carry_context() {
        let err = TransactionError::InvalidTransition {
            from: Stage::Populated,
            to: Stage::Identified,
        };
        assert_eq!(
            err.to_string(),
            "invalid lifecycle transition: Populated -> Identified"
        );
    }
}
