//! Core type definitions for ARK transactions.
//!
//! The transaction type and its asset payload are two halves of one tagged
//! union on the wire. Here they are separate types, and [`Asset::transaction_type`]
//! ties them back together, so a vote list can never end up on a
//! multi-signature registration.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::error::TransactionError;
use crate::crypto::keys::ArkPublicKey;

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Discriminant for the operation a transaction represents.
///
/// Serialized as its numeric tag in JSON (`"type": 0`) and as a 2-byte
/// little-endian integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TransactionType {
    /// Value transfer to a recipient address, with an optional memo.
    Transfer = 0,
    /// Registers a second public key that must co-sign every later transaction.
    SecondSignature = 1,
    /// Registers the sender as a delegate under a username.
    Delegate = 2,
    /// Casts or withdraws votes for delegates.
    Vote = 3,
    /// Converts the sender into a multi-signature account.
    MultiSignature = 4,
}

/// Returned when a numeric tag does not name a known transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown transaction type tag {0}")]
pub struct UnknownTransactionType(pub u8);

impl TransactionType {
    /// The tag as written to the wire.
    ///
    /// Two bytes even though one would do: nodes expect the wider slot.
    pub fn wire_tag(self) -> i16 {
        i16::from(u8::from(self))
    }

    /// Every type except `Transfer` carries an asset payload.
    pub fn expects_asset(self) -> bool {
        !matches!(self, Self::Transfer)
    }

    /// Only a transfer moves value. Every other type has amount 0.
    pub fn carries_amount(self) -> bool {
        matches!(self, Self::Transfer)
    }

    /// Transfers name a recipient and votes address the sender. The
    /// registration types have no recipient at all.
    pub fn requires_recipient(self) -> bool {
        matches!(self, Self::Transfer | Self::Vote)
    }

    /// A second-signature registration is signed by the first key only.
    pub fn allows_second_signature(self) -> bool {
        !matches!(self, Self::SecondSignature)
    }
}

impl From<TransactionType> for u8 {
    fn from(tx_type: TransactionType) -> Self {
        tx_type as u8
    }
}

impl TryFrom<u8> for TransactionType {
    type Error = UnknownTransactionType;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Transfer),
            1 => Ok(Self::SecondSignature),
            2 => Ok(Self::Delegate),
            3 => Ok(Self::Vote),
            4 => Ok(Self::MultiSignature),
            other => Err(UnknownTransactionType(other)),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer => write!(f, "Transfer"),
            Self::SecondSignature => write!(f, "SecondSignature"),
            Self::Delegate => write!(f, "Delegate"),
            Self::Vote => write!(f, "Vote"),
            Self::MultiSignature => write!(f, "MultiSignature"),
        }
    }
}

// ---------------------------------------------------------------------------
// Asset payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureAsset {
    /// Hex of the compressed second public key.
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateAsset {
    pub username: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSignatureAsset {
    /// Signatures required to authorize a spend.
    pub min: u8,
    /// Hours a pending transaction waits for co-signers.
    pub lifetime: u8,
    /// Participant keys, each prefixed with `+`.
    pub keysgroup: Vec<String>,
}

/// Type-specific payload. Emitted in JSON under a single key:
/// `{"signature": {...}}`, `{"delegate": {...}}`, `{"votes": [...]}` or
/// `{"multisignature": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Signature(SignatureAsset),
    Delegate(DelegateAsset),
    Votes(Vec<String>),
    MultiSignature(MultiSignatureAsset),
}

impl Asset {
    /// The only transaction type this payload may ride on.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Signature(_) => TransactionType::SecondSignature,
            Self::Delegate(_) => TransactionType::Delegate,
            Self::Votes(_) => TransactionType::Vote,
            Self::MultiSignature(_) => TransactionType::MultiSignature,
        }
    }

    /// Appends the canonical asset bytes to `buf`.
    ///
    /// Strings are written raw with no length prefix. Only the second
    /// signature public key is hex-decoded.
    pub(crate) fn write_bytes(&self, buf: &mut Vec<u8>) -> Result<(), TransactionError> {
        match self {
            Self::Signature(asset) => {
                let key = hex::decode(&asset.public_key).map_err(|source| {
                    TransactionError::MalformedHex {
                        field: "asset.signature.publicKey",
                        source,
                    }
                })?;
                buf.extend_from_slice(&key);
            }
            Self::Delegate(asset) => buf.extend_from_slice(asset.username.as_bytes()),
            Self::Votes(votes) => {
                for vote in votes {
                    buf.extend_from_slice(vote.as_bytes());
                }
            }
            Self::MultiSignature(asset) => {
                buf.push(asset.min);
                buf.push(asset.lifetime);
                for key in &asset.keysgroup {
                    buf.extend_from_slice(key.as_bytes());
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Vote
// ---------------------------------------------------------------------------

/// A single vote entry. Displays as `+<hex>` (vote) or `-<hex>` (unvote),
/// the form `asset.votes` carries.
///
/// ```
/// use ark_protocol::crypto::ArkKeypair;
/// use ark_protocol::transaction::Vote;
///
/// let delegate = ArkKeypair::from_passphrase("delegate").unwrap().public_key();
/// let entry = Vote::Up(delegate.clone()).to_string();
/// assert_eq!(entry, format!("+{}", delegate.to_hex()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Vote {
    Up(ArkPublicKey),
    Down(ArkPublicKey),
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up(key) => write!(f, "+{}", key.to_hex()),
            Self::Down(key) => write!(f, "-{}", key.to_hex()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_tags() {
        assert_eq!(u8::from(TransactionType::Transfer), 0);
        assert_eq!(u8::from(TransactionType::SecondSignature), 1);
        assert_eq!(u8::from(TransactionType::Delegate), 2);
        assert_eq!(u8::from(TransactionType::Vote), 3);
        assert_eq!(u8::from(TransactionType::MultiSignature), 4);
        assert_eq!(TransactionType::Vote.wire_tag().to_le_bytes(), [3, 0]);
    }

    #[test]
    fn unknown_tag_rejected() {
        assert_eq!(
            TransactionType::try_from(9),
            Err(UnknownTransactionType(9))
        );
        assert!(serde_json::from_str::<TransactionType>("7").is_err());
    }

    #[test]
    fn transaction_type_serializes_as_number() {
        assert_eq!(serde_json::to_string(&TransactionType::Delegate).unwrap(), "2");
        let parsed: TransactionType = serde_json::from_str("4").unwrap();
        assert_eq!(parsed, TransactionType::MultiSignature);
    }

    #[test]
    fn field_rules_per_type() {
        use TransactionType::*;
        for tx_type in [Transfer, SecondSignature, Delegate, Vote, MultiSignature] {
            assert_eq!(tx_type.carries_amount(), tx_type == Transfer);
            assert_eq!(
                tx_type.requires_recipient(),
                matches!(tx_type, Transfer | Vote)
            );
            assert_eq!(tx_type.allows_second_signature(), tx_type != SecondSignature);
        }
    }

    #[test]
    fn only_transfer_has_no_asset() {
        assert!(!TransactionType::Transfer.expects_asset());
        assert!(TransactionType::Vote.expects_asset());
        assert!(TransactionType::MultiSignature.expects_asset());
    }

    #[test]
    fn asset_json_shapes() {
        let votes = Asset::Votes(vec!["+02aa".to_string()]);
        assert_eq!(serde_json::to_string(&votes).unwrap(), r#"{"votes":["+02aa"]}"#);

        let sig = Asset::Signature(SignatureAsset {
            public_key: "02bb".to_string(),
        });
        assert_eq!(
            serde_json::to_string(&sig).unwrap(),
            r#"{"signature":{"publicKey":"02bb"}}"#
        );

        let multi = Asset::MultiSignature(MultiSignatureAsset {
            min: 2,
            lifetime: 24,
            keysgroup: vec!["+02cc".to_string()],
        });
        assert_eq!(
            serde_json::to_string(&multi).unwrap(),
            r#"{"multisignature":{"min":2,"lifetime":24,"keysgroup":["+02cc"]}}"#
        );
    }

    #[test]
    fn asset_maps_to_its_type() {
        let delegate = Asset::Delegate(DelegateAsset {
            username: "genesis_1".to_string(),
            public_key: "02dd".to_string(),
        });
        assert_eq!(delegate.transaction_type(), TransactionType::Delegate);
        assert_eq!(
            Asset::Votes(vec![]).transaction_type(),
            TransactionType::Vote
        );
    }

    #[test]
    fn multi_signature_bytes_lead_with_min_and_lifetime() {
        let asset = Asset::MultiSignature(MultiSignatureAsset {
            min: 2,
            lifetime: 24,
            keysgroup: vec!["+ab".to_string(), "+cd".to_string()],
        });
        let mut buf = Vec::new();
        asset.write_bytes(&mut buf).unwrap();
        assert_eq!(buf, [&[2u8, 24][..], b"+ab+cd"].concat());
    }

    #[test]
    fn signature_asset_bytes_are_hex_decoded() {
        let asset = Asset::Signature(SignatureAsset {
            public_key: "02ff".to_string(),
        });
        let mut buf = Vec::new();
        asset.write_bytes(&mut buf).unwrap();
        assert_eq!(buf, vec![0x02, 0xff]);
    }

    #[test]
    fn malformed_signature_asset_hex_fails() {
        let asset = Asset::Signature(SignatureAsset {
            public_key: "xyz".to_string(),
        });
        let mut buf = Vec::new();
        assert!(matches!(
            asset.write_bytes(&mut buf),
            Err(TransactionError::MalformedHex { .. })
        ));
    }

    #[test]
    fn vote_display_prefixes() {
        let key = crate::crypto::ArkKeypair::from_passphrase("d1")
            .unwrap()
            .public_key();
        assert_eq!(Vote::Up(key.clone()).to_string(), format!("+{}", key.to_hex()));
        assert_eq!(Vote::Down(key.clone()).to_string(), format!("-{}", key.to_hex()));
    }
}
