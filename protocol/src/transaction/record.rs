//! The transaction record and its canonical byte layout.
//!
//! [`Transaction::to_bytes`] is the single source of truth for what gets
//! signed and what gets hashed into the ID. Field order, widths, and padding
//! must match what nodes compute byte for byte. If any of it drifts, every
//! signature this crate produces is rejected by the network.
//!
//! # Canonical Byte Format
//!
//! ```text
//! type              2   i16 LE
//! timestamp         4   u32 LE
//! senderPublicKey  33   raw
//! recipientId      21   base58check payload, or zeros
//! vendorField      64   content + zero padding, or zeros
//! amount            8   u64 LE
//! fee               8   u64 LE
//! asset             *   per type, no length prefix
//! signature         *   DER, only if requested and present
//! signSignature     *   DER, only if requested and present
//! ```

use serde::{Deserialize, Serialize};

use super::error::TransactionError;
use super::types::{Asset, TransactionType};
use crate::config::{MAX_VENDOR_FIELD_CONTENT, RECIPIENT_LENGTH, VENDOR_FIELD_LENGTH};
use crate::crypto::{address, hash::sha256_array};

/// An ARK transaction.
///
/// Field names serialize exactly as nodes expect them (`recipientId`,
/// `senderPublicKey`, `signSignature`, ...). Absent optionals are omitted
/// from JSON, not emitted as `null`.
///
/// Values of this type come out of a
/// [`TransactionDraft`](super::TransactionDraft) already finalized. The
/// fields are public for inspection and transport. Editing one afterwards
/// invalidates the signatures, and [`verify_transaction`](super::verify_transaction)
/// will say so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "type")]
    pub tx_type: TransactionType,

    /// Amount in arktoshi. Zero for everything except transfers.
    pub amount: u64,

    pub fee: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,

    /// Free-text memo, transfers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_field: Option<String>,

    /// Seconds since the network epoch anchor.
    pub timestamp: u32,

    /// Hex of the sender's compressed public key.
    pub sender_public_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_signature: Option<String>,

    /// `hex(sha256(to_bytes(false, false)))`.
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<Asset>,
}

impl Transaction {
    /// A blank record of the given type. Everything else is zero or absent.
    pub(crate) fn empty(tx_type: TransactionType) -> Self {
        Self {
            tx_type,
            amount: 0,
            fee: 0,
            recipient_id: None,
            vendor_field: None,
            timestamp: 0,
            sender_public_key: String::new(),
            signature: None,
            sign_signature: None,
            id: String::new(),
            asset: None,
        }
    }

    /// Serializes the record into the canonical byte layout.
    ///
    /// `include_signature` appends the primary signature and
    /// `include_second_signature` appends the second one, each only if it is
    /// set. The primary signature pre-image is `(false, false)`, the second
    /// signature pre-image is `(true, false)`, and the ID is always computed
    /// over `(false, false)`.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::MalformedAddress`] if `recipient_id` does not decode.
    /// - [`TransactionError::MalformedHex`] for a bad key or signature field.
    /// - [`TransactionError::AssetMismatch`] if `asset` does not fit `tx_type`.
    pub fn to_bytes(
        &self,
        include_signature: bool,
        include_second_signature: bool,
    ) -> Result<Vec<u8>, TransactionError> {
        let mut buf = Vec::with_capacity(256);

        buf.extend_from_slice(&self.tx_type.wire_tag().to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&decode_hex("senderPublicKey", &self.sender_public_key)?);

        match self.recipient_id {
            Some(ref recipient) => buf.extend_from_slice(&address::decode(recipient)?),
            None => buf.extend_from_slice(&[0u8; RECIPIENT_LENGTH]),
        }

        write_vendor_field(&mut buf, self.vendor_field.as_deref());

        buf.extend_from_slice(&self.amount.to_le_bytes());
        buf.extend_from_slice(&self.fee.to_le_bytes());

        self.write_asset(&mut buf)?;

        if include_signature {
            if let Some(ref signature) = self.signature {
                buf.extend_from_slice(&decode_hex("signature", signature)?);
            }
        }
        if include_second_signature {
            if let Some(ref sign_signature) = self.sign_signature {
                buf.extend_from_slice(&decode_hex("signSignature", sign_signature)?);
            }
        }

        Ok(buf)
    }

    /// Computes the transaction ID from the current field values.
    ///
    /// Signatures are never part of the hashed bytes, so the result is the
    /// same before and after signing.
    pub fn compute_id(&self) -> Result<String, TransactionError> {
        Ok(hex::encode(sha256_array(&self.to_bytes(false, false)?)))
    }

    /// Checks that `asset` is present exactly when `tx_type` wants one, and
    /// that it is the right shape.
    pub fn check_asset(&self) -> Result<(), TransactionError> {
        match (&self.asset, self.tx_type.expects_asset()) {
            (None, false) => Ok(()),
            (Some(asset), true) if asset.transaction_type() == self.tx_type => Ok(()),
            (asset, _) => Err(TransactionError::AssetMismatch {
                tx_type: self.tx_type,
                asset: asset
                    .as_ref()
                    .map(|a| format!("{:?}", a.transaction_type()))
                    .unwrap_or_else(|| "none".to_string()),
            }),
        }
    }

    /// Checks the fields whose presence depends on `tx_type`: only a
    /// transfer carries an amount or a vendor field, and a recipient is
    /// present exactly on transfers and votes.
    pub fn check_fields(&self) -> Result<(), TransactionError> {
        if self.vendor_field.is_some() && self.tx_type != TransactionType::Transfer {
            return Err(TransactionError::VendorFieldNotAllowed(self.tx_type));
        }
        if self.amount != 0 && !self.tx_type.carries_amount() {
            return Err(TransactionError::AmountNotAllowed {
                tx_type: self.tx_type,
                amount: self.amount,
            });
        }
        match (self.recipient_id.is_some(), self.tx_type.requires_recipient()) {
            (false, true) => Err(TransactionError::MissingRecipient(self.tx_type)),
            (true, false) => Err(TransactionError::RecipientNotAllowed(self.tx_type)),
            _ => Ok(()),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn is_second_signed(&self) -> bool {
        self.sign_signature.is_some()
    }

    /// Renders the record as the JSON object a node accepts.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn write_asset(&self, buf: &mut Vec<u8>) -> Result<(), TransactionError> {
        self.check_asset()?;
        if let Some(ref asset) = self.asset {
            asset.write_bytes(buf)?;
        }
        Ok(())
    }
}

/// Writes the fixed 64-byte vendor field slot.
///
/// Content of up to 63 bytes is copied and zero-padded. An absent field, or
/// one of 64 bytes or more, leaves the slot all zeros.
fn write_vendor_field(buf: &mut Vec<u8>, vendor_field: Option<&str>) {
    let start = buf.len();
    if let Some(content) = vendor_field {
        if content.len() <= MAX_VENDOR_FIELD_CONTENT {
            buf.extend_from_slice(content.as_bytes());
        }
    }
    buf.resize(start + VENDOR_FIELD_LENGTH, 0);
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, TransactionError> {
    hex::decode(value).map_err(|source| TransactionError::MalformedHex { field, source })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
