//! Transaction verification: structural checks and cryptographic validation.
//!
//! [`verify_transaction`] re-derives everything a finished record claims
//! about itself. The checks are ordered from cheapest to most expensive so
//! that an obviously broken record fails before any curve arithmetic runs.

use tracing::debug;

use super::error::TransactionError;
use super::record::Transaction;
use super::signing::{second_signature_preimage, signature_preimage};
use crate::crypto::hash::sha256_array;
use crate::crypto::keys::{ArkPublicKey, ArkSignature};

/// Verifies a finalized transaction.
///
/// The checks, in order:
///
/// 1. **Shape**: amount, recipient, vendor field and asset are the ones the
///    type allows.
/// 2. **Transaction ID**: equals `hex(sha256(to_bytes(false, false)))`.
/// 3. **Signature**: present, and valid for `senderPublicKey` over the
///    unsigned preimage.
/// 4. **Second signature**: when `second_public_key` is given, `signSignature`
///    must be present and valid for it over the preimage that includes the
///    primary signature.
///
/// Without `second_public_key` an attached `signSignature` is not checked:
/// the registered second key lives in account state, not in the record.
///
/// # Errors
///
/// Returns the first failing check as a [`TransactionError`].
pub fn verify_transaction(
    tx: &Transaction,
    second_public_key: Option<&ArkPublicKey>,
) -> Result<(), TransactionError> {
    // 1. Type-bound fields and asset pairing.
    tx.check_fields()?;
    tx.check_asset()?;

    // 2. Transaction ID integrity.
    let expected_id = tx.compute_id()?;
    if tx.id != expected_id {
        return Err(TransactionError::IdMismatch {
            expected: expected_id,
            actual: tx.id.clone(),
        });
    }

    // 3. Primary signature against the sender key.
    let sender_key = decode_public_key(&tx.sender_public_key)?;
    let signature_hex = tx
        .signature
        .as_deref()
        .ok_or(TransactionError::MissingSignature("signature"))?;
    let signature = decode_signature("signature", signature_hex, &sender_key)?;
    let digest = sha256_array(&signature_preimage(tx)?);
    if !sender_key.verify_digest(&digest, &signature) {
        return Err(TransactionError::InvalidSignature {
            field: "signature",
            public_key: sender_key.to_hex(),
        });
    }

    // 4. Second signature, when the caller knows the registered key.
    match second_public_key {
        Some(second_key) => {
            let sign_signature_hex = tx
                .sign_signature
                .as_deref()
                .ok_or(TransactionError::MissingSignature("signSignature"))?;
            let sign_signature = decode_signature("signSignature", sign_signature_hex, second_key)?;
            let digest = sha256_array(&second_signature_preimage(tx)?);
            if !second_key.verify_digest(&digest, &sign_signature) {
                return Err(TransactionError::InvalidSignature {
                    field: "signSignature",
                    public_key: second_key.to_hex(),
                });
            }
        }
        None if tx.is_second_signed() => {
            debug!(id = %tx.id, "signSignature present but no second key supplied, skipping");
        }
        None => {}
    }

    Ok(())
}

fn decode_public_key(hex_str: &str) -> Result<ArkPublicKey, TransactionError> {
    let bytes = hex::decode(hex_str).map_err(|source| TransactionError::MalformedHex {
        field: "senderPublicKey",
        source,
    })?;
    ArkPublicKey::try_from_slice(&bytes).map_err(|_| TransactionError::InvalidSignature {
        field: "senderPublicKey",
        public_key: hex_str.to_string(),
    })
}

fn decode_signature(
    field: &'static str,
    hex_str: &str,
    signer: &ArkPublicKey,
) -> Result<ArkSignature, TransactionError> {
    let bytes = hex::decode(hex_str).map_err(|source| TransactionError::MalformedHex { field, source })?;
    ArkSignature::from_der(&bytes).map_err(|_| TransactionError::InvalidSignature {
        field,
        public_key: signer.to_hex(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkParams;
    use crate::crypto::ArkKeypair;
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::error::ErrorKind;
    use crate::transaction::types::Asset;

    const RECIPIENT: &str = "D61mfSggzbvQgTUe6JhYKH2doHaqJ3Dyib";

    fn builder() -> TransactionBuilder {
        TransactionBuilder::new(NetworkParams::devnet()).at_timestamp(12_345)
    }

    fn second_key() -> ArkPublicKey {
        ArkKeypair::from_passphrase("s2").unwrap().public_key()
    }

    #[test]
    fn valid_transaction_passes() {
        let tx = builder()
            .create_transfer(RECIPIENT, 100, Some("memo"), "s1", None)
            .unwrap();
        assert!(verify_transaction(&tx, None).is_ok());
    }

    #[test]
    fn valid_second_signed_transaction_passes() {
        let tx = builder()
            .create_transfer(RECIPIENT, 100, None, "s1", Some("s2"))
            .unwrap();
        assert!(verify_transaction(&tx, Some(&second_key())).is_ok());
        assert!(verify_transaction(&tx, None).is_ok());
    }

    #[test]
    fn rejects_tampered_id() {
        let mut tx = builder().create_delegate("d", "s1", None).unwrap();
        tx.id = "00".repeat(32);
        match verify_transaction(&tx, None) {
            Err(TransactionError::IdMismatch { .. }) => {}
            other => panic!("expected IdMismatch, got {:?}", other),
        }
    }

    #[test]
    fn rejects_tampered_amount() {
        let mut tx = builder()
            .create_transfer(RECIPIENT, 100, None, "s1", None)
            .unwrap();
        tx.amount = 1_000_000;
        tx.id = tx.compute_id().unwrap();
        match verify_transaction(&tx, None) {
            Err(TransactionError::InvalidSignature {
                field: "signature", ..
            }) => {}
            other => panic!("expected InvalidSignature, got {:?}", other),
        }
    }

    #[test]
    fn rejects_amount_on_registration() {
        let mut tx = builder().create_delegate("d", "s1", None).unwrap();
        tx.amount = 5;
        tx.id = tx.compute_id().unwrap();
        assert!(matches!(
            verify_transaction(&tx, None),
            Err(TransactionError::AmountNotAllowed { amount: 5, .. })
        ));
    }

    #[test]
    fn rejects_missing_signature() {
        let mut tx = builder().create_delegate("d", "s1", None).unwrap();
        tx.signature = None;
        match verify_transaction(&tx, None) {
            Err(TransactionError::MissingSignature("signature")) => {}
            other => panic!("expected MissingSignature, got {:?}", other),
        }
    }

    #[test]
    fn rejects_missing_second_signature() {
        let tx = builder().create_delegate("d", "s1", None).unwrap();
        match verify_transaction(&tx, Some(&second_key())) {
            Err(TransactionError::MissingSignature("signSignature")) => {}
            other => panic!("expected MissingSignature, got {:?}", other),
        }
    }

    #[test]
    fn rejects_wrong_second_key() {
        let tx = builder().create_delegate("d", "s1", Some("s2")).unwrap();
        let wrong = ArkKeypair::from_passphrase("s3").unwrap().public_key();
        let err = verify_transaction(&tx, Some(&wrong)).unwrap_err();
        assert!(matches!(
            err,
            TransactionError::InvalidSignature {
                field: "signSignature",
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }

    #[test]
    fn rejects_swapped_sender_key() {
        let mut tx = builder().create_delegate("d", "s1", None).unwrap();
        tx.sender_public_key = ArkKeypair::from_passphrase("s3").unwrap().public_key_hex();
        if let Some(Asset::Delegate(ref mut asset)) = tx.asset {
            asset.public_key = tx.sender_public_key.clone();
        }
        tx.id = tx.compute_id().unwrap();
        assert!(matches!(
            verify_transaction(&tx, None),
            Err(TransactionError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn rejects_malformed_signature_hex() {
        let mut tx = builder().create_delegate("d", "s1", None).unwrap();
        tx.signature = Some("zz".to_string());
        assert!(matches!(
            verify_transaction(&tx, None),
            Err(TransactionError::MalformedHex {
                field: "signature",
                ..
            })
        ));
    }

    #[test]
    fn rejects_malformed_sender_key() {
        let mut tx = builder().create_vote(vec![], "s1", None).unwrap();
        tx.sender_public_key = "not hex".to_string();
        assert!(matches!(
            verify_transaction(&tx, None),
            Err(TransactionError::MalformedHex { .. })
        ));
    }
}
