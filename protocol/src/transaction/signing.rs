//! Transaction signing with secp256k1 keypairs.
//!
//! The order is fixed:
//!
//! 1. `signature` is ECDSA over `sha256(to_bytes(false, false))`.
//! 2. `signSignature` is ECDSA over `sha256(to_bytes(true, false))`, which
//!    includes the primary signature. This binds the second signature to
//!    the first.
//!
//! Both steps go through the draft's stage checks, so signing twice or
//! second-signing first is an error rather than a silent overwrite.

use super::draft::{Stage, TransactionDraft};
use super::error::TransactionError;
use super::record::Transaction;
use crate::crypto::hash::sha256_array;
use crate::crypto::keys::ArkKeypair;

/// The bytes the primary signature covers.
pub fn signature_preimage(tx: &Transaction) -> Result<Vec<u8>, TransactionError> {
    tx.to_bytes(false, false)
}

/// The bytes the second signature covers: everything, plus the primary
/// signature.
pub fn second_signature_preimage(tx: &Transaction) -> Result<Vec<u8>, TransactionError> {
    tx.to_bytes(true, false)
}

/// Signs a populated draft with the sender's keypair. `Populated -> Signed`.
///
/// # Errors
///
/// [`TransactionError::InvalidTransition`] if the draft is not in the
/// `Populated` stage, which includes a draft that is already signed.
///
/// # Example
///
/// ```
/// use ark_protocol::crypto::ArkKeypair;
/// use ark_protocol::transaction::{
///     sign_transaction, Asset, DelegateAsset, Stage, TransactionDraft, TransactionFields,
///     TransactionType,
/// };
///
/// let keys = ArkKeypair::from_passphrase("s1").unwrap();
/// let mut draft = TransactionDraft::new(TransactionType::Delegate);
/// draft
///     .populate(
///         TransactionFields {
///             fee: 2_500_000_000,
///             sender_public_key: keys.public_key_hex(),
///             ..TransactionFields::default()
///         },
///         Some(Asset::Delegate(DelegateAsset {
///             username: "genesis_1".into(),
///             public_key: keys.public_key_hex(),
///         })),
///     )
///     .unwrap();
///
/// sign_transaction(&mut draft, &keys).unwrap();
/// assert_eq!(draft.stage(), Stage::Signed);
/// ```
pub fn sign_transaction(
    draft: &mut TransactionDraft,
    keypair: &ArkKeypair,
) -> Result<(), TransactionError> {
    draft.check_transition(Stage::Signed)?;
    let digest = sha256_array(&signature_preimage(draft.transaction())?);
    let signature = keypair.sign_digest(&digest)?;
    draft.attach_signature(signature.to_hex())
}

/// Adds the second signature. `Signed -> DoubleSigned`.
///
/// # Errors
///
/// [`TransactionError::MissingPrimarySignature`] if the draft has not been
/// signed yet. [`TransactionError::InvalidTransition`] if it is already past
/// the `Signed` stage, or if it is a second-signature registration, which
/// only the first key signs.
pub fn second_sign_transaction(
    draft: &mut TransactionDraft,
    second_keypair: &ArkKeypair,
) -> Result<(), TransactionError> {
    draft.check_transition(Stage::DoubleSigned)?;
    let digest = sha256_array(&second_signature_preimage(draft.transaction())?);
    let signature = second_keypair.sign_digest(&digest)?;
    draft.attach_second_signature(signature.to_hex())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
