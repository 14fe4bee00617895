//! # Transaction Module
//!
//! Construction, canonical serialization, signing, and verification of ARK
//! v1 transactions. Every transfer, vote, and registration is represented as
//! a [`Transaction`].
//!
//! ## Architecture
//!
//! ```text
//! types.rs        Transaction types, asset payloads, vote entries
//! record.rs       The Transaction record and its canonical byte layout
//! draft.rs        Staged construction (Empty -> ... -> Finalized)
//! signing.rs      Primary and second signatures over SHA-256 digests
//! builder.rs      Per-type TransactionBuilder
//! verification.rs Re-derivation of ID and signatures on finished records
//! error.rs        TransactionError and its coarse ErrorKind
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: a [`TransactionBuilder`] `create_*` call derives the keys,
//!    populates a [`TransactionDraft`], signs, second-signs if asked, and
//!    stamps the ID.
//! 2. **Serialize**: [`Transaction::to_json`] gives the object a node accepts.
//! 3. **Verify**: [`verify_transaction`] re-checks ID and signatures.
//!
//! ## Byte Layout
//!
//! ```text
//! type(i16 LE) timestamp(u32 LE) senderPublicKey(33)
//! recipient(21 | zeros) vendorField(64, zero-padded)
//! amount(u64 LE) fee(u64 LE) asset(..) [signature] [signSignature]
//! ```
//!
//! The ID is `hex(sha256(bytes))` without either signature.

pub mod builder;
pub mod draft;
pub mod error;
pub mod record;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::TransactionBuilder;
pub use draft::{Stage, TransactionDraft, TransactionFields};
pub use error::{ErrorKind, TransactionError};
pub use record::Transaction;
pub use signing::{
    second_sign_transaction, second_signature_preimage, sign_transaction, signature_preimage,
};
pub use types::{
    Asset, DelegateAsset, MultiSignatureAsset, SignatureAsset, TransactionType,
    UnknownTransactionType, Vote,
};
pub use verification::verify_transaction;
