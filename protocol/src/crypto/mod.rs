//! # Cryptographic Primitives
//!
//! Everything the transaction engine consumes but does not invent:
//!
//! - **secp256k1 ECDSA** for signatures, with passphrase-derived keys.
//! - **SHA-256** for signing digests and transaction IDs.
//! - **RIPEMD-160 + Base58Check** for addresses.
//!
//! Every function here is a type-safe wrapper around an audited crate. If
//! you are tempted to optimize one of them, don't.

pub mod address;
pub mod hash;
pub mod keys;

pub use address::AddressError;
pub use hash::{ripemd160, sha256, sha256_array};
pub use keys::{ArkKeypair, ArkPublicKey, ArkSignature, KeyError};
