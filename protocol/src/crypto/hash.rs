//! # Hashing Utilities
//!
//! The two digests the ARK wire format depends on:
//!
//! - **SHA-256** for signing digests, transaction IDs, and passphrase-to-key
//!   derivation.
//! - **RIPEMD-160** for the 20-byte public key hash inside addresses.
//!
//! Both are thin wrappers around the RustCrypto implementations. Nothing here
//! is clever, and it should stay that way.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use ark_protocol::crypto::sha256;
///
/// let hash = sha256(b"ARK");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    sha256_array(data).to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
///
/// This is what the signer wants: secp256k1 messages are exactly 32 bytes,
/// and the array type makes that impossible to get wrong.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute the RIPEMD-160 hash of the input data.
///
/// Addresses hash the compressed public key directly with RIPEMD-160. There
/// is no SHA-256 pass first, unlike Bitcoin's HASH160.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 20];
    output.copy_from_slice(&result);
    output
}
