//! # Key Management
//!
//! secp256k1 keypairs derived from passphrases, plus the public key and
//! signature wrappers the transaction layer passes around.
//!
//! ## Derivation
//!
//! ```text
//! passphrase (UTF-8)
//!     -> SHA-256 -> 32-byte secret scalar
//!     -> secp256k1 point -> 33-byte compressed public key
//! ```
//!
//! This is brain-wallet derivation and exactly as strong as the passphrase.
//! The network defines it this way, so we match it.
//!
//! ## Security considerations
//!
//! - Keypairs live only for the duration of a builder call. The secret
//!   scalar is erased on drop, and the passphrase digest it came from is
//!   zeroized as soon as the key is built.
//! - `Debug` prints the public key and nothing else.
//! - Key bytes are never logged. Keep it that way.

use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;
use zeroize::Zeroize;

use super::hash::sha256_array;
use crate::config::PUBLIC_KEY_LENGTH;

/// Errors that can occur during key operations.
///
/// Deliberately vague about *why* something failed: error messages are not
/// a good place to leak anything about key material.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("passphrase must not be empty")]
    EmptyPassphrase,

    #[error("invalid secret key: not a valid secp256k1 scalar")]
    InvalidSecretKey,

    #[error("invalid public key: not a compressed secp256k1 point")]
    InvalidPublicKey,

    #[error("invalid signature encoding: expected DER")]
    InvalidSignature,
}

// ---------------------------------------------------------------------------
// ArkKeypair
// ---------------------------------------------------------------------------

/// A secp256k1 signing keypair.
///
/// Intentionally not `Serialize`/`Deserialize` and not `Clone`. If you need
/// the key again, derive it again from the passphrase.
///
/// # Examples
///
/// ```
/// use ark_protocol::crypto::{sha256_array, ArkKeypair};
///
/// let kp = ArkKeypair::from_passphrase("this is a top secret passphrase").unwrap();
/// let digest = sha256_array(b"payload");
/// let sig = kp.sign_digest(&digest).unwrap();
/// assert!(kp.public_key().verify_digest(&digest, &sig));
/// ```
pub struct ArkKeypair {
    secret_key: SecretKey,
    public_key: ArkPublicKey,
}

impl ArkKeypair {
    /// Derives a keypair from a passphrase: `secret = SHA-256(passphrase)`.
    pub fn from_passphrase(passphrase: &str) -> Result<Self, KeyError> {
        if passphrase.is_empty() {
            return Err(KeyError::EmptyPassphrase);
        }
        let mut secret = sha256_array(passphrase.as_bytes());
        let keypair = Self::from_secret_bytes(&secret);
        secret.zeroize();
        keypair
    }

    /// Builds a keypair from a raw 32-byte secret scalar.
    ///
    /// Fails for zero and for values at or above the curve order.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, KeyError> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        let secp = Secp256k1::signing_only();
        let public_key = ArkPublicKey {
            bytes: PublicKey::from_secret_key(&secp, &secret_key).serialize(),
        };
        Ok(Self {
            secret_key,
            public_key,
        })
    }

    pub fn public_key(&self) -> ArkPublicKey {
        self.public_key.clone()
    }

    /// Hex of the compressed public key, as it appears in `senderPublicKey`.
    pub fn public_key_hex(&self) -> String {
        self.public_key.to_hex()
    }

    /// Signs a 32-byte digest. The digest is signed as-is, with no further
    /// hashing. Nonces are RFC 6979, so the same key and digest always give
    /// the same signature.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<ArkSignature, KeyError> {
        let message = Message::from_slice(digest).map_err(|_| KeyError::InvalidSignature)?;
        let secp = Secp256k1::signing_only();
        let signature = secp.sign_ecdsa(&message, &self.secret_key);
        Ok(ArkSignature {
            bytes: signature.serialize_der().to_vec(),
        })
    }
}

impl fmt::Debug for ArkKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArkKeypair(pub={})", self.public_key.to_hex())
    }
}

impl Drop for ArkKeypair {
    fn drop(&mut self) {
        self.secret_key.non_secure_erase();
    }
}

impl PartialEq for ArkKeypair {
    /// Compares public keys only.
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for ArkKeypair {}

// ---------------------------------------------------------------------------
// ArkPublicKey
// ---------------------------------------------------------------------------

/// A compressed secp256k1 public key (33 bytes).
#[derive(Clone, PartialEq, Eq)]
pub struct ArkPublicKey {
    bytes: [u8; PUBLIC_KEY_LENGTH],
}

impl ArkPublicKey {
    /// Parses a compressed key, checking that it is a point on the curve.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let key = PublicKey::from_slice(slice).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self {
            bytes: key.serialize(),
        })
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::try_from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.bytes
    }

    /// 66 hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Verifies a DER signature over a 32-byte digest.
    ///
    /// High-S signatures are normalized before verification, since older
    /// signers did not enforce low-S.
    pub fn verify_digest(&self, digest: &[u8; 32], signature: &ArkSignature) -> bool {
        let Ok(key) = PublicKey::from_slice(&self.bytes) else {
            return false;
        };
        let Ok(mut sig) = Signature::from_der(&signature.bytes) else {
            return false;
        };
        sig.normalize_s();
        let Ok(message) = Message::from_slice(digest) else {
            return false;
        };
        Secp256k1::verification_only()
            .verify_ecdsa(&message, &sig, &key)
            .is_ok()
    }
}

impl Hash for ArkPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for ArkPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ArkPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArkPublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// ArkSignature
// ---------------------------------------------------------------------------

/// A DER-encoded ECDSA signature. Between 8 and 72 bytes, usually 70–72.
#[derive(Clone, PartialEq, Eq)]
pub struct ArkSignature {
    bytes: Vec<u8>,
}

impl ArkSignature {
    /// Wraps DER bytes after checking that they parse.
    pub fn from_der(bytes: &[u8]) -> Result<Self, KeyError> {
        Signature::from_der(bytes).map_err(|_| KeyError::InvalidSignature)?;
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidSignature)?;
        Self::from_der(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Display for ArkSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ArkSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        if hex_str.len() > 16 {
            write!(
                f,
                "ArkSignature({}...{})",
                &hex_str[..8],
                &hex_str[hex_str.len() - 8..]
            )
        } else {
            write!(f, "ArkSignature({})", hex_str)
        }
    }
}
