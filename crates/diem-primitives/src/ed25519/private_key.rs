//! Ed25519 private key.
//!
//! Wraps an `ed25519-dalek` signing key. The key is a 32-byte seed; it can
//! be generated from the OS random number generator or loaded from bytes or
//! hex. Storage and custody of the seed are the caller's concern.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;

use crate::ed25519::{Ed25519PublicKey, Ed25519Signature, PRIVATE_KEY_LENGTH};
use crate::PrimitivesError;

/// An Ed25519 private key for signing.
#[derive(Clone)]
pub struct Ed25519PrivateKey {
    /// The underlying dalek signing key.
    inner: SigningKey,
}

impl Ed25519PrivateKey {
    /// Generate a new random private key using the OS random number generator.
    ///
    /// # Returns
    /// A new randomly generated `Ed25519PrivateKey`.
    pub fn generate() -> Self {
        Ed25519PrivateKey {
            inner: SigningKey::generate(&mut OsRng),
        }
    }

    /// Create a private key from a 32-byte seed.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 32 bytes.
    ///
    /// # Returns
    /// `Ok(Ed25519PrivateKey)` or `InvalidPrivateKey` for a wrong length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let seed: [u8; PRIVATE_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self::from_seed(seed))
    }

    /// Create a private key from a 32-byte seed array.
    pub fn from_seed(seed: [u8; PRIVATE_KEY_LENGTH]) -> Self {
        Ed25519PrivateKey {
            inner: SigningKey::from_bytes(&seed),
        }
    }

    /// Create a private key from a hexadecimal string.
    ///
    /// # Arguments
    /// * `hex_str` - A 64-character hex string of the 32-byte seed.
    ///
    /// # Returns
    /// `Ok(Ed25519PrivateKey)` on success, or an error if the hex or length is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Return the 32-byte seed.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.inner.to_bytes()
    }

    /// Return the seed as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Derive the corresponding public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey::from_verifying_key(self.inner.verifying_key())
    }

    /// Sign a message.
    ///
    /// # Arguments
    /// * `message` - The bytes to sign (the full message, not a digest).
    ///
    /// # Returns
    /// The 64-byte Ed25519 signature.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature::from(self.inner.sign(message))
    }
}

impl fmt::Debug for Ed25519PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519PrivateKey")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}
