//! Ed25519 public key.

use std::fmt;
use std::hash::{Hash, Hasher};

use ed25519_dalek::VerifyingKey;

use crate::bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
use crate::ed25519::{Ed25519Signature, PUBLIC_KEY_LENGTH};
use crate::PrimitivesError;

/// An Ed25519 public key for signature verification.
///
/// Wraps an `ed25519-dalek` `VerifyingKey`. The canonical encoding is a
/// length-prefixed 32-byte string.
#[derive(Clone, Copy)]
pub struct Ed25519PublicKey {
    /// The underlying dalek verifying key.
    inner: VerifyingKey,
}

impl Ed25519PublicKey {
    /// Create a public key from its 32-byte compressed point encoding.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 32 bytes and decode to a
    ///   curve point.
    ///
    /// # Returns
    /// `Ok(Ed25519PublicKey)`, `InvalidLength`, or `InvalidPublicKey`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| PrimitivesError::InvalidLength {
            what: "ed25519 public key",
            expected: PUBLIC_KEY_LENGTH,
            got: bytes.len(),
        })?;
        let inner = VerifyingKey::from_bytes(&arr)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(Ed25519PublicKey { inner })
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    pub(crate) fn from_verifying_key(inner: VerifyingKey) -> Self {
        Ed25519PublicKey { inner }
    }

    /// Return the 32-byte encoding of the key.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.inner.to_bytes()
    }

    /// Return the key as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify a signature over `message` with strict Ed25519 rules.
    ///
    /// # Arguments
    /// * `message` - The signed bytes.
    /// * `signature` - The signature to check.
    ///
    /// # Returns
    /// `true` if the signature is valid for this key.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> bool {
        self.inner
            .verify_strict(message, &signature.to_dalek())
            .is_ok()
    }
}

impl PartialEq for Ed25519PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner.as_bytes() == other.inner.as_bytes()
    }
}

impl Eq for Ed25519PublicKey {}

impl Hash for Ed25519PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.as_bytes().hash(state);
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl CanonicalSerialize for Ed25519PublicKey {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_bytes(self.inner.as_bytes());
    }
}

impl CanonicalDeserialize for Ed25519PublicKey {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        let bytes = deserializer.read_bytes()?;
        Ed25519PublicKey::from_bytes(&bytes)
    }
}
