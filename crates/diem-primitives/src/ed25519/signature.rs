//! Ed25519 signature bytes.

use std::fmt;

use crate::bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
use crate::ed25519::SIGNATURE_LENGTH;
use crate::PrimitivesError;

/// A 64-byte Ed25519 signature.
///
/// On the canonical wire the signature is a length-prefixed byte string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519Signature([u8; SIGNATURE_LENGTH]);

impl Ed25519Signature {
    /// Create a signature from a raw 64-byte array.
    pub fn new(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Ed25519Signature(bytes)
    }

    /// Create a signature from a byte slice.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 64 bytes.
    ///
    /// # Returns
    /// `Ok(Ed25519Signature)` or `InvalidLength`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; SIGNATURE_LENGTH] = bytes.try_into().map_err(|_| PrimitivesError::InvalidLength {
            what: "ed25519 signature",
            expected: SIGNATURE_LENGTH,
            got: bytes.len(),
        })?;
        Ok(Ed25519Signature(arr))
    }

    /// Parse a signature from a 128-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Return the raw signature bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        self.0
    }

    /// Return a reference to the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Return the signature as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub(crate) fn to_dalek(self) -> ed25519_dalek::Signature {
        ed25519_dalek::Signature::from_bytes(&self.0)
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signature({})", self.to_hex())
    }
}

impl fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<ed25519_dalek::Signature> for Ed25519Signature {
    fn from(sig: ed25519_dalek::Signature) -> Self {
        Ed25519Signature(sig.to_bytes())
    }
}

impl CanonicalSerialize for Ed25519Signature {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_bytes(&self.0);
    }
}

impl CanonicalDeserialize for Ed25519Signature {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        let bytes = deserializer.read_bytes()?;
        Ed25519Signature::from_bytes(&bytes)
    }
}
