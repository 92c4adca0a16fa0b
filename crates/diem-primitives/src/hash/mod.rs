//! Hash primitives for the Diem SDK.
//!
//! Provides SHA3-256, the 32-byte `HashValue` digest type, and the
//! domain-separated hash prefixes used for transaction signing and
//! transaction identifiers. A prefix is the SHA3-256 digest of
//! `"DIEM::" + type_name`, so two unrelated object types can never produce
//! colliding hashes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer as SerdeDeserializer, Serialize, Serializer as SerdeSerializer};
use sha3::{Digest, Sha3_256};

use crate::bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
use crate::PrimitivesError;

/// Network name used for domain separation.
pub const NETWORK_NAME: &str = "DIEM";

/// Separator placed between the network name and the type name.
pub const HASH_PREFIX_SEPARATOR: &str = "::";

/// Size of a `HashValue` in bytes.
pub const HASH_LENGTH: usize = 32;

/// Compute the SHA3-256 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte SHA3-256 digest.
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the domain-separation prefix for a type.
///
/// # Arguments
/// * `type_name` - The on-chain type name, e.g. `"RawTransaction"`.
///
/// # Returns
/// SHA3-256 of the ASCII string `"DIEM::" + type_name`.
pub fn hash_prefix(type_name: &str) -> HashValue {
    let salt = format!("{NETWORK_NAME}{HASH_PREFIX_SEPARATOR}{type_name}");
    HashValue::new(sha3_256(salt.as_bytes()))
}

/// Hash `bytes` under the domain prefix for `type_name`.
///
/// # Returns
/// SHA3-256 of `hash_prefix(type_name) || bytes`.
pub fn prefixed_hash(type_name: &str, bytes: &[u8]) -> HashValue {
    let mut hasher = Sha3_256::new();
    hasher.update(hash_prefix(type_name).as_bytes());
    hasher.update(bytes);
    HashValue::new(hasher.finalize().into())
}

/// A 32-byte SHA3-256 digest, displayed as lowercase hex.
///
/// On the canonical wire the digest is a length-prefixed byte string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct HashValue([u8; HASH_LENGTH]);

impl HashValue {
    /// Create a `HashValue` from a raw 32-byte array.
    pub fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        HashValue(bytes)
    }

    /// Create a `HashValue` from a byte slice.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 32 bytes.
    ///
    /// # Returns
    /// `Ok(HashValue)` if the slice is 32 bytes, or an error otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; HASH_LENGTH] = bytes.try_into().map_err(|_| PrimitivesError::InvalidLength {
            what: "hash",
            expected: HASH_LENGTH,
            got: bytes.len(),
        })?;
        Ok(HashValue(arr))
    }

    /// Parse a `HashValue` from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Hash arbitrary data with SHA3-256.
    pub fn sha3_256_of(data: &[u8]) -> Self {
        HashValue(sha3_256(data))
    }

    /// Return a reference to the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Return the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for HashValue {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HashValue::from_hex(s)
    }
}

impl AsRef<[u8]> for HashValue {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl CanonicalSerialize for HashValue {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_bytes(&self.0);
    }
}

impl CanonicalDeserialize for HashValue {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        let bytes = deserializer.read_bytes()?;
        HashValue::from_bytes(&bytes)
    }
}

impl Serialize for HashValue {
    fn serialize<S: SerdeSerializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HashValue {
    fn deserialize<D: SerdeDeserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        HashValue::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcs::{from_bytes, to_bytes};

    #[test]
    fn test_sha3_256_empty_string() {
        assert_eq!(
            hex::encode(sha3_256(b"")),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn test_sha3_256_abc() {
        assert_eq!(
            hex::encode(sha3_256(b"abc")),
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
        );
    }

    #[test]
    fn test_hash_prefix_is_hash_of_salt() {
        let prefix = hash_prefix("RawTransaction");
        assert_eq!(prefix.as_bytes(), &sha3_256(b"DIEM::RawTransaction"));
        assert_ne!(prefix, hash_prefix("Transaction"));
    }

    #[test]
    fn test_prefixed_hash_concatenates() {
        let mut input = hash_prefix("Transaction").as_bytes().to_vec();
        input.extend_from_slice(b"payload");
        assert_eq!(prefixed_hash("Transaction", b"payload").as_bytes(), &sha3_256(&input));
    }

    #[test]
    fn test_hash_value_hex_roundtrip() {
        let h = HashValue::sha3_256_of(b"hello");
        let parsed: HashValue = h.to_string().parse().unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn test_hash_value_wrong_length() {
        let err = HashValue::from_bytes(&[0u8; 31]).unwrap_err();
        assert_eq!(
            err,
            PrimitivesError::InvalidLength { what: "hash", expected: 32, got: 31 }
        );
    }

    #[test]
    fn test_hash_value_canonical_is_length_prefixed() {
        let h = HashValue::new([9u8; 32]);
        let bytes = to_bytes(&h);
        assert_eq!(bytes.len(), 33);
        assert_eq!(bytes[0], 32);
        assert_eq!(from_bytes::<HashValue>(&bytes).unwrap(), h);
    }

    #[test]
    fn test_hash_value_serde_json() {
        let h = HashValue::new([1u8; 32]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        let back: HashValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }
}
