//! Sub-addresses for end users of shared custodial accounts.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;

use diem_primitives::bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
use diem_primitives::PrimitivesError;

/// An 8-byte sub-address.
///
/// Inside metadata it is carried as a length-prefixed byte string that must
/// decode to exactly 8 bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubAddress([u8; SubAddress::LENGTH]);

impl SubAddress {
    /// Size of a sub-address in bytes.
    pub const LENGTH: usize = 8;

    pub const fn new(bytes: [u8; Self::LENGTH]) -> Self {
        SubAddress(bytes)
    }

    /// Generate a random sub-address from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; Self::LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        SubAddress(bytes)
    }

    /// Create a sub-address from an 8-byte slice.
    ///
    /// # Returns
    /// `Ok(SubAddress)` or `InvalidLength` for any other length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; Self::LENGTH] = bytes.try_into().map_err(|_| PrimitivesError::InvalidLength {
            what: "sub-address",
            expected: Self::LENGTH,
            got: bytes.len(),
        })?;
        Ok(SubAddress(arr))
    }

    /// Parse a sub-address from 16 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for SubAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for SubAddress {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubAddress::from_hex(s)
    }
}

impl CanonicalSerialize for SubAddress {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_bytes(&self.0);
    }
}

impl CanonicalDeserialize for SubAddress {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        SubAddress::from_bytes(&deserializer.read_bytes()?)
    }
}
