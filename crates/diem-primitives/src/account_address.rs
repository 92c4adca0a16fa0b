//! On-chain account address.
//!
//! An `AccountAddress` is a fixed 16-byte identifier, the last 16 bytes of
//! an account's authentication key. Its canonical encoding is the 16 raw
//! bytes with no length prefix; its text form is 32 lowercase hex
//! characters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer as SerdeDeserializer, Serialize, Serializer as SerdeSerializer};

use crate::bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
use crate::PrimitivesError;

/// A 16-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct AccountAddress([u8; AccountAddress::LENGTH]);

impl AccountAddress {
    /// Size of an address in bytes.
    pub const LENGTH: usize = 16;

    /// The all-zero address.
    pub const ZERO: AccountAddress = AccountAddress([0u8; Self::LENGTH]);

    /// The core code address `0x1`, home of the standard library modules
    /// and currency types.
    pub const ONE: AccountAddress =
        AccountAddress([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);

    /// Create an address from a raw 16-byte array.
    pub const fn new(bytes: [u8; Self::LENGTH]) -> Self {
        AccountAddress(bytes)
    }

    /// Create an address from a byte slice.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 16 bytes.
    ///
    /// # Returns
    /// `Ok(AccountAddress)` or `InvalidLength` for any other length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; Self::LENGTH] = bytes.try_into().map_err(|_| PrimitivesError::InvalidLength {
            what: "account address",
            expected: Self::LENGTH,
            got: bytes.len(),
        })?;
        Ok(AccountAddress(arr))
    }

    /// Parse an address from its hex form.
    ///
    /// Accepts exactly 32 hex characters, optionally prefixed with `0x`.
    ///
    /// # Arguments
    /// * `hex_str` - The hex-encoded address.
    ///
    /// # Returns
    /// `Ok(AccountAddress)`, or `InvalidHex` / `InvalidLength` on bad input.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let trimmed = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(trimmed)?;
        Self::from_bytes(&bytes)
    }

    /// Return a reference to the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    /// Return the address as 32 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for AccountAddress {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountAddress::from_hex(s)
    }
}

impl From<[u8; AccountAddress::LENGTH]> for AccountAddress {
    fn from(bytes: [u8; AccountAddress::LENGTH]) -> Self {
        AccountAddress(bytes)
    }
}

impl AsRef<[u8]> for AccountAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl CanonicalSerialize for AccountAddress {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_fixed_bytes(&self.0);
    }
}

impl CanonicalDeserialize for AccountAddress {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        Ok(AccountAddress(deserializer.read_array()?))
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: SerdeSerializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: SerdeDeserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        AccountAddress::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bcs::{from_bytes, to_bytes};

    #[test]
    fn test_from_hex() {
        let addr = AccountAddress::from_hex("f72589b71ff4f8d139674a3f7369c69b").unwrap();
        assert_eq!(addr.to_hex(), "f72589b71ff4f8d139674a3f7369c69b");
        assert_eq!(addr.as_bytes()[0], 0xf7);

        let prefixed = AccountAddress::from_hex("0xf72589b71ff4f8d139674a3f7369c69b").unwrap();
        assert_eq!(addr, prefixed);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(matches!(
            AccountAddress::from_hex("zz2589b71ff4f8d139674a3f7369c69b"),
            Err(PrimitivesError::InvalidHex(_))
        ));
        assert_eq!(
            AccountAddress::from_hex("f72589b71ff4f8d139674a3f7369c6"),
            Err(PrimitivesError::InvalidLength { what: "account address", expected: 16, got: 15 })
        );
        assert_eq!(
            AccountAddress::from_bytes(&[0u8; 17]),
            Err(PrimitivesError::InvalidLength { what: "account address", expected: 16, got: 17 })
        );
    }

    #[test]
    fn test_core_code_address() {
        assert_eq!(AccountAddress::ONE.to_hex(), "00000000000000000000000000000001");
        assert_eq!(AccountAddress::ZERO.to_hex(), "0".repeat(32));
    }

    #[test]
    fn test_canonical_is_raw_16_bytes() {
        let addr = AccountAddress::new([0xab; 16]);
        let bytes = to_bytes(&addr);
        assert_eq!(bytes, vec![0xab; 16]);
        assert_eq!(from_bytes::<AccountAddress>(&bytes).unwrap(), addr);
        assert_eq!(
            from_bytes::<AccountAddress>(&bytes[..15]),
            Err(PrimitivesError::UnexpectedEndOfInput)
        );
    }

    #[test]
    fn test_serde_json_hex() {
        let addr = AccountAddress::ONE;
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"00000000000000000000000000000001\"");
        let back: AccountAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
