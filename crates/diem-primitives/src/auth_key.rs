//! Authentication keys and account address derivation.
//!
//! An authentication key is `SHA3-256(public_key_bytes || scheme)`. The last
//! 16 bytes are the account address; the first 16 are the prefix a wallet
//! hands to the account-creation script.

use std::fmt;

use crate::account_address::AccountAddress;
use crate::ed25519::{Ed25519PublicKey, MultiEd25519PublicKey};
use crate::hash::sha3_256;
use crate::PrimitivesError;

/// Signature scheme identifier appended to the public key before hashing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Scheme {
    /// Single Ed25519 key.
    Ed25519 = 0,
    /// MultiEd25519 threshold key.
    MultiEd25519 = 1,
}

impl Scheme {
    /// The scheme identifier byte.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// A 32-byte authentication key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct AuthenticationKey([u8; AuthenticationKey::LENGTH]);

impl AuthenticationKey {
    /// Size of an authentication key in bytes.
    pub const LENGTH: usize = 32;

    /// Create an authentication key from raw bytes.
    pub fn new(bytes: [u8; Self::LENGTH]) -> Self {
        AuthenticationKey(bytes)
    }

    /// Derive an authentication key from public key bytes and a scheme.
    ///
    /// # Arguments
    /// * `public_key_bytes` - Canonical public key bytes (not length-prefixed).
    /// * `scheme` - The signature scheme of the key.
    ///
    /// # Returns
    /// `SHA3-256(public_key_bytes || scheme_byte)`.
    pub fn from_public_key_bytes(public_key_bytes: &[u8], scheme: Scheme) -> Self {
        let mut input = Vec::with_capacity(public_key_bytes.len() + 1);
        input.extend_from_slice(public_key_bytes);
        input.push(scheme.as_byte());
        AuthenticationKey(sha3_256(&input))
    }

    /// Authentication key of a single Ed25519 public key.
    pub fn ed25519(public_key: &Ed25519PublicKey) -> Self {
        Self::from_public_key_bytes(&public_key.to_bytes(), Scheme::Ed25519)
    }

    /// Authentication key of a MultiEd25519 public key.
    pub fn multi_ed25519(public_key: &MultiEd25519PublicKey) -> Self {
        Self::from_public_key_bytes(&public_key.to_bytes(), Scheme::MultiEd25519)
    }

    /// Parse an authentication key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        let arr: [u8; Self::LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            PrimitivesError::InvalidLength {
                what: "authentication key",
                expected: Self::LENGTH,
                got: bytes.len(),
            }
        })?;
        Ok(AuthenticationKey(arr))
    }

    /// The account address: the last 16 bytes of the key.
    pub fn account_address(&self) -> AccountAddress {
        let mut addr = [0u8; AccountAddress::LENGTH];
        addr.copy_from_slice(&self.0[Self::LENGTH - AccountAddress::LENGTH..]);
        AccountAddress::new(addr)
    }

    /// The authentication key prefix: the first 16 bytes of the key.
    pub fn prefix(&self) -> [u8; 16] {
        let mut prefix = [0u8; 16];
        prefix.copy_from_slice(&self.0[..16]);
        prefix
    }

    /// Return a reference to the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    /// Return the key as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for AuthenticationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ed25519::{Ed25519PrivateKey, MultiEd25519PrivateKey};

    #[test]
    fn test_ed25519_auth_key_appends_scheme_zero() {
        let key = Ed25519PrivateKey::from_seed([7u8; 32]).public_key();
        let mut input = key.to_bytes().to_vec();
        input.push(0);

        let auth = AuthenticationKey::ed25519(&key);
        assert_eq!(auth.as_bytes(), &sha3_256(&input));
        assert_eq!(auth.account_address().as_bytes(), &auth.as_bytes()[16..]);
        assert_eq!(&auth.prefix(), &auth.as_bytes()[..16]);
    }

    #[test]
    fn test_multi_auth_key_appends_scheme_one() {
        let private = MultiEd25519PrivateKey::new(
            vec![Ed25519PrivateKey::from_seed([1u8; 32]), Ed25519PrivateKey::from_seed([2u8; 32])],
            1,
        )
        .unwrap();
        let public = private.public_key();
        let mut input = public.to_bytes();
        input.push(1);

        assert_eq!(AuthenticationKey::multi_ed25519(&public).as_bytes(), &sha3_256(&input));
    }

    #[test]
    fn test_scheme_byte_separates_keys() {
        let bytes = [5u8; 32];
        assert_ne!(
            AuthenticationKey::from_public_key_bytes(&bytes, Scheme::Ed25519),
            AuthenticationKey::from_public_key_bytes(&bytes, Scheme::MultiEd25519)
        );
    }

    #[test]
    fn test_threshold_changes_address() {
        let keys = vec![Ed25519PrivateKey::from_seed([1u8; 32]), Ed25519PrivateKey::from_seed([2u8; 32])];
        let one = MultiEd25519PrivateKey::new(keys.clone(), 1).unwrap().public_key();
        let two = MultiEd25519PrivateKey::new(keys, 2).unwrap().public_key();
        assert_ne!(
            AuthenticationKey::multi_ed25519(&one).account_address(),
            AuthenticationKey::multi_ed25519(&two).account_address()
        );
    }

    #[test]
    fn test_hex_roundtrip() {
        let auth = AuthenticationKey::new([0x42; 32]);
        assert_eq!(AuthenticationKey::from_hex(&auth.to_hex()).unwrap(), auth);
        assert!(AuthenticationKey::from_hex("abcd").is_err());
    }
}
