/// Diem Client SDK - Canonical codec, hashing, keys, and account addresses.
///
/// This crate provides the foundational building blocks for the Diem SDK:
/// - Canonical binary serialization (`Serializer` / `Deserializer`, ULEB128)
/// - SHA3-256 hashing, `HashValue`, and domain-separated hash prefixes
/// - Ed25519 keys and signatures
/// - MultiEd25519 threshold keys and signatures
/// - Authentication key and account address derivation

pub mod bcs;
pub mod hash;
pub mod ed25519;
pub mod auth_key;
pub mod account_address;

mod error;
pub use error::PrimitivesError;
pub use account_address::AccountAddress;
pub use auth_key::{AuthenticationKey, Scheme};
pub use bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
pub use hash::HashValue;
