//! Ed25519 and MultiEd25519 key material.
//!
//! Wraps `ed25519-dalek` keys with the byte forms used on the Diem wire and
//! adds the threshold MultiEd25519 scheme: an ordered list of up to 32
//! Ed25519 keys plus a threshold byte.

pub mod private_key;
pub mod public_key;
pub mod signature;
pub mod multi;

pub use private_key::Ed25519PrivateKey;
pub use public_key::Ed25519PublicKey;
pub use signature::Ed25519Signature;
pub use multi::{MultiEd25519PrivateKey, MultiEd25519PublicKey, MultiEd25519Signature};

/// Length of an Ed25519 private key seed in bytes.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Length of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;
