//! Transaction authenticators.
//!
//! An authenticator bundles the sender's public key with the signature over
//! the transaction signing message. Both halves are length-prefixed blobs
//! on the wire.

use diem_primitives::bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
use diem_primitives::ed25519::{
    Ed25519PublicKey, Ed25519Signature, MultiEd25519PublicKey, MultiEd25519Signature,
};
use diem_primitives::{AuthenticationKey, PrimitivesError, Scheme};

/// Public key and signature authorizing a transaction.
///
/// Variant indices: Ed25519=0, MultiEd25519=1.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransactionAuthenticator {
    Ed25519 {
        public_key: Ed25519PublicKey,
        signature: Ed25519Signature,
    },
    MultiEd25519 {
        public_key: MultiEd25519PublicKey,
        signature: MultiEd25519Signature,
    },
}

impl TransactionAuthenticator {
    /// Create a single-key authenticator.
    pub fn ed25519(public_key: Ed25519PublicKey, signature: Ed25519Signature) -> Self {
        TransactionAuthenticator::Ed25519 { public_key, signature }
    }

    /// Create a threshold authenticator.
    pub fn multi_ed25519(public_key: MultiEd25519PublicKey, signature: MultiEd25519Signature) -> Self {
        TransactionAuthenticator::MultiEd25519 { public_key, signature }
    }

    /// The signature scheme of this authenticator.
    pub fn scheme(&self) -> Scheme {
        match self {
            TransactionAuthenticator::Ed25519 { .. } => Scheme::Ed25519,
            TransactionAuthenticator::MultiEd25519 { .. } => Scheme::MultiEd25519,
        }
    }

    /// Raw public key bytes (not length-prefixed).
    pub fn public_key_bytes(&self) -> Vec<u8> {
        match self {
            TransactionAuthenticator::Ed25519 { public_key, .. } => public_key.to_bytes().to_vec(),
            TransactionAuthenticator::MultiEd25519 { public_key, .. } => public_key.to_bytes(),
        }
    }

    /// Raw signature bytes (not length-prefixed).
    pub fn signature_bytes(&self) -> Vec<u8> {
        match self {
            TransactionAuthenticator::Ed25519 { signature, .. } => signature.to_bytes().to_vec(),
            TransactionAuthenticator::MultiEd25519 { signature, .. } => signature.to_bytes(),
        }
    }

    /// The authentication key of the signer.
    pub fn authentication_key(&self) -> AuthenticationKey {
        AuthenticationKey::from_public_key_bytes(&self.public_key_bytes(), self.scheme())
    }

    /// Verify the signature over `message`.
    pub fn verify(&self, message: &[u8]) -> bool {
        match self {
            TransactionAuthenticator::Ed25519 { public_key, signature } => public_key.verify(message, signature),
            TransactionAuthenticator::MultiEd25519 { public_key, signature } => signature.verify(message, public_key),
        }
    }
}

impl CanonicalSerialize for TransactionAuthenticator {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            TransactionAuthenticator::Ed25519 { public_key, signature } => {
                serializer.write_variant_index(0);
                public_key.serialize(serializer);
                signature.serialize(serializer);
            }
            TransactionAuthenticator::MultiEd25519 { public_key, signature } => {
                serializer.write_variant_index(1);
                public_key.serialize(serializer);
                signature.serialize(serializer);
            }
        }
    }
}

impl CanonicalDeserialize for TransactionAuthenticator {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        match deserializer.read_variant_index()? {
            0 => Ok(TransactionAuthenticator::Ed25519 {
                public_key: Ed25519PublicKey::deserialize(deserializer)?,
                signature: Ed25519Signature::deserialize(deserializer)?,
            }),
            1 => Ok(TransactionAuthenticator::MultiEd25519 {
                public_key: MultiEd25519PublicKey::deserialize(deserializer)?,
                signature: MultiEd25519Signature::deserialize(deserializer)?,
            }),
            index => Err(PrimitivesError::UnknownVariant { type_name: "TransactionAuthenticator", index }),
        }
    }
}
