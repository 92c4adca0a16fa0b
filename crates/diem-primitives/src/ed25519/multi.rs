//! MultiEd25519 threshold keys and signatures.
//!
//! A MultiEd25519 key is an ordered list of 1 to 32 Ed25519 keys plus a
//! threshold byte. The list order is significant: it fixes both the
//! canonical public-key bytes (`keys || threshold`) and the bit each key
//! occupies in a signature bitmap.
//!
//! # Signature layout
//!
//! | Field      | Size                                  |
//! |------------|---------------------------------------|
//! | signatures | 64 bytes per signer, in index order   |
//! | bitmap     | 4 bytes, bit 0 = MSB of byte 0        |

use std::fmt;

use crate::bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
use crate::ed25519::{
    Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH,
};
use crate::PrimitivesError;

/// Maximum number of keys in a MultiEd25519 key set.
pub const MAX_NUM_OF_KEYS: usize = 32;

/// Size of the signer bitmap in bytes.
pub const BITMAP_NUM_OF_BYTES: usize = 4;

/// Validate a key-set size and threshold.
fn check_key_set(key_count: usize, threshold: u8) -> Result<(), PrimitivesError> {
    if key_count == 0 {
        return Err(PrimitivesError::EmptyKeySet);
    }
    if key_count > MAX_NUM_OF_KEYS {
        return Err(PrimitivesError::TooManyKeys { max: MAX_NUM_OF_KEYS, got: key_count });
    }
    if threshold == 0 || threshold as usize > key_count {
        return Err(PrimitivesError::InvalidThreshold { threshold, key_count });
    }
    Ok(())
}

fn bitmap_set_bit(bitmap: &mut [u8; BITMAP_NUM_OF_BYTES], index: u8) {
    bitmap[index as usize / 8] |= 0x80 >> (index % 8);
}

fn bitmap_get_bit(bitmap: &[u8; BITMAP_NUM_OF_BYTES], index: u8) -> bool {
    bitmap[index as usize / 8] & (0x80 >> (index % 8)) != 0
}

fn bitmap_count_ones(bitmap: &[u8; BITMAP_NUM_OF_BYTES]) -> usize {
    bitmap.iter().map(|b| b.count_ones() as usize).sum()
}

// ---------------------------------------------------------------------------
// Public key
// ---------------------------------------------------------------------------

/// A threshold public key: ordered Ed25519 keys plus a threshold.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MultiEd25519PublicKey {
    public_keys: Vec<Ed25519PublicKey>,
    threshold: u8,
}

impl MultiEd25519PublicKey {
    /// Create a threshold public key.
    ///
    /// # Arguments
    /// * `public_keys` - 1 to 32 keys, in signing order.
    /// * `threshold` - Number of signatures required, `1..=public_keys.len()`.
    ///
    /// # Returns
    /// `Ok(MultiEd25519PublicKey)`, or `EmptyKeySet`, `TooManyKeys`, or
    /// `InvalidThreshold`.
    pub fn new(public_keys: Vec<Ed25519PublicKey>, threshold: u8) -> Result<Self, PrimitivesError> {
        check_key_set(public_keys.len(), threshold)?;
        Ok(MultiEd25519PublicKey { public_keys, threshold })
    }

    /// Parse a threshold public key from its canonical bytes
    /// (`keys || threshold`).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let Some((&threshold, keys)) = bytes.split_last() else {
            return Err(PrimitivesError::EmptyKeySet);
        };
        if keys.len() % PUBLIC_KEY_LENGTH != 0 {
            return Err(PrimitivesError::InvalidPublicKey(format!(
                "multi-ed25519 key length {} is not a multiple of {} plus one",
                bytes.len(),
                PUBLIC_KEY_LENGTH
            )));
        }
        check_key_set(keys.len() / PUBLIC_KEY_LENGTH, threshold)?;
        let public_keys = keys
            .chunks_exact(PUBLIC_KEY_LENGTH)
            .map(Ed25519PublicKey::from_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MultiEd25519PublicKey { public_keys, threshold })
    }

    /// The member keys in order.
    pub fn public_keys(&self) -> &[Ed25519PublicKey] {
        &self.public_keys
    }

    /// The signing threshold.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Canonical bytes: each member key in order followed by the threshold.
    ///
    /// These bytes feed authentication-key derivation, so any change to
    /// them changes the derived account address.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.public_keys.len() * PUBLIC_KEY_LENGTH + 1);
        for key in &self.public_keys {
            out.extend_from_slice(&key.to_bytes());
        }
        out.push(self.threshold);
        out
    }

    /// Return the canonical bytes as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl fmt::Debug for MultiEd25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MultiEd25519PublicKey({})", self.to_hex())
    }
}

impl CanonicalSerialize for MultiEd25519PublicKey {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_bytes(&self.to_bytes());
    }
}

impl CanonicalDeserialize for MultiEd25519PublicKey {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        let bytes = deserializer.read_bytes()?;
        MultiEd25519PublicKey::from_bytes(&bytes)
    }
}

// ---------------------------------------------------------------------------
// Private key
// ---------------------------------------------------------------------------

/// A threshold private key: ordered Ed25519 private keys plus a threshold.
///
/// Signing always uses the first `threshold` keys. Other keys in the set
/// never contribute a signature.
#[derive(Clone)]
pub struct MultiEd25519PrivateKey {
    private_keys: Vec<Ed25519PrivateKey>,
    threshold: u8,
}

impl MultiEd25519PrivateKey {
    /// Create a threshold private key.
    ///
    /// # Arguments
    /// * `private_keys` - 1 to 32 keys, in signing order.
    /// * `threshold` - Number of signatures to produce, `1..=private_keys.len()`.
    ///
    /// # Returns
    /// `Ok(MultiEd25519PrivateKey)`, or `EmptyKeySet`, `TooManyKeys`, or
    /// `InvalidThreshold`.
    pub fn new(private_keys: Vec<Ed25519PrivateKey>, threshold: u8) -> Result<Self, PrimitivesError> {
        check_key_set(private_keys.len(), threshold)?;
        Ok(MultiEd25519PrivateKey { private_keys, threshold })
    }

    /// Generate `count` random keys with the given threshold.
    pub fn generate(count: usize, threshold: u8) -> Result<Self, PrimitivesError> {
        check_key_set(count, threshold)?;
        let private_keys = (0..count).map(|_| Ed25519PrivateKey::generate()).collect();
        Ok(MultiEd25519PrivateKey { private_keys, threshold })
    }

    /// The member keys in order.
    pub fn private_keys(&self) -> &[Ed25519PrivateKey] {
        &self.private_keys
    }

    /// The signing threshold.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Derive the threshold public key, preserving key order.
    pub fn public_key(&self) -> MultiEd25519PublicKey {
        MultiEd25519PublicKey {
            public_keys: self.private_keys.iter().map(Ed25519PrivateKey::public_key).collect(),
            threshold: self.threshold,
        }
    }

    /// Sign a message with the keys at indices `0..threshold`.
    ///
    /// # Arguments
    /// * `message` - The bytes to sign.
    ///
    /// # Returns
    /// A signature carrying `threshold` Ed25519 signatures and a bitmap with
    /// exactly bits `0..threshold` set.
    pub fn sign(&self, message: &[u8]) -> MultiEd25519Signature {
        let mut signatures = Vec::with_capacity(self.threshold as usize);
        let mut bitmap = [0u8; BITMAP_NUM_OF_BYTES];
        for (index, key) in self.private_keys.iter().take(self.threshold as usize).enumerate() {
            signatures.push(key.sign(message));
            bitmap_set_bit(&mut bitmap, index as u8);
        }
        MultiEd25519Signature { signatures, bitmap }
    }
}

impl fmt::Debug for MultiEd25519PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiEd25519PrivateKey")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A threshold signature: Ed25519 signatures in signer-index order plus a
/// 4-byte bitmap of the contributing indices.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MultiEd25519Signature {
    signatures: Vec<Ed25519Signature>,
    bitmap: [u8; BITMAP_NUM_OF_BYTES],
}

impl MultiEd25519Signature {
    /// Assemble a threshold signature from `(signature, signer_index)` pairs.
    ///
    /// The pairs may arrive in any order; they are sorted by index.
    ///
    /// # Returns
    /// `Ok(MultiEd25519Signature)`, or `InvalidBitmap` on an empty list, a
    /// duplicate index, or an index of 32 or more.
    pub fn from_indexed(mut signatures: Vec<(Ed25519Signature, u8)>) -> Result<Self, PrimitivesError> {
        if signatures.is_empty() {
            return Err(PrimitivesError::InvalidBitmap("no signatures".to_string()));
        }
        signatures.sort_by_key(|(_, index)| *index);
        let mut bitmap = [0u8; BITMAP_NUM_OF_BYTES];
        for (_, index) in &signatures {
            if *index as usize >= MAX_NUM_OF_KEYS {
                return Err(PrimitivesError::InvalidBitmap(format!(
                    "signer index {} out of range",
                    index
                )));
            }
            if bitmap_get_bit(&bitmap, *index) {
                return Err(PrimitivesError::InvalidBitmap(format!(
                    "duplicate signer index {}",
                    index
                )));
            }
            bitmap_set_bit(&mut bitmap, *index);
        }
        Ok(MultiEd25519Signature {
            signatures: signatures.into_iter().map(|(sig, _)| sig).collect(),
            bitmap,
        })
    }

    /// Parse a threshold signature from `signatures || bitmap`.
    ///
    /// The number of set bitmap bits must equal the number of signatures.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() < BITMAP_NUM_OF_BYTES + SIGNATURE_LENGTH
            || (bytes.len() - BITMAP_NUM_OF_BYTES) % SIGNATURE_LENGTH != 0
        {
            return Err(PrimitivesError::InvalidSignature(format!(
                "invalid multi-ed25519 signature length {}",
                bytes.len()
            )));
        }
        let (sig_bytes, bitmap_bytes) = bytes.split_at(bytes.len() - BITMAP_NUM_OF_BYTES);
        let mut bitmap = [0u8; BITMAP_NUM_OF_BYTES];
        bitmap.copy_from_slice(bitmap_bytes);

        let count = sig_bytes.len() / SIGNATURE_LENGTH;
        if count > MAX_NUM_OF_KEYS {
            return Err(PrimitivesError::TooManyKeys { max: MAX_NUM_OF_KEYS, got: count });
        }
        if bitmap_count_ones(&bitmap) != count {
            return Err(PrimitivesError::InvalidBitmap(format!(
                "bitmap has {} bits set for {} signatures",
                bitmap_count_ones(&bitmap),
                count
            )));
        }
        let signatures = sig_bytes
            .chunks_exact(SIGNATURE_LENGTH)
            .map(Ed25519Signature::from_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MultiEd25519Signature { signatures, bitmap })
    }

    /// The Ed25519 signatures in signer-index order.
    pub fn signatures(&self) -> &[Ed25519Signature] {
        &self.signatures
    }

    /// The 4-byte signer bitmap.
    pub fn bitmap(&self) -> [u8; BITMAP_NUM_OF_BYTES] {
        self.bitmap
    }

    /// Reconstruct the signer indices from the bitmap, in ascending order.
    pub fn signer_indices(&self) -> Vec<u8> {
        (0..MAX_NUM_OF_KEYS as u8)
            .filter(|i| bitmap_get_bit(&self.bitmap, *i))
            .collect()
    }

    /// Canonical bytes: signatures in order followed by the bitmap.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.signatures.len() * SIGNATURE_LENGTH + BITMAP_NUM_OF_BYTES);
        for sig in &self.signatures {
            out.extend_from_slice(sig.as_bytes());
        }
        out.extend_from_slice(&self.bitmap);
        out
    }

    /// Return the canonical bytes as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify the signature against a threshold public key.
    ///
    /// Signer identity comes from the bitmap: the `k`-th set bit names the
    /// key that produced the `k`-th signature.
    ///
    /// # Returns
    /// `true` if at least `threshold` signatures are present and each one
    /// verifies under the key its bitmap bit names.
    pub fn verify(&self, message: &[u8], public_key: &MultiEd25519PublicKey) -> bool {
        let indices = self.signer_indices();
        if indices.len() < public_key.threshold() as usize {
            return false;
        }
        indices.iter().zip(&self.signatures).all(|(index, sig)| {
            public_key
                .public_keys()
                .get(*index as usize)
                .is_some_and(|key| key.verify(message, sig))
        })
    }
}

impl fmt::Debug for MultiEd25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MultiEd25519Signature({})", self.to_hex())
    }
}

impl CanonicalSerialize for MultiEd25519Signature {
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_bytes(&self.to_bytes());
    }
}

impl CanonicalDeserialize for MultiEd25519Signature {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        let bytes = deserializer.read_bytes()?;
        MultiEd25519Signature::from_bytes(&bytes)
    }
}
