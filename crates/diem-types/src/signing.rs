//! Transaction signing messages, hashing, and signers.
//!
//! The signing message and the transaction hash are both domain separated:
//!
//! - signing message: `hash_prefix("RawTransaction") || raw_txn_bytes`
//! - transaction hash: `SHA3-256(hash_prefix("Transaction") ||
//!   Transaction::UserTransaction(signed_txn)_bytes)`

use diem_primitives::bcs::{CanonicalSerialize, Serializer};
use diem_primitives::ed25519::{Ed25519PrivateKey, MultiEd25519PrivateKey};
use diem_primitives::hash::{hash_prefix, prefixed_hash};
use diem_primitives::{AccountAddress, AuthenticationKey, HashValue};

use crate::authenticator::TransactionAuthenticator;
use crate::transaction::{RawTransaction, SignedTransaction};

/// Build the message a sender signs for `raw_txn`.
///
/// # Returns
/// `hash_prefix("RawTransaction") || canonical_bytes(raw_txn)`.
pub fn signing_message(raw_txn: &RawTransaction) -> Vec<u8> {
    let mut serializer = Serializer::new();
    serializer.write_fixed_bytes(hash_prefix("RawTransaction").as_bytes());
    raw_txn.serialize(&mut serializer);
    serializer.into_bytes()
}

/// Compute the on-chain hash of a signed user transaction.
///
/// The transaction is hashed inside its `Transaction::UserTransaction`
/// envelope, so the result matches the hash a full node reports.
pub fn transaction_hash(signed_txn: &SignedTransaction) -> HashValue {
    let mut serializer = Serializer::new();
    serializer.write_variant_index(0);
    signed_txn.serialize(&mut serializer);
    prefixed_hash("Transaction", serializer.as_bytes())
}

/// Anything that can authorize a transaction signing message.
pub trait TransactionSigner {
    /// Sign `message` and bundle the signature with the public key.
    fn sign_message(&self, message: &[u8]) -> TransactionAuthenticator;

    /// Authentication key of the signing account.
    fn authentication_key(&self) -> AuthenticationKey;

    /// Address of the signing account.
    fn account_address(&self) -> AccountAddress {
        self.authentication_key().account_address()
    }
}

impl TransactionSigner for Ed25519PrivateKey {
    fn sign_message(&self, message: &[u8]) -> TransactionAuthenticator {
        TransactionAuthenticator::ed25519(self.public_key(), self.sign(message))
    }

    fn authentication_key(&self) -> AuthenticationKey {
        AuthenticationKey::ed25519(&self.public_key())
    }
}

impl TransactionSigner for MultiEd25519PrivateKey {
    fn sign_message(&self, message: &[u8]) -> TransactionAuthenticator {
        TransactionAuthenticator::multi_ed25519(self.public_key(), self.sign(message))
    }

    fn authentication_key(&self) -> AuthenticationKey {
        AuthenticationKey::multi_ed25519(&self.public_key())
    }
}

/// Sign a raw transaction.
///
/// # Arguments
/// * `raw_txn` - The transaction to sign.
/// * `signer` - The key authorizing it.
///
/// # Returns
/// The raw transaction paired with the signer's authenticator.
pub fn sign_transaction<S: TransactionSigner + ?Sized>(raw_txn: RawTransaction, signer: &S) -> SignedTransaction {
    let authenticator = signer.sign_message(&signing_message(&raw_txn));
    SignedTransaction::new(raw_txn, authenticator)
}
