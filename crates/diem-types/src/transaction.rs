//! Raw, signed, and enveloped transactions.

use diem_primitives::bcs::{CanonicalDeserialize, CanonicalSerialize, Deserializer, Serializer};
use diem_primitives::hash::prefixed_hash;
use diem_primitives::{AccountAddress, HashValue, PrimitivesError};

use crate::authenticator::TransactionAuthenticator;
use crate::script::{Module, Script};
use crate::signing::{self, TransactionSigner};
use crate::write_set::WriteSetPayload;
use crate::TypesError;

/// What a transaction executes. WriteSet=0, Script=1, Module=2.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransactionPayload {
    WriteSet(WriteSetPayload),
    Script(Script),
    Module(Module),
}

impl CanonicalSerialize for TransactionPayload {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            TransactionPayload::WriteSet(payload) => {
                serializer.write_variant_index(0);
                payload.serialize(serializer);
            }
            TransactionPayload::Script(script) => {
                serializer.write_variant_index(1);
                script.serialize(serializer);
            }
            TransactionPayload::Module(module) => {
                serializer.write_variant_index(2);
                module.serialize(serializer);
            }
        }
    }
}

impl CanonicalDeserialize for TransactionPayload {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        match deserializer.read_variant_index()? {
            0 => Ok(TransactionPayload::WriteSet(WriteSetPayload::deserialize(deserializer)?)),
            1 => Ok(TransactionPayload::Script(Script::deserialize(deserializer)?)),
            2 => Ok(TransactionPayload::Module(Module::deserialize(deserializer)?)),
            index => Err(PrimitivesError::UnknownVariant { type_name: "TransactionPayload", index }),
        }
    }
}

// ---------------------------------------------------------------------------
// RawTransaction
// ---------------------------------------------------------------------------

/// An unsigned transaction: the unit that is hashed and signed.
///
/// # Wire format
///
/// | Field                     | Encoding          |
/// |---------------------------|-------------------|
/// | sender                    | 16 raw bytes      |
/// | sequence_number           | u64 LE            |
/// | payload                   | variant           |
/// | max_gas_amount            | u64 LE            |
/// | gas_unit_price            | u64 LE            |
/// | gas_currency_code         | string            |
/// | expiration_timestamp_secs | u64 LE            |
/// | chain_id                  | u8                |
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RawTransaction {
    /// Sending account.
    pub sender: AccountAddress,
    /// Sender's sequence number for this transaction.
    pub sequence_number: u64,
    /// What the transaction executes.
    pub payload: TransactionPayload,
    /// Maximum gas units the sender will pay for.
    pub max_gas_amount: u64,
    /// Price per gas unit, in the gas currency.
    pub gas_unit_price: u64,
    /// Currency code gas is paid in, e.g. `"XUS"`.
    pub gas_currency_code: String,
    /// Unix time in seconds after which the transaction is discarded.
    pub expiration_timestamp_secs: u64,
    /// Chain the transaction is valid on.
    pub chain_id: u8,
}

impl RawTransaction {
    /// Canonical bytes of the raw transaction.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_canonical_bytes()
    }

    /// The domain-separated message a signer signs.
    pub fn signing_message(&self) -> Vec<u8> {
        signing::signing_message(self)
    }

    /// Sign this transaction.
    ///
    /// # Arguments
    /// * `signer` - An Ed25519 or MultiEd25519 private key.
    ///
    /// # Returns
    /// The signed transaction.
    pub fn sign<S: TransactionSigner + ?Sized>(self, signer: &S) -> SignedTransaction {
        signing::sign_transaction(self, signer)
    }
}

impl CanonicalSerialize for RawTransaction {
    fn serialize(&self, serializer: &mut Serializer) {
        self.sender.serialize(serializer);
        serializer.write_u64(self.sequence_number);
        self.payload.serialize(serializer);
        serializer.write_u64(self.max_gas_amount);
        serializer.write_u64(self.gas_unit_price);
        serializer.write_str(&self.gas_currency_code);
        serializer.write_u64(self.expiration_timestamp_secs);
        serializer.write_u8(self.chain_id);
    }
}

impl CanonicalDeserialize for RawTransaction {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        Ok(RawTransaction {
            sender: AccountAddress::deserialize(deserializer)?,
            sequence_number: deserializer.read_u64()?,
            payload: TransactionPayload::deserialize(deserializer)?,
            max_gas_amount: deserializer.read_u64()?,
            gas_unit_price: deserializer.read_u64()?,
            gas_currency_code: deserializer.read_str()?,
            expiration_timestamp_secs: deserializer.read_u64()?,
            chain_id: deserializer.read_u8()?,
        })
    }
}

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// A raw transaction together with its authenticator, ready to submit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SignedTransaction {
    pub raw_txn: RawTransaction,
    pub authenticator: TransactionAuthenticator,
}

impl SignedTransaction {
    pub fn new(raw_txn: RawTransaction, authenticator: TransactionAuthenticator) -> Self {
        SignedTransaction { raw_txn, authenticator }
    }

    pub fn sender(&self) -> AccountAddress {
        self.raw_txn.sender
    }

    pub fn sequence_number(&self) -> u64 {
        self.raw_txn.sequence_number
    }

    pub fn expiration_timestamp_secs(&self) -> u64 {
        self.raw_txn.expiration_timestamp_secs
    }

    /// Parse a signed transaction from raw bytes.
    ///
    /// The slice must contain exactly one signed transaction with no
    /// trailing data.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        Ok(Self::from_canonical_bytes(bytes)?)
    }

    /// Parse a signed transaction from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, TypesError> {
        let bytes = hex::decode(hex_str).map_err(PrimitivesError::from)?;
        Self::from_bytes(&bytes)
    }

    /// Canonical bytes, as submitted to a full node.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_canonical_bytes()
    }

    /// Canonical bytes as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The on-chain transaction hash.
    pub fn hash(&self) -> HashValue {
        signing::transaction_hash(self)
    }

    /// Check the signature against the signing message.
    pub fn verify_signature(&self) -> bool {
        self.authenticator.verify(&self.raw_txn.signing_message())
    }
}

impl CanonicalSerialize for SignedTransaction {
    fn serialize(&self, serializer: &mut Serializer) {
        self.raw_txn.serialize(serializer);
        self.authenticator.serialize(serializer);
    }
}

impl CanonicalDeserialize for SignedTransaction {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        Ok(SignedTransaction {
            raw_txn: RawTransaction::deserialize(deserializer)?,
            authenticator: TransactionAuthenticator::deserialize(deserializer)?,
        })
    }
}

// ---------------------------------------------------------------------------
// BlockMetadata / Transaction
// ---------------------------------------------------------------------------

/// Block prologue transaction emitted by consensus.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockMetadata {
    pub id: HashValue,
    pub round: u64,
    pub timestamp_usecs: u64,
    pub previous_block_votes: Vec<AccountAddress>,
    pub proposer: AccountAddress,
}

impl CanonicalSerialize for BlockMetadata {
    fn serialize(&self, serializer: &mut Serializer) {
        self.id.serialize(serializer);
        serializer.write_u64(self.round);
        serializer.write_u64(self.timestamp_usecs);
        serializer.write_seq(&self.previous_block_votes);
        self.proposer.serialize(serializer);
    }
}

impl CanonicalDeserialize for BlockMetadata {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        Ok(BlockMetadata {
            id: HashValue::deserialize(deserializer)?,
            round: deserializer.read_u64()?,
            timestamp_usecs: deserializer.read_u64()?,
            previous_block_votes: deserializer.read_seq()?,
            proposer: AccountAddress::deserialize(deserializer)?,
        })
    }
}

/// The hashing envelope for every committed transaction.
///
/// Variant indices: UserTransaction=0, GenesisTransaction=1,
/// BlockMetadata=2.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transaction {
    UserTransaction(SignedTransaction),
    GenesisTransaction(WriteSetPayload),
    BlockMetadata(BlockMetadata),
}

impl Transaction {
    /// Domain-separated hash of the envelope.
    pub fn hash(&self) -> HashValue {
        prefixed_hash("Transaction", &self.to_canonical_bytes())
    }
}

impl CanonicalSerialize for Transaction {
    fn serialize(&self, serializer: &mut Serializer) {
        match self {
            Transaction::UserTransaction(txn) => {
                serializer.write_variant_index(0);
                txn.serialize(serializer);
            }
            Transaction::GenesisTransaction(payload) => {
                serializer.write_variant_index(1);
                payload.serialize(serializer);
            }
            Transaction::BlockMetadata(metadata) => {
                serializer.write_variant_index(2);
                metadata.serialize(serializer);
            }
        }
    }
}

impl CanonicalDeserialize for Transaction {
    fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Self, PrimitivesError> {
        match deserializer.read_variant_index()? {
            0 => Ok(Transaction::UserTransaction(SignedTransaction::deserialize(deserializer)?)),
            1 => Ok(Transaction::GenesisTransaction(WriteSetPayload::deserialize(deserializer)?)),
            2 => Ok(Transaction::BlockMetadata(BlockMetadata::deserialize(deserializer)?)),
            index => Err(PrimitivesError::UnknownVariant { type_name: "Transaction", index }),
        }
    }
}
