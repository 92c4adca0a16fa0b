/// Diem Client SDK - Transaction schema, metadata, and transaction signing.
///
/// Provides the typed on-chain schema (transactions, payloads, scripts,
/// type tags, write sets, events, metadata, sub-addresses, authenticators)
/// with canonical encodings, plus transaction hashing and signing.

pub mod type_tag;
pub mod script;
pub mod write_set;
pub mod event;
pub mod subaddress;
pub mod metadata;
pub mod authenticator;
pub mod transaction;
pub mod signing;

mod error;
pub use error::TypesError;
pub use authenticator::TransactionAuthenticator;
pub use event::{ContractEvent, EventKey};
pub use metadata::Metadata;
pub use script::{Module, Script, TransactionArgument};
pub use signing::{sign_transaction, signing_message, transaction_hash, TransactionSigner};
pub use subaddress::SubAddress;
pub use transaction::{BlockMetadata, RawTransaction, SignedTransaction, Transaction, TransactionPayload};
pub use type_tag::{Identifier, StructTag, TypeTag};
pub use write_set::{AccessPath, ChangeSet, WriteOp, WriteSet, WriteSetPayload};
