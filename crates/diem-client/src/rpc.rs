//! RPC collaborator trait and response types.

use std::fmt;
use std::future::Future;

use diem_primitives::AccountAddress;
use serde::{Deserialize, Serialize};

use crate::error::RpcError;
use crate::ledger::LedgerState;

/// A JSON-RPC result together with the node's out-of-band ledger fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse<T> {
    /// The `result` payload.
    pub result: T,
    /// Chain id reported by the node.
    pub chain_id: u8,
    /// Ledger version at the time of the response.
    pub ledger_version: u64,
    /// Ledger timestamp at the time of the response, microseconds.
    pub ledger_timestamp_usec: u64,
}

impl<T> RpcResponse<T> {
    /// The ledger state carried by this response.
    pub fn ledger_state(&self) -> LedgerState {
        LedgerState::new(self.ledger_version, self.ledger_timestamp_usec)
    }
}

/// Source of ledger data for a [`Client`](crate::Client).
pub trait RpcClient: Send + Sync {
    /// Fetch the transaction an account sent with a given sequence number.
    ///
    /// # Arguments
    /// * `address` - The sending account.
    /// * `sequence_number` - The account sequence number of the transaction.
    /// * `include_events` - Whether to include the emitted events.
    ///
    /// # Returns
    /// `Some(record)` if the transaction is committed, `None` if not (yet)
    /// found, together with the ledger fields.
    fn get_account_transaction(
        &self,
        address: AccountAddress,
        sequence_number: u64,
        include_events: bool,
    ) -> impl Future<Output = Result<RpcResponse<Option<TransactionRecord>>, RpcError>> + Send;
}

/// Execution status of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmStatus {
    /// Status kind, e.g. `executed`, `out_of_gas`, `move_abort`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Module location of an abort or execution failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Move abort code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_code: Option<u64>,
    /// Function index of an execution failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_index: Option<u16>,
    /// Code offset of an execution failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_offset: Option<u16>,
}

impl VmStatus {
    /// Status kind of a successfully executed transaction.
    pub const EXECUTED: &'static str = "executed";

    /// A status with only a kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            location: None,
            abort_code: None,
            function_index: None,
            code_offset: None,
        }
    }

    /// Whether the transaction executed successfully.
    pub fn is_executed(&self) -> bool {
        self.kind == Self::EXECUTED
    }
}

impl fmt::Display for VmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        if let Some(code) = self.abort_code {
            write!(f, " (abort code {code})")?;
        }
        Ok(())
    }
}

/// The transaction body of a committed transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    /// Transaction kind: `user`, `blockmetadata`, `writeset`, or `unknown`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Sending account, hex (user transactions only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Sender sequence number (user transactions only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    /// Authenticator signature, hex (user transactions only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Authenticator public key, hex (user transactions only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    /// Expiration time, Unix seconds (user transactions only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp_secs: Option<u64>,
}

/// An event emitted by a committed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event stream key, hex.
    pub key: String,
    /// Position of the event within its stream.
    pub sequence_number: u64,
    /// Version of the emitting transaction.
    pub transaction_version: u64,
    /// Event payload as reported by the node.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A committed transaction as reported by a full node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Ledger version the transaction was committed at.
    pub version: u64,
    /// Transaction hash, hex.
    pub hash: String,
    /// Gas consumed.
    pub gas_used: u64,
    /// Execution status.
    pub vm_status: VmStatus,
    /// Transaction body.
    #[serde(default)]
    pub transaction: TransactionData,
    /// Emitted events, if requested.
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

impl TransactionRecord {
    /// The authenticator signature of a user transaction, hex.
    pub fn signature(&self) -> Option<&str> {
        self.transaction.signature.as_deref()
    }
}
