//! Error types for RPC transport and client operations.

use std::time::Duration;

use crate::ledger::LedgerState;
use crate::rpc::VmStatus;

/// Errors raised by an RPC transport.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to serialize or deserialize data.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server returned a JSON-RPC error object.
    #[error("server error ({code}): {message}")]
    Server {
        /// JSON-RPC error code.
        code: i64,
        /// Server-provided error message.
        message: String,
    },

    /// A response lacked one of the out-of-band ledger fields.
    #[error("response is missing ledger field `{0}`")]
    MissingLedgerInfo(&'static str),
}

/// Errors that can occur while querying the ledger or waiting for a
/// transaction.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The node reported a different chain than the client is configured for.
    #[error("chain id mismatch: expected {expected}, got {got}")]
    ChainIdMismatch {
        /// Configured chain id.
        expected: u8,
        /// Chain id reported by the node.
        got: u8,
    },

    /// The node's ledger is behind the last state this client observed.
    #[error("stale response: last seen {last}, got {got}")]
    StaleResponse {
        /// Last accepted ledger state.
        last: LedgerState,
        /// Ledger state in the rejected response.
        got: LedgerState,
    },

    /// The transaction found on chain is not the one that was submitted.
    #[error("transaction mismatch: expected {expected}, got {got}")]
    TransactionMismatch {
        /// Expected hash or signature, lowercase hex.
        expected: String,
        /// Hash or signature reported by the node.
        got: String,
    },

    /// The transaction was committed but did not execute successfully.
    #[error("transaction execution failed: {status}")]
    ExecutionFailed {
        /// VM status reported by the node.
        status: VmStatus,
    },

    /// The ledger clock passed the transaction's expiration time before the
    /// transaction was found.
    #[error(
        "transaction expired: expiration {expiration_time_sec}s, ledger time {ledger_timestamp_usec}us"
    )]
    TransactionExpired {
        /// Transaction expiration, Unix seconds.
        expiration_time_sec: u64,
        /// Ledger timestamp at the time of the check, microseconds.
        ledger_timestamp_usec: u64,
    },

    /// No terminal outcome was observed within the wait timeout.
    #[error("timed out after {duration:?} waiting for transaction")]
    WaitTimeout {
        /// The timeout that elapsed.
        duration: Duration,
    },

    /// The wait was cancelled by its cancellation token.
    #[error("wait cancelled")]
    Cancelled,

    /// The RPC transport failed.
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),
}

impl ClientError {
    /// Whether this error is a stale-response rejection, which a caller can
    /// retry immediately.
    pub fn is_stale(&self) -> bool {
        matches!(self, ClientError::StaleResponse { .. })
    }

    /// Whether the transaction is known not to have been committed, so the
    /// same transaction may be resubmitted (expired or timed out).
    pub fn is_resubmittable(&self) -> bool {
        matches!(self, ClientError::TransactionExpired { .. } | ClientError::WaitTimeout { .. })
    }
}
