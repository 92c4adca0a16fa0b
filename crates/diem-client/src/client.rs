//! Ledger-consistent client and transaction finality polling.

use std::time::Duration;

use diem_primitives::{AccountAddress, HashValue};
use diem_types::SignedTransaction;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::jsonrpc::JsonRpcTransport;
use crate::ledger::{LedgerState, LedgerTracker};
use crate::rpc::{RpcClient, TransactionRecord};

/// What identifies the submitted transaction when it is found on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedTransaction {
    /// The transaction hash.
    Hash(HashValue),
    /// The authenticator signature, hex.
    Signature(String),
}

impl ExpectedTransaction {
    fn expected_hex(&self) -> String {
        match self {
            ExpectedTransaction::Hash(hash) => hash.to_hex(),
            ExpectedTransaction::Signature(sig) => sig.to_ascii_lowercase(),
        }
    }

    fn observed<'a>(&self, record: &'a TransactionRecord) -> &'a str {
        match self {
            ExpectedTransaction::Hash(_) => &record.hash,
            ExpectedTransaction::Signature(_) => record.signature().unwrap_or_default(),
        }
    }

    /// Whether `record` is the expected transaction. Hex is compared
    /// case-insensitively.
    fn matches(&self, record: &TransactionRecord) -> bool {
        self.observed(record).eq_ignore_ascii_case(&self.expected_hex())
    }
}

/// A Diem client that enforces ledger consistency on every response.
#[derive(Debug)]
pub struct Client<R> {
    /// RPC collaborator.
    rpc: R,
    /// Client configuration.
    config: ClientConfig,
    /// Last accepted ledger state.
    ledger: LedgerTracker,
}

impl Client<JsonRpcTransport> {
    /// Create a client backed by the HTTP JSON-RPC transport.
    pub fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let rpc = JsonRpcTransport::new(&config)?;
        Ok(Self::new(rpc, config))
    }
}

impl<R: RpcClient> Client<R> {
    /// Create a client over any RPC collaborator.
    pub fn new(rpc: R, config: ClientConfig) -> Self {
        let ledger = LedgerTracker::new(config.chain_id);
        Self { rpc, config, ledger }
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The RPC collaborator.
    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    /// The last ledger state accepted by this client.
    pub fn last_ledger_state(&self) -> LedgerState {
        self.ledger.last()
    }

    /// Validate a response's chain id and ledger state and advance the
    /// client's ledger state.
    ///
    /// # Returns
    /// `Ok(())`, `ChainIdMismatch`, or `StaleResponse`. On error the state
    /// is unchanged.
    pub fn validate_and_update(&self, chain_id: u8, state: LedgerState) -> Result<(), ClientError> {
        self.ledger.validate_and_update(chain_id, state)
    }

    /// Fetch an account's transaction by sequence number.
    ///
    /// The response's ledger fields are validated before the payload is
    /// returned.
    ///
    /// # Returns
    /// `Some(record)` if committed, `None` if not found.
    pub async fn get_account_transaction(
        &self,
        address: AccountAddress,
        sequence_number: u64,
        include_events: bool,
    ) -> Result<Option<TransactionRecord>, ClientError> {
        let response = self
            .rpc
            .get_account_transaction(address, sequence_number, include_events)
            .await?;
        self.validate_and_update(response.chain_id, response.ledger_state())?;
        Ok(response.result)
    }

    /// Wait until a transaction is committed and executed.
    ///
    /// Polls every `poll_interval` until `timeout` elapses. Stale responses
    /// are retried immediately; every other error ends the wait.
    ///
    /// # Arguments
    /// * `address` - Sending account.
    /// * `sequence_number` - Sequence number of the transaction.
    /// * `expected` - Hash or signature the committed transaction must carry.
    /// * `expiration_time_sec` - Transaction expiration, Unix seconds.
    /// * `timeout` - Total time to wait, measured from the call.
    ///
    /// # Returns
    /// The committed record, or `TransactionMismatch`, `ExecutionFailed`,
    /// `TransactionExpired`, `WaitTimeout`, or a forwarded error.
    pub async fn wait_for_transaction(
        &self,
        address: AccountAddress,
        sequence_number: u64,
        expected: &ExpectedTransaction,
        expiration_time_sec: u64,
        timeout: Duration,
    ) -> Result<TransactionRecord, ClientError> {
        self.wait(address, sequence_number, expected, expiration_time_sec, timeout, None)
            .await
    }

    /// Like [`wait_for_transaction`](Self::wait_for_transaction), but ends
    /// with `Cancelled` as soon as `cancel` fires.
    pub async fn wait_for_transaction_with_cancel(
        &self,
        address: AccountAddress,
        sequence_number: u64,
        expected: &ExpectedTransaction,
        expiration_time_sec: u64,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<TransactionRecord, ClientError> {
        self.wait(address, sequence_number, expected, expiration_time_sec, timeout, Some(cancel))
            .await
    }

    /// Wait for a signed transaction, deriving the address, sequence
    /// number, hash, and expiration from it.
    pub async fn wait_for_signed_transaction(
        &self,
        txn: &SignedTransaction,
        timeout: Duration,
    ) -> Result<TransactionRecord, ClientError> {
        let expected = ExpectedTransaction::Hash(txn.hash());
        self.wait_for_transaction(
            txn.sender(),
            txn.sequence_number(),
            &expected,
            txn.expiration_timestamp_secs(),
            timeout,
        )
        .await
    }

    async fn wait(
        &self,
        address: AccountAddress,
        sequence_number: u64,
        expected: &ExpectedTransaction,
        expiration_time_sec: u64,
        timeout: Duration,
        cancel: Option<&CancellationToken>,
    ) -> Result<TransactionRecord, ClientError> {
        let start = Instant::now();
        let mut attempt: u64 = 0;

        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(ClientError::Cancelled);
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(ClientError::WaitTimeout { duration: timeout });
            }

            attempt += 1;
            debug!(%address, sequence_number, attempt, "polling for transaction");

            match self.get_account_transaction(address, sequence_number, true).await {
                Err(err) if err.is_stale() => {
                    warn!(%address, sequence_number, error = %err, "stale response, retrying");
                    continue;
                }
                Err(err) => return Err(err),
                Ok(Some(record)) => {
                    if !expected.matches(&record) {
                        return Err(ClientError::TransactionMismatch {
                            expected: expected.expected_hex(),
                            got: expected.observed(&record).to_string(),
                        });
                    }
                    if !record.vm_status.is_executed() {
                        return Err(ClientError::ExecutionFailed {
                            status: record.vm_status,
                        });
                    }
                    info!(
                        %address,
                        sequence_number,
                        version = record.version,
                        hash = %record.hash,
                        "transaction executed"
                    );
                    return Ok(record);
                }
                Ok(None) => {
                    let ledger_timestamp_usec = self.ledger.last().timestamp_usec;
                    if expiration_time_sec.saturating_mul(1_000_000) <= ledger_timestamp_usec {
                        return Err(ClientError::TransactionExpired {
                            expiration_time_sec,
                            ledger_timestamp_usec,
                        });
                    }
                }
            }

            let pause = self.config.poll_interval.min(timeout.saturating_sub(start.elapsed()));
            match cancel {
                Some(token) => {
                    tokio::select! {
                        _ = tokio::time::sleep(pause) => {},
                        _ = token.cancelled() => return Err(ClientError::Cancelled),
                    }
                }
                None => tokio::time::sleep(pause).await,
            }
        }
    }
}
