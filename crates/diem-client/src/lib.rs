#![deny(missing_docs)]

//! # diem-client
//!
//! Ledger-consistency tracking and transaction finality polling for the
//! Diem JSON-RPC API.
//!
//! Every response from a full node carries the node's chain id, ledger
//! version and ledger timestamp. The [`Client`] checks these against the
//! configured chain and the last ledger state it has seen, so a lagging or
//! misconfigured node can never move its view of the ledger backwards.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use diem_client::{Client, ClientConfig};
//! # async fn run(txn: diem_types::SignedTransaction) -> Result<(), diem_client::ClientError> {
//! let client = Client::connect(ClientConfig::testnet())?;
//! let record = client
//!     .wait_for_signed_transaction(&txn, Duration::from_secs(30))
//!     .await?;
//! println!("committed at version {}", record.version);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod jsonrpc;
pub mod ledger;
pub mod rpc;

#[cfg(test)]
mod tests;

pub use client::{Client, ExpectedTransaction};
pub use config::ClientConfig;
pub use error::{ClientError, RpcError};
pub use jsonrpc::JsonRpcTransport;
pub use ledger::{LedgerState, LedgerTracker};
pub use rpc::{EventRecord, RpcClient, RpcResponse, TransactionData, TransactionRecord, VmStatus};
