//! Ledger-consistency tracking.
//!
//! A [`LedgerTracker`] holds the last ledger state a client accepted and
//! rejects any response that would move it backwards. Version and
//! timestamp are checked independently: a response is stale if either one
//! is lower than what was last seen.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::ClientError;

/// A node's view of the ledger at the time it answered a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LedgerState {
    /// Ledger version (number of committed transactions).
    pub version: u64,
    /// Ledger timestamp, microseconds since the Unix epoch.
    pub timestamp_usec: u64,
}

impl LedgerState {
    /// Create a ledger state.
    pub fn new(version: u64, timestamp_usec: u64) -> Self {
        Self { version, timestamp_usec }
    }

    /// Whether `self` is behind `other` on either field.
    pub fn is_behind(&self, other: &LedgerState) -> bool {
        self.version < other.version || self.timestamp_usec < other.timestamp_usec
    }
}

impl fmt::Display for LedgerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{version: {}, timestamp_usec: {}}}", self.version, self.timestamp_usec)
    }
}

/// Monotonic ledger state for one client.
#[derive(Debug)]
pub struct LedgerTracker {
    /// Chain id every response must report.
    chain_id: u8,
    /// Last accepted ledger state.
    last: RwLock<LedgerState>,
}

impl LedgerTracker {
    /// Create a tracker for `chain_id`, starting at the zero state.
    pub fn new(chain_id: u8) -> Self {
        Self {
            chain_id,
            last: RwLock::new(LedgerState::default()),
        }
    }

    /// The expected chain id.
    pub fn chain_id(&self) -> u8 {
        self.chain_id
    }

    /// The last accepted ledger state.
    pub fn last(&self) -> LedgerState {
        // The guarded value is a plain Copy struct, so a poisoned lock
        // still holds a consistent state.
        *self.last.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate a response's ledger fields and advance the state.
    ///
    /// # Arguments
    /// * `chain_id` - Chain id reported by the node.
    /// * `state` - Ledger state reported by the node.
    ///
    /// # Returns
    /// `Ok(())` after updating the state, `ChainIdMismatch` if the chain
    /// differs, or `StaleResponse` if the node is behind. On error the state
    /// is unchanged.
    pub fn validate_and_update(&self, chain_id: u8, state: LedgerState) -> Result<(), ClientError> {
        if chain_id != self.chain_id {
            return Err(ClientError::ChainIdMismatch {
                expected: self.chain_id,
                got: chain_id,
            });
        }

        let mut last = self.last.write().unwrap_or_else(PoisonError::into_inner);
        if state.is_behind(&last) {
            return Err(ClientError::StaleResponse { last: *last, got: state });
        }
        if *last != state {
            debug!(
                version = state.version,
                timestamp_usec = state.timestamp_usec,
                "ledger state updated"
            );
            *last = state;
        }
        Ok(())
    }
}
