//! Client configuration.

use std::time::Duration;

/// Testnet JSON-RPC endpoint.
pub const TESTNET_URL: &str = "https://testnet.diem.com/v1";

/// Testnet chain id.
pub const TESTNET_CHAIN_ID: u8 = 2;

/// Default delay between polls while waiting for a transaction.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,
    /// Chain id every response must report.
    pub chain_id: u8,
    /// Delay between polls in `wait_for_transaction`.
    pub poll_interval: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Configuration for an arbitrary network with default timings.
    pub fn new(url: impl Into<String>, chain_id: u8) -> Self {
        Self {
            url: url.into(),
            chain_id,
            ..Default::default()
        }
    }

    /// Configuration for the public testnet.
    pub fn testnet() -> Self {
        Self::default()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: TESTNET_URL.to_string(),
            chain_id: TESTNET_CHAIN_ID,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
