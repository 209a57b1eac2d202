//! # Client Configuration & Constants
//!
//! Every magic number in the SDK lives here. If you're hardcoding a timeout
//! somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! The constants are defaults, not laws: [`ClientConfig`] lets callers tune
//! retry behavior per client, and [`crate::ExecuteOptions`] per request.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Retry & Backoff
// ---------------------------------------------------------------------------

/// Wait before the first retry. Doubles from there.
pub const DEFAULT_MIN_BACKOFF_MS: u64 = 250;

/// Ceiling for the retry wait. Past this, doubling stops and patience begins.
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 8_000;

/// Physical attempts allowed per logical request before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Upper bound on a single round trip to one node. A node that takes longer
/// is treated exactly like one that refused the connection.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// How long a node sits out after its first failure.
pub const DEFAULT_NODE_MIN_BACKOFF_MS: u64 = 8_000;

/// Longest a repeatedly failing node is kept out of preferred rotation.
pub const DEFAULT_NODE_MAX_BACKOFF_MS: u64 = 3_600_000;

/// Connect timeout for the TCP transport.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

// ---------------------------------------------------------------------------
// Transaction Defaults
// ---------------------------------------------------------------------------

/// Tinybars per hbar. The ledger never deals in fractions of a tinybar.
pub const TINYBARS_PER_HBAR: u64 = 100_000_000;

/// Fee ceiling applied when a transaction type doesn't pick its own: 2 hbar.
pub const DEFAULT_MAX_TRANSACTION_FEE: u64 = 2 * TINYBARS_PER_HBAR;

/// Fee ceiling for crypto transfers: 1 hbar.
pub const DEFAULT_TRANSFER_MAX_FEE: u64 = TINYBARS_PER_HBAR;

/// Validity window after the transaction's valid-start timestamp.
pub const DEFAULT_TRANSACTION_VALID_DURATION: Duration = Duration::from_secs(120);

/// Memos longer than this (in UTF-8 bytes) are rejected by the network, so
/// we reject them first.
pub const MAX_MEMO_BYTES: usize = 100;

// ---------------------------------------------------------------------------
// Timestamp Generation
// ---------------------------------------------------------------------------

/// Jittered valid-start timestamps are backdated by a random amount in
/// `[JITTER_BACKDATE_MIN_MS, JITTER_BACKDATE_MAX_MS]` so that a node with a
/// slightly slow clock doesn't reject the transaction as "from the future".
pub const JITTER_BACKDATE_MIN_MS: i64 = 3_000;
pub const JITTER_BACKDATE_MAX_MS: i64 = 8_000;

// ---------------------------------------------------------------------------
// Wire
// ---------------------------------------------------------------------------

/// Largest frame the TCP transport will read. Anything bigger is a bug or
/// an attack, and we don't care which.
pub const MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Well-known Networks
// ---------------------------------------------------------------------------

/// Mainnet consensus nodes as `(account number, address)`.
pub const MAINNET_NODES: &[(u64, &str)] = &[
    (3, "35.237.200.180:50211"),
    (4, "35.186.191.247:50211"),
    (5, "35.192.2.25:50211"),
    (6, "35.199.161.108:50211"),
    (7, "35.203.82.240:50211"),
];

/// Testnet consensus nodes. Reset occasionally; treat balances as fiction.
pub const TESTNET_NODES: &[(u64, &str)] = &[
    (3, "0.testnet.hedera.com:50211"),
    (4, "1.testnet.hedera.com:50211"),
    (5, "2.testnet.hedera.com:50211"),
    (6, "3.testnet.hedera.com:50211"),
];

/// Previewnet consensus nodes. Runs tomorrow's code today.
pub const PREVIEWNET_NODES: &[(u64, &str)] = &[
    (3, "0.previewnet.hedera.com:50211"),
    (4, "1.previewnet.hedera.com:50211"),
    (5, "2.previewnet.hedera.com:50211"),
    (6, "3.previewnet.hedera.com:50211"),
];

/// First account number assigned to nodes given as a bare address list.
pub const FIRST_NODE_ACCOUNT_NUM: u64 = 3;

/// Looks up a well-known address book by name.
pub fn address_book(name: &str) -> Option<&'static [(u64, &'static str)]> {
    match name {
        "mainnet" => Some(MAINNET_NODES),
        "testnet" => Some(TESTNET_NODES),
        "previewnet" => Some(PREVIEWNET_NODES),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Retry and timeout settings for a [`crate::Client`].
///
/// Millisecond fields so the struct round-trips through JSON/TOML config
/// files without a custom duration format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Wait before the first retry.
    pub min_backoff_ms: u64,
    /// Ceiling for any single retry wait.
    pub max_backoff_ms: u64,
    /// Physical attempts per logical request.
    pub max_attempts: u32,
    /// Timeout for one round trip to one node.
    pub request_timeout_ms: u64,
    /// Optional overall budget per logical request, measured from the moment
    /// execution starts. `None` means the attempt ceiling is the only limit.
    pub deadline_ms: Option<u64>,
    /// How long a failing node is deprioritized after its first failure.
    pub node_min_backoff_ms: u64,
    /// Cap on the node deprioritization window.
    pub node_max_backoff_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            min_backoff_ms: DEFAULT_MIN_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            deadline_ms: None,
            node_min_backoff_ms: DEFAULT_NODE_MIN_BACKOFF_MS,
            node_max_backoff_ms: DEFAULT_NODE_MAX_BACKOFF_MS,
        }
    }
}

impl ClientConfig {
    /// Parses a JSON document and validates the result. Missing fields take
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidArgument(format!("invalid client config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the execution engine can't honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::InvalidArgument(
                "max_attempts must be at least 1".into(),
            ));
        }
        if self.min_backoff_ms > self.max_backoff_ms {
            return Err(Error::InvalidArgument(format!(
                "min_backoff_ms ({}) exceeds max_backoff_ms ({})",
                self.min_backoff_ms, self.max_backoff_ms
            )));
        }
        if self.node_min_backoff_ms > self.node_max_backoff_ms {
            return Err(Error::InvalidArgument(format!(
                "node_min_backoff_ms ({}) exceeds node_max_backoff_ms ({})",
                self.node_min_backoff_ms, self.node_max_backoff_ms
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::InvalidArgument(
                "request_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn min_backoff(&self) -> Duration {
        Duration::from_millis(self.min_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    pub fn node_min_backoff(&self) -> Duration {
        Duration::from_millis(self.node_min_backoff_ms)
    }

    pub fn node_max_backoff(&self) -> Duration {
        Duration::from_millis(self.node_max_backoff_ms)
    }
}
