//! # System Constants
//!
//! Core constants that define the operational boundaries of the CardBridge
//! health-monitoring subsystem and its automation protocol client.
//!
//! Timing values mirror the behavior of the desktop helper the crate was
//! extracted from; changing them changes user-visible gating behavior.

/// Automation protocol action names understood by the local endpoint
pub mod actions {
    /// Returns the endpoint's declared protocol version
    pub const VERSION: &str = "version";
    /// Dry-run validation of a note draft; commits nothing
    pub const CAN_ADD_NOTE: &str = "canAddNote";
    /// Adds a note and returns its identifier
    pub const ADD_NOTE: &str = "addNote";
    /// Creates a deck (no-op if it already exists)
    pub const CREATE_DECK: &str = "createDeck";
    /// Lists the names of all decks
    pub const DECK_NAMES: &str = "deckNames";
}

/// Protocol version this client speaks and the minimum the endpoint must meet
pub mod protocol {
    /// Version number tagged onto every outgoing request
    pub const CLIENT_VERSION: u32 = 6;
    /// Endpoint versions below this produce a Warn result from the version probe
    pub const MIN_SUPPORTED_VERSION: u32 = 6;
}

/// Default network and endpoint settings
pub mod endpoint {
    /// Default base URL of the local automation endpoint
    pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8765";
    /// Per-request timeout for probe and write traffic
    pub const DEFAULT_TIMEOUT_MS: u64 = 1_500;
}

/// Health orchestration timing
pub mod monitor {
    /// Grace period after a positive process check, letting the target
    /// application finish starting its automation listener
    pub const STARTUP_GRACE_MS: u64 = 400;
    /// Delay before the single retry of the protocol-version probe
    pub const VERSION_RETRY_DELAY_MS: u64 = 400;
    /// Detail prefix recorded for checks skipped due to upstream failure
    pub const SKIP_DETAIL_PREFIX: &str = "Skipped:";
}

/// Freshness and circuit-breaker policy
pub mod gate {
    /// Default freshness TTL for gate calls
    pub const DEFAULT_TTL_MS: u64 = 10_000;
    /// Fail-fast hits older than this are pruned from the log
    pub const FAIL_FAST_RETENTION_MS: u64 = 30_000;
    /// Window over which hits count toward opening the breaker
    pub const BREAKER_WINDOW_MS: u64 = 15_000;
    /// Hits within the window at which the breaker opens
    pub const BREAKER_THRESHOLD: usize = 3;
}

/// Background polling
pub mod polling {
    /// Default interval between full probe cycles
    pub const DEFAULT_INTERVAL_MS: u64 = 30_000;
    /// Interval jitter fraction (±20%) to avoid thundering-herd alignment
    /// across multiple running helper instances
    pub const JITTER_FRACTION: f64 = 0.2;
}

/// Names the target application's OS process may appear under
pub const TARGET_PROCESS_NAMES: &[&str] = &["anki", "anki.exe", "AnkiMac"];

/// Capacity of the health event broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;
