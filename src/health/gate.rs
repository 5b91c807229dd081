//! # Freshness / Circuit-Breaker Policy
//!
//! Gates a caller's side-effecting action (submitting a note, creating a
//! deck) on current health without forcing every caller to wait for a full
//! probe cycle. Rejections carry short, user-displayable messages; callers
//! are expected to show them directly, they are not internal bugs.

use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::monitor::HealthMonitor;
use super::report::CheckStatus;
use crate::constants::gate::{
    BREAKER_THRESHOLD, BREAKER_WINDOW_MS, DEFAULT_TTL_MS, FAIL_FAST_RETENTION_MS,
};

/// Gate rejection causes, one distinct user-facing message per cause
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// Circuit breaker is open after repeated rapid failures
    #[error("The flashcard service is temporarily unavailable, try again shortly")]
    BreakerOpen,

    /// Cached report already says the service is down
    #[error(
        "The flashcard service is not ready; make sure the application is running \
         and its automation add-on is enabled"
    )]
    ServiceNotReady,

    /// Report is stale or mid-refresh and the caller opted not to proceed
    #[error("Still checking the flashcard service, try again in a moment")]
    StillChecking,
}

/// Options for one gate call
#[derive(Debug, Clone, Copy)]
pub struct GateOptions {
    /// Maximum age of the newest check result before the report counts as stale
    pub ttl_ms: u64,
    /// Proceed optimistically on a stale but non-fail report
    pub allow_proceed_if_stale: bool,
    /// Kick a deduplicated background refresh on fail or stale reports
    pub refresh_if_stale: bool,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            allow_proceed_if_stale: true,
            refresh_if_stale: true,
        }
    }
}

/// Sliding time-window log of fail-fast rejections
///
/// Entries older than the retention window are pruned lazily on every insert
/// and query. The breaker opens when at least `threshold` hits landed inside
/// the (shorter) breaker window.
#[derive(Debug)]
pub struct FailFastLog {
    hits: Vec<Instant>,
    retention: Duration,
    window: Duration,
    threshold: usize,
}

impl Default for FailFastLog {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(FAIL_FAST_RETENTION_MS),
            Duration::from_millis(BREAKER_WINDOW_MS),
            BREAKER_THRESHOLD,
        )
    }
}

impl FailFastLog {
    pub fn new(retention: Duration, window: Duration, threshold: usize) -> Self {
        Self {
            hits: Vec::new(),
            retention,
            window,
            threshold,
        }
    }

    /// Record one fail-fast rejection at `now`
    pub fn record(&mut self, now: Instant) {
        self.prune(now);
        self.hits.push(now);
    }

    /// Whether the breaker is open at `now`
    pub fn breaker_open(&mut self, now: Instant) -> bool {
        self.prune(now);
        self.hits
            .iter()
            .filter(|hit| now.saturating_duration_since(**hit) <= self.window)
            .count()
            >= self.threshold
    }

    /// Retained hit count (post-prune)
    pub fn len(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.hits.len()
    }

    fn prune(&mut self, now: Instant) {
        let retention = self.retention;
        self.hits
            .retain(|hit| now.saturating_duration_since(*hit) <= retention);
    }
}

impl HealthMonitor {
    /// Gate a side-effecting action on current health
    ///
    /// Decision order:
    /// 1. Breaker open → reject without touching the report or probing.
    /// 2. Report says Fail → record a fail-fast hit, optionally kick a
    ///    deduplicated background refresh, reject.
    /// 3. Report stale (no recent finish, or any check in flight) →
    ///    optionally kick a refresh; reject if the caller disallowed
    ///    optimistic proceeds, otherwise allow on last known status.
    /// 4. Fresh and ok/warn → allow.
    pub async fn ensure_healthy(&self, options: GateOptions) -> Result<(), GateError> {
        let now = Instant::now();

        if self.inner.fail_fast.lock().breaker_open(now) {
            warn!("Gate rejected: circuit breaker open");
            return Err(GateError::BreakerOpen);
        }

        let (overall, fresh) = {
            let report = self.inner.report.read();
            (
                report.overall(),
                report.is_fresh(options.ttl_ms, chrono::Utc::now()),
            )
        };

        if overall == CheckStatus::Fail {
            self.inner.fail_fast.lock().record(now);
            if options.refresh_if_stale {
                self.spawn_background_refresh();
            }
            warn!("Gate rejected: service known to be down");
            return Err(GateError::ServiceNotReady);
        }

        if !fresh {
            if options.refresh_if_stale {
                self.spawn_background_refresh();
            }
            if !options.allow_proceed_if_stale {
                debug!("Gate rejected: report stale and caller disallowed optimistic proceed");
                return Err(GateError::StillChecking);
            }
            debug!(overall = ?overall, "Gate allowing optimistic proceed on stale report");
            return Ok(());
        }

        debug!(overall = ?overall, "Gate allowing proceed on fresh report");
        Ok(())
    }
}
