//! # Health Orchestrator
//!
//! [`HealthMonitor`] runs the fixed probe sequence
//! process-presence → http-reachability → protocol-version → write-capability,
//! enforcing short-circuit skips when an upstream check fails and a single
//! retry for the version probe. Every check mutation recomputes the report's
//! overall status and is bracketed by begin/end broadcast events, so observer
//! surfaces always see consistent transitions, skipped checks included.
//!
//! Overlapping invocations (poll tick, manual trigger, gate-kicked refresh)
//! serialize on an async run lock; the report itself sits behind a non-async
//! lock that is never held across an await.

use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::events::{HealthEvent, HealthEventPublisher};
use super::gate::FailFastLog;
use super::probes::{Probe, ProbeOutcome};
use super::report::{CheckKind, CheckStatus, HealthReport};
use crate::constants::monitor::{SKIP_DETAIL_PREFIX, STARTUP_GRACE_MS, VERSION_RETRY_DELAY_MS};

/// Orchestration timing configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Pause after a positive process check before probing the endpoint,
    /// letting the target finish starting its automation listener
    pub startup_grace_ms: u64,
    /// Delay before the single retry of the version probe
    pub version_retry_delay_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            startup_grace_ms: STARTUP_GRACE_MS,
            version_retry_delay_ms: VERSION_RETRY_DELAY_MS,
        }
    }
}

pub(super) struct MonitorInner {
    /// Probes in dependency order, one per [`CheckKind`]
    probes: Vec<Box<dyn Probe>>,
    pub(super) report: RwLock<HealthReport>,
    events: HealthEventPublisher,
    /// Serializes full and reduced runs (single-flight orchestration)
    run_lock: tokio::sync::Mutex<()>,
    /// At most one gate-kicked background refresh in flight
    refresh_in_flight: AtomicBool,
    pub(super) fail_fast: Mutex<FailFastLog>,
    config: MonitorConfig,
}

/// Health orchestrator owning the report, the event publisher, and the
/// circuit-breaker bookkeeping
///
/// Cheap to clone; all clones share the same report and state. The UI layers
/// hold one clone per surface that needs gating or event access.
#[derive(Clone)]
pub struct HealthMonitor {
    pub(super) inner: Arc<MonitorInner>,
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("overall", &self.inner.report.read().overall())
            .field("probe_count", &self.inner.probes.len())
            .field("subscriber_count", &self.inner.events.subscriber_count())
            .finish()
    }
}

impl HealthMonitor {
    /// Create a monitor over the given probes
    ///
    /// Probes are reordered into the canonical dependency order; supplying a
    /// partial chain is allowed (missing checks stay Unknown forever), which
    /// the tests use to isolate segments of the sequence.
    pub fn new(mut probes: Vec<Box<dyn Probe>>, config: MonitorConfig) -> Self {
        probes.sort_by_key(|p| p.kind().index());
        Self {
            inner: Arc::new(MonitorInner {
                probes,
                report: RwLock::new(HealthReport::new()),
                events: HealthEventPublisher::default(),
                run_lock: tokio::sync::Mutex::new(()),
                refresh_in_flight: AtomicBool::new(false),
                fail_fast: Mutex::new(FailFastLog::default()),
                config,
            }),
        }
    }

    /// Snapshot of the current report
    pub fn report(&self) -> HealthReport {
        self.inner.report.read().clone()
    }

    /// Subscribe an observer surface to begin/end check events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<HealthEvent> {
        self.inner.events.subscribe()
    }

    /// Run the full check sequence with short-circuit skip semantics
    ///
    /// Returns a snapshot of the report after the run.
    pub async fn run_all_checks(&self) -> HealthReport {
        let _run = self.inner.run_lock.lock().await;
        debug!("Starting full health check cycle");

        if self.run_probe(CheckKind::ProcessPresence).await != CheckStatus::Ok {
            self.skip_downstream(CheckKind::ProcessPresence, "application is not running");
            return self.finish_cycle();
        }

        // The process can be up before its automation listener accepts
        // connections; give it a moment
        tokio::time::sleep(Duration::from_millis(self.inner.config.startup_grace_ms)).await;

        if self.run_probe(CheckKind::HttpReachability).await != CheckStatus::Ok {
            self.skip_downstream(CheckKind::HttpReachability, "automation endpoint unreachable");
            return self.finish_cycle();
        }

        let mut version_status = self.run_probe(CheckKind::ProtocolVersion).await;
        if version_status == CheckStatus::Fail {
            // One retry: version queries are cheap and the endpoint may still
            // be settling right after startup
            tokio::time::sleep(Duration::from_millis(
                self.inner.config.version_retry_delay_ms,
            ))
            .await;
            version_status = self.run_probe(CheckKind::ProtocolVersion).await;
        }
        if version_status == CheckStatus::Fail {
            self.skip_downstream(CheckKind::ProtocolVersion, "protocol version unavailable");
            return self.finish_cycle();
        }

        self.run_probe(CheckKind::WriteCapability).await;
        self.finish_cycle()
    }

    /// Reduced liveness cycle for resume-from-idle: process presence and HTTP
    /// reachability only; version and write capability are always recorded as
    /// skipped, whatever the first two find
    pub async fn run_mini_checks(&self) -> HealthReport {
        let _run = self.inner.run_lock.lock().await;
        debug!("Starting reduced health check cycle");

        if self.run_probe(CheckKind::ProcessPresence).await == CheckStatus::Ok {
            self.run_probe(CheckKind::HttpReachability).await;
        } else {
            self.skip_check(CheckKind::HttpReachability, "application is not running");
        }

        self.skip_check(CheckKind::ProtocolVersion, "not part of reduced check");
        self.skip_check(CheckKind::WriteCapability, "not part of reduced check");
        self.finish_cycle()
    }

    /// Run one check by identity, outside the usual sequencing
    ///
    /// No short-circuiting applies; the caller is responsible for knowing the
    /// upstream checks are meaningful.
    pub async fn run_check(&self, kind: CheckKind) -> HealthReport {
        let _run = self.inner.run_lock.lock().await;
        self.run_probe(kind).await;
        self.report()
    }

    /// Kick a full refresh on a background task, deduplicated so at most one
    /// gate-kicked refresh is in flight. Returns whether a task was spawned.
    pub fn spawn_background_refresh(&self) -> bool {
        if self
            .inner
            .refresh_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Background refresh already in flight, not spawning another");
            return false;
        }

        let monitor = self.clone();
        tokio::spawn(async move {
            monitor.run_all_checks().await;
            monitor
                .inner
                .refresh_in_flight
                .store(false, Ordering::Release);
        });
        true
    }

    /// Execute one probe with full begin/end bookkeeping
    ///
    /// The probe contract already maps its own errors to Fail outcomes; the
    /// catch_unwind here is the orchestrator's final safety net so that not
    /// even a panicking probe can take down the host process.
    async fn run_probe(&self, kind: CheckKind) -> CheckStatus {
        let Some(probe) = self.inner.probes.iter().find(|p| p.kind() == kind) else {
            warn!(check = %kind, "No probe registered for check");
            return CheckStatus::Unknown;
        };

        let started_at = chrono::Utc::now();
        self.inner.report.write().begin_check(kind, started_at);
        self.inner
            .events
            .publish(HealthEvent::BeginCheck { kind, started_at });

        let outcome = match AssertUnwindSafe(probe.run()).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "probe panicked".to_string());
                ProbeOutcome::fail(detail)
            }
        };

        let finished_at = chrono::Utc::now();
        self.inner.report.write().settle_check(
            kind,
            outcome.status,
            outcome.detail.clone(),
            finished_at,
        );

        info!(
            check = %kind,
            status = ?outcome.status,
            detail = outcome.detail.as_deref(),
            duration_ms = (finished_at - started_at).num_milliseconds().max(0),
            "Health check settled"
        );

        self.inner.events.publish(HealthEvent::EndCheck {
            kind,
            status: outcome.status,
            detail: outcome.detail,
            started_at,
            finished_at,
        });

        outcome.status
    }

    /// Record a check as not-run due to an upstream failure
    ///
    /// Skips go through the same begin/end broadcast sequence as real runs so
    /// observers see consistent state transitions. The result is encoded as a
    /// Fail with a "Skipped:" detail prefix, matching what skip-aware
    /// consumers parse for.
    fn skip_check(&self, kind: CheckKind, reason: &str) {
        let detail = format!("{SKIP_DETAIL_PREFIX} {reason}");
        let started_at = chrono::Utc::now();

        self.inner.report.write().begin_check(kind, started_at);
        self.inner
            .events
            .publish(HealthEvent::BeginCheck { kind, started_at });

        let finished_at = started_at;
        self.inner.report.write().settle_check(
            kind,
            CheckStatus::Fail,
            Some(detail.clone()),
            finished_at,
        );

        debug!(check = %kind, reason, "Health check skipped");

        self.inner.events.publish(HealthEvent::EndCheck {
            kind,
            status: CheckStatus::Fail,
            detail: Some(detail),
            started_at,
            finished_at,
        });
    }

    fn skip_downstream(&self, failed: CheckKind, reason: &str) {
        for kind in failed.downstream() {
            self.skip_check(*kind, reason);
        }
    }

    fn finish_cycle(&self) -> HealthReport {
        let report = self.report();
        info!(overall = ?report.overall(), "Health check cycle complete");
        report
    }
}
