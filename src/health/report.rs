//! # Health Report Model
//!
//! Shared types for the health-monitoring subsystem: the fixed ordered set of
//! check identities, per-check results, and the aggregate report whose
//! `overall` status is always derived, never assigned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::monitor::SKIP_DETAIL_PREFIX;

/// Identity of one probe in the fixed four-probe sequence
///
/// Declaration order is the dependency order: each later check is only
/// meaningful if the earlier ones succeeded. [`CheckKind::ORDERED`] exposes
/// that order for orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    ProcessPresence,
    HttpReachability,
    ProtocolVersion,
    WriteCapability,
}

impl CheckKind {
    /// All checks in dependency order
    pub const ORDERED: [CheckKind; 4] = [
        CheckKind::ProcessPresence,
        CheckKind::HttpReachability,
        CheckKind::ProtocolVersion,
        CheckKind::WriteCapability,
    ];

    /// Stable identifier used in logs and events
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::ProcessPresence => "process_presence",
            CheckKind::HttpReachability => "http_reachability",
            CheckKind::ProtocolVersion => "protocol_version",
            CheckKind::WriteCapability => "write_capability",
        }
    }

    /// Human-readable label for observer surfaces
    pub fn label(&self) -> &'static str {
        match self {
            CheckKind::ProcessPresence => "Application running",
            CheckKind::HttpReachability => "Automation endpoint reachable",
            CheckKind::ProtocolVersion => "Protocol version supported",
            CheckKind::WriteCapability => "Notes can be added",
        }
    }

    /// Position in the dependency chain
    pub fn index(&self) -> usize {
        match self {
            CheckKind::ProcessPresence => 0,
            CheckKind::HttpReachability => 1,
            CheckKind::ProtocolVersion => 2,
            CheckKind::WriteCapability => 3,
        }
    }

    /// Checks strictly after this one in the dependency chain
    pub fn downstream(&self) -> &'static [CheckKind] {
        &Self::ORDERED[self.index() + 1..]
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one check
///
/// `Unknown` means the check has never run; it is the default at process
/// start and is distinct from a probe that ran and failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    #[default]
    Unknown,
    Checking,
    Ok,
    Warn,
    Fail,
}

impl CheckStatus {
    /// Whether this status is terminal (the probe settled or was skipped)
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckStatus::Ok | CheckStatus::Warn | CheckStatus::Fail)
    }
}

/// Latest result for a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub kind: CheckKind,
    /// Human-readable label, duplicated from the kind for observer convenience
    pub label: String,
    pub status: CheckStatus,
    /// Display-ready detail; skip records start with "Skipped:"
    pub detail: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CheckResult {
    /// A never-run result for the given check
    pub fn unknown(kind: CheckKind) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            status: CheckStatus::Unknown,
            detail: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Wall-clock duration of the last run, clamped to zero
    pub fn duration_ms(&self) -> Option<u64> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => {
                Some((finished - started).num_milliseconds().max(0) as u64)
            }
            _ => None,
        }
    }

    /// Whether this result records an upstream-failure skip rather than a
    /// probe that actually ran
    pub fn is_skipped(&self) -> bool {
        self.status == CheckStatus::Fail
            && self
                .detail
                .as_deref()
                .is_some_and(|d| d.starts_with(SKIP_DETAIL_PREFIX))
    }
}

/// Aggregate health of the external target
///
/// `overall` is a pure function of the four check statuses, recomputed after
/// every mutation; nothing else is allowed to assign it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    overall: CheckStatus,
    checks: [CheckResult; 4],
}

impl Default for HealthReport {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthReport {
    /// A report with all checks in the never-run state
    pub fn new() -> Self {
        Self {
            overall: overall_of(&[CheckStatus::Unknown; 4]),
            checks: CheckKind::ORDERED.map(CheckResult::unknown),
        }
    }

    /// Derived aggregate status
    pub fn overall(&self) -> CheckStatus {
        self.overall
    }

    /// Latest result for one check
    pub fn check(&self, kind: CheckKind) -> &CheckResult {
        &self.checks[kind.index()]
    }

    /// All results in dependency order
    pub fn checks(&self) -> &[CheckResult; 4] {
        &self.checks
    }

    /// Current statuses in dependency order
    pub fn statuses(&self) -> [CheckStatus; 4] {
        [
            self.checks[0].status,
            self.checks[1].status,
            self.checks[2].status,
            self.checks[3].status,
        ]
    }

    /// Mark a check as in flight
    pub fn begin_check(&mut self, kind: CheckKind, started_at: DateTime<Utc>) {
        let check = &mut self.checks[kind.index()];
        check.status = CheckStatus::Checking;
        check.detail = None;
        check.started_at = Some(started_at);
        check.finished_at = None;
        self.recompute_overall();
    }

    /// Record the terminal outcome of a check
    pub fn settle_check(
        &mut self,
        kind: CheckKind,
        status: CheckStatus,
        detail: Option<String>,
        finished_at: DateTime<Utc>,
    ) {
        let check = &mut self.checks[kind.index()];
        check.status = status;
        check.detail = detail;
        check.finished_at = Some(finished_at);
        self.recompute_overall();
    }

    /// Most recent finish time across all checks
    pub fn latest_finish(&self) -> Option<DateTime<Utc>> {
        self.checks.iter().filter_map(|c| c.finished_at).max()
    }

    /// Whether any check is currently in flight
    pub fn any_checking(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Checking)
    }

    /// Freshness relative to `now`: no check in flight and the newest finish
    /// is within `ttl_ms`. A report with no finished check is never fresh.
    pub fn is_fresh(&self, ttl_ms: u64, now: DateTime<Utc>) -> bool {
        if self.any_checking() {
            return false;
        }
        match self.latest_finish() {
            Some(finish) => (now - finish).num_milliseconds() <= ttl_ms as i64,
            None => false,
        }
    }

    fn recompute_overall(&mut self) {
        self.overall = overall_of(&self.statuses());
    }
}

/// The aggregate-status function
///
/// Any in-flight check dominates; otherwise a clean slate is Ok, a uniformly
/// failed slate is Fail, and any mix involving Warn or partial Fail is Warn.
/// Never-run checks count as neither failed nor warned, so a brand-new report
/// reads Ok here; freshness gating is what keeps callers from trusting it.
pub fn overall_of(statuses: &[CheckStatus; 4]) -> CheckStatus {
    if statuses.iter().any(|s| *s == CheckStatus::Checking) {
        return CheckStatus::Checking;
    }
    let fails = statuses.iter().filter(|s| **s == CheckStatus::Fail).count();
    let warns = statuses.iter().filter(|s| **s == CheckStatus::Warn).count();
    if fails == 0 && warns == 0 {
        CheckStatus::Ok
    } else if fails == statuses.len() {
        CheckStatus::Fail
    } else {
        CheckStatus::Warn
    }
}
