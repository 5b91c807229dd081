//! # Probe Functions
//!
//! The four independent asynchronous checks against the external flashcard
//! application, in dependency order: process presence, HTTP reachability,
//! protocol version, write capability.
//!
//! Probes never propagate errors. Every failure mode, including unexpected
//! ones, maps to a [`ProbeOutcome`] with `Fail` status and a display-ready
//! detail string. Network probes ride the automation client's per-request
//! timeout, so no probe can outlive its budget.

use async_trait::async_trait;
use sysinfo::{ProcessRefreshKind, RefreshKind, System};
use tracing::debug;

use super::report::{CheckKind, CheckStatus};
use crate::automation::{AutomationClient, NoteDraft};
use crate::constants::protocol;

/// Terminal outcome of a single probe invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: CheckStatus,
    pub detail: Option<String>,
}

impl ProbeOutcome {
    pub fn ok() -> Self {
        Self {
            status: CheckStatus::Ok,
            detail: None,
        }
    }

    pub fn ok_with(detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Ok,
            detail: Some(detail.into()),
        }
    }

    pub fn warn(detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Warn,
            detail: Some(detail.into()),
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Fail,
            detail: Some(detail.into()),
        }
    }
}

/// One asynchronous check of a single aspect of the target's availability
#[async_trait]
pub trait Probe: Send + Sync {
    /// Identity of the check this probe implements
    fn kind(&self) -> CheckKind;

    /// Run the check. Implementations must settle to an outcome on every
    /// path; returning is the only way out, panics and errors included.
    async fn run(&self) -> ProbeOutcome;
}

/// Detects whether the target application's OS process is running
pub struct ProcessPresenceProbe {
    process_names: Vec<String>,
}

impl ProcessPresenceProbe {
    pub fn new(process_names: Vec<String>) -> Self {
        Self { process_names }
    }

    fn scan(names: &[String]) -> bool {
        let refresh = RefreshKind::new().with_processes(ProcessRefreshKind::new());
        let system = System::new_with_specifics(refresh);
        system.processes().values().any(|process| {
            let name = process.name().to_lowercase();
            names.iter().any(|wanted| name == wanted.to_lowercase())
        })
    }
}

#[async_trait]
impl Probe for ProcessPresenceProbe {
    fn kind(&self) -> CheckKind {
        CheckKind::ProcessPresence
    }

    async fn run(&self) -> ProbeOutcome {
        let names = self.process_names.clone();
        // Process listing is blocking work; keep it off the async threads
        let found = tokio::task::spawn_blocking(move || Self::scan(&names)).await;

        match found {
            Ok(true) => ProbeOutcome::ok(),
            Ok(false) => ProbeOutcome::fail("Application process not found"),
            Err(e) => ProbeOutcome::fail(format!("Process listing failed: {e}")),
        }
    }
}

/// Confirms the automation endpoint answers HTTP with parseable JSON
pub struct HttpReachabilityProbe {
    client: AutomationClient,
}

impl HttpReachabilityProbe {
    pub fn new(client: AutomationClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Probe for HttpReachabilityProbe {
    fn kind(&self) -> CheckKind {
        CheckKind::HttpReachability
    }

    async fn run(&self) -> ProbeOutcome {
        match self.client.reachability().await {
            Ok(()) => ProbeOutcome::ok(),
            Err(e) => ProbeOutcome::fail(e.to_string()),
        }
    }
}

/// Checks the endpoint's declared protocol version against the minimum
pub struct ProtocolVersionProbe {
    client: AutomationClient,
    min_version: u32,
}

impl ProtocolVersionProbe {
    pub fn new(client: AutomationClient, min_version: u32) -> Self {
        Self {
            client,
            min_version,
        }
    }
}

#[async_trait]
impl Probe for ProtocolVersionProbe {
    fn kind(&self) -> CheckKind {
        CheckKind::ProtocolVersion
    }

    async fn run(&self) -> ProbeOutcome {
        match self.client.version().await {
            Ok(version) if version >= self.min_version => {
                debug!(version, "Endpoint protocol version accepted");
                ProbeOutcome::ok_with(format!("Endpoint protocol version {version}"))
            }
            // Too-old is a soft signal: partial functionality may still work
            Ok(version) => ProbeOutcome::warn(format!(
                "Endpoint protocol version {version} is below the supported minimum {}",
                self.min_version
            )),
            Err(e) => ProbeOutcome::fail(e.to_string()),
        }
    }
}

/// Dry-run validation that a note could be added; commits nothing
pub struct WriteCapabilityProbe {
    client: AutomationClient,
    draft: NoteDraft,
}

impl WriteCapabilityProbe {
    pub fn new(client: AutomationClient, draft: NoteDraft) -> Self {
        Self { client, draft }
    }
}

#[async_trait]
impl Probe for WriteCapabilityProbe {
    fn kind(&self) -> CheckKind {
        CheckKind::WriteCapability
    }

    async fn run(&self) -> ProbeOutcome {
        match self.client.can_add_note(&self.draft).await {
            Ok(true) => ProbeOutcome::ok(),
            Ok(false) => {
                ProbeOutcome::warn("Endpoint reports the probe draft would be rejected")
            }
            Err(e) => ProbeOutcome::fail(e.to_string()),
        }
    }
}

/// The standard probe chain in dependency order
pub fn standard_probes(
    client: AutomationClient,
    process_names: Vec<String>,
    probe_draft: NoteDraft,
) -> Vec<Box<dyn Probe>> {
    vec![
        Box::new(ProcessPresenceProbe::new(process_names)),
        Box::new(HttpReachabilityProbe::new(client.clone())),
        Box::new(ProtocolVersionProbe::new(
            client.clone(),
            protocol::MIN_SUPPORTED_VERSION,
        )),
        Box::new(WriteCapabilityProbe::new(client, probe_draft)),
    ]
}
