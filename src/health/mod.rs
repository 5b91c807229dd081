//! # Health Monitoring Subsystem
//!
//! Dependency-ordered asynchronous probing of the external flashcard
//! application, with staleness tracking, circuit-breaking, debounced refresh,
//! and broadcast to any number of observer surfaces.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────┐   timer    ┌──────────────────┐
//!   │  PollScheduler   ├───────────▶│  HealthMonitor   │
//!   └──────────────────┘            │  (orchestrator)  │
//!   ┌──────────────────┐   gate     │  - run_all_checks│
//!   │  UI write paths  ├───────────▶│  - run_mini_checks
//!   └──────────────────┘            │  - ensure_healthy│
//!                                   └───┬──────────┬───┘
//!                           runs probes │          │ broadcasts
//!                                       ▼          ▼
//!                          ┌──────────────┐  ┌───────────────────┐
//!                          │ Probe chain  │  │ HealthEventPublisher
//!                          │ process →    │  │ Begin/EndCheck ───▶ observers
//!                          │ http →       │  └───────────────────┘
//!                          │ version →    │
//!                          │ write-cap    │
//!                          └──────────────┘
//! ```
//!
//! The probe chain order is a dependency chain: each later check is only
//! meaningful if the earlier ones succeeded, so an upstream failure records
//! the downstream checks as skipped instead of running them.

pub mod events;
pub mod gate;
pub mod monitor;
pub mod poller;
pub mod probes;
pub mod report;

pub use events::{HealthEvent, HealthEventPublisher};
pub use gate::{FailFastLog, GateError, GateOptions};
pub use monitor::{HealthMonitor, MonitorConfig};
pub use poller::{PollScheduler, PollingConfig};
pub use probes::{
    standard_probes, HttpReachabilityProbe, Probe, ProbeOutcome, ProcessPresenceProbe,
    ProtocolVersionProbe, WriteCapabilityProbe,
};
pub use report::{overall_of, CheckKind, CheckResult, CheckStatus, HealthReport};
