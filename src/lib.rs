#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # CardBridge Core
//!
//! Core subsystem of the CardBridge desktop helper, which captures clipboard
//! content into flashcard drafts and submits them to a locally running
//! flashcard application through its HTTP automation API.
//!
//! The centerpiece is the health-monitoring subsystem: a dependency-ordered
//! chain of asynchronous probes against an external, unreliable local
//! process, with staleness tracking, circuit-breaking, debounced refresh,
//! and broadcast to any number of observer windows. The UI layers (tray
//! icon, capture window, settings) live in the host application and consume
//! this crate through three surfaces:
//!
//! - [`health::HealthMonitor`] - run checks, read the report, subscribe to
//!   begin/end events
//! - [`health::HealthMonitor::ensure_healthy`] - gate side-effecting actions
//! - [`automation::NoteSubmitter`] - the gated write path for notes and decks
//!
//! ## Module Organization
//!
//! - [`health`] - probes, orchestrator, freshness/breaker policy, poller,
//!   event broadcast
//! - [`automation`] - wire protocol and HTTP client for the local endpoint
//! - [`config`] - environment-aware YAML configuration
//! - [`error`] - crate-level error surface
//! - [`logging`] - structured tracing setup
//! - [`constants`] - protocol and timing constants
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardbridge_core::automation::AutomationClient;
//! use cardbridge_core::config::BridgeConfig;
//! use cardbridge_core::health::{standard_probes, HealthMonitor, PollScheduler};
//!
//! # async fn example() -> cardbridge_core::Result<()> {
//! let config = BridgeConfig::default();
//! let client = AutomationClient::new(config.automation_client_config())?;
//!
//! let monitor = HealthMonitor::new(
//!     standard_probes(
//!         client.clone(),
//!         config.monitor.process_names.clone(),
//!         config.probe_draft(),
//!     ),
//!     config.monitor_config(),
//! );
//!
//! let poller = PollScheduler::new(monitor.clone(), config.polling_config());
//! poller.start();
//!
//! let report = monitor.run_all_checks().await;
//! println!("overall: {:?}", report.overall());
//! # Ok(())
//! # }
//! ```

pub mod automation;
pub mod config;
pub mod constants;
pub mod error;
pub mod health;
pub mod logging;

pub use automation::{AutomationClient, AutomationError, NoteDraft, NoteSubmitter};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use health::{
    CheckKind, CheckResult, CheckStatus, GateError, GateOptions, HealthEvent, HealthMonitor,
    HealthReport, PollScheduler,
};
