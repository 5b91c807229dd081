//! Shared test helpers: scripted probes with call counting, and monitor
//! construction without real timing delays.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cardbridge_core::health::{
    CheckKind, HealthMonitor, MonitorConfig, Probe, ProbeOutcome,
};

/// A probe that replays a script of outcomes and counts invocations
///
/// Outcomes are consumed front-to-back; once the script is exhausted the
/// fallback outcome repeats forever.
pub struct ScriptedProbe {
    kind: CheckKind,
    script: Mutex<VecDeque<ProbeOutcome>>,
    fallback: ProbeOutcome,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProbe {
    pub fn new(kind: CheckKind, script: Vec<ProbeOutcome>, fallback: ProbeOutcome) -> Self {
        Self {
            kind,
            script: Mutex::new(script.into()),
            fallback,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A probe that always settles to the same outcome
    pub fn always(kind: CheckKind, outcome: ProbeOutcome) -> Self {
        Self::new(kind, Vec::new(), outcome)
    }

    /// Add an artificial settle delay, for in-flight overlap tests
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Handle that keeps counting after the probe is boxed away
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    fn kind(&self) -> CheckKind {
        self.kind
    }

    async fn run(&self) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let scripted = self.script.lock().pop_front();
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Monitor with zero grace/retry delays so tests run at full speed
pub fn fast_monitor(probes: Vec<Box<dyn Probe>>) -> HealthMonitor {
    HealthMonitor::new(
        probes,
        MonitorConfig {
            startup_grace_ms: 0,
            version_retry_delay_ms: 0,
        },
    )
}

/// Probes for all four checks, each always settling Ok, with call counters
/// in dependency order
pub fn all_ok_probes() -> (Vec<Box<dyn Probe>>, Vec<Arc<AtomicUsize>>) {
    let mut probes: Vec<Box<dyn Probe>> = Vec::new();
    let mut counters = Vec::new();
    for kind in CheckKind::ORDERED {
        let probe = ScriptedProbe::always(kind, ProbeOutcome::ok());
        counters.push(probe.call_counter());
        probes.push(Box::new(probe));
    }
    (probes, counters)
}
