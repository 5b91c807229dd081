//! # Polling Scheduler
//!
//! Drives the orchestrator on a jittered timer, independent of caller-driven
//! gating. The loop sleeps, then awaits the full run to completion before
//! rescheduling, so a slow probe cycle can never overlap the next one.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::monitor::HealthMonitor;
use crate::constants::polling::{DEFAULT_INTERVAL_MS, JITTER_FRACTION};

/// Poll loop configuration
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Nominal interval between full probe cycles
    pub interval_ms: u64,
    /// Fraction of the interval used as ± jitter, keeping multiple helper
    /// instances from probing in lockstep
    pub jitter_fraction: f64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            jitter_fraction: JITTER_FRACTION,
        }
    }
}

/// Owns the single poll task; start and stop are idempotent
pub struct PollScheduler {
    monitor: HealthMonitor,
    config: PollingConfig,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PollScheduler {
    pub fn new(monitor: HealthMonitor, config: PollingConfig) -> Self {
        Self {
            monitor,
            config,
            handle: Mutex::new(None),
        }
    }

    /// Start polling; a no-op when a poll task is already alive.
    /// Returns whether a new task was started.
    pub fn start(&self) -> bool {
        let mut handle = self.handle.lock();
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("Poll scheduler already running, start is a no-op");
            return false;
        }

        let monitor = self.monitor.clone();
        let config = self.config.clone();
        info!(
            interval_ms = config.interval_ms,
            jitter_fraction = config.jitter_fraction,
            "Starting health poll scheduler"
        );

        *handle = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(jittered_interval(&config)).await;
                monitor.run_all_checks().await;
            }
        }));
        true
    }

    /// Stop polling; a no-op when no poll task is alive.
    /// Returns whether a task was stopped.
    pub fn stop(&self) -> bool {
        match self.handle.lock().take() {
            Some(handle) => {
                handle.abort();
                info!("Stopped health poll scheduler");
                true
            }
            None => {
                debug!("Poll scheduler not running, stop is a no-op");
                false
            }
        }
    }

    /// Whether a poll task is currently alive
    pub fn is_running(&self) -> bool {
        self.handle.lock().as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
    }
}

/// Nominal interval scaled by a uniform factor in [1 - jitter, 1 + jitter]
fn jittered_interval(config: &PollingConfig) -> Duration {
    let spread = config.jitter_fraction * (2.0 * fastrand::f64() - 1.0);
    Duration::from_millis(config.interval_ms).mul_f64(1.0 + spread)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::MonitorConfig;

    fn idle_scheduler(interval_ms: u64) -> PollScheduler {
        let monitor = HealthMonitor::new(Vec::new(), MonitorConfig::default());
        PollScheduler::new(
            monitor,
            PollingConfig {
                interval_ms,
                jitter_fraction: JITTER_FRACTION,
            },
        )
    }

    #[test]
    fn test_jitter_stays_within_twenty_percent() {
        let config = PollingConfig {
            interval_ms: 10_000,
            jitter_fraction: 0.2,
        };
        for _ in 0..1_000 {
            let interval = jittered_interval(&config);
            assert!(interval >= Duration::from_millis(8_000));
            assert!(interval <= Duration::from_millis(12_000));
        }
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let scheduler = idle_scheduler(60_000);
        assert!(scheduler.start());
        assert!(!scheduler.start(), "second start must be a no-op");
        assert!(scheduler.is_running());
        scheduler.stop();
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let scheduler = idle_scheduler(60_000);
        assert!(!scheduler.stop());
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_stop_then_restart() {
        let scheduler = idle_scheduler(60_000);
        assert!(scheduler.start());
        assert!(scheduler.stop());
        assert!(!scheduler.is_running());
        assert!(scheduler.start());
        scheduler.stop();
    }
}
