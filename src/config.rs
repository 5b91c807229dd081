//! # Configuration
//!
//! Environment-aware YAML configuration for the core: a base file plus an
//! optional per-environment overlay, deep-merged before deserialization.
//! Every section has defaults, so a missing file yields a fully usable
//! configuration pointed at the standard local endpoint.
//!
//! File layout:
//! ```text
//! <config dir>/cardbridge.yaml                base settings
//! <config dir>/cardbridge.<environment>.yaml  optional overlay
//! ```

use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;
use std::path::Path;
use tracing::debug;

use crate::automation::{AutomationClientConfig, NoteDraft};
use crate::constants::{endpoint, gate, monitor, polling, TARGET_PROCESS_NAMES};
use crate::error::{BridgeError, Result};
use crate::health::{GateOptions, MonitorConfig, PollingConfig};

/// Automation endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSection {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for EndpointSection {
    fn default() -> Self {
        Self {
            base_url: endpoint::DEFAULT_BASE_URL.to_string(),
            timeout_ms: endpoint::DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Health orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    pub startup_grace_ms: u64,
    pub version_retry_delay_ms: u64,
    /// Process names the presence probe looks for
    pub process_names: Vec<String>,
    /// Deck and model used by the side-effect-free write-capability probe
    pub probe_deck: String,
    pub probe_model: String,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            startup_grace_ms: monitor::STARTUP_GRACE_MS,
            version_retry_delay_ms: monitor::VERSION_RETRY_DELAY_MS,
            process_names: TARGET_PROCESS_NAMES.iter().map(|s| s.to_string()).collect(),
            probe_deck: "Default".to_string(),
            probe_model: "Basic".to_string(),
        }
    }
}

/// Health gate defaults, overridable per call through [`GateOptions`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSection {
    pub ttl_ms: u64,
    pub allow_proceed_if_stale: bool,
    pub refresh_if_stale: bool,
}

impl Default for GateSection {
    fn default() -> Self {
        Self {
            ttl_ms: gate::DEFAULT_TTL_MS,
            allow_proceed_if_stale: true,
            refresh_if_stale: true,
        }
    }
}

/// Background polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSection {
    pub interval_ms: u64,
    pub jitter_fraction: f64,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            interval_ms: polling::DEFAULT_INTERVAL_MS,
            jitter_fraction: polling::JITTER_FRACTION,
        }
    }
}

/// Full core configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub endpoint: EndpointSection,
    pub monitor: MonitorSection,
    pub gate: GateSection,
    pub polling: PollingSection,
}

impl BridgeConfig {
    /// Load from a config directory with environment auto-detection
    pub fn load(config_dir: &Path) -> Result<Self> {
        Self::load_for_environment(config_dir, &detect_environment())
    }

    /// Load the base file plus the overlay for an explicit environment
    ///
    /// Missing files are not errors; they contribute nothing to the merge.
    pub fn load_for_environment(config_dir: &Path, environment: &str) -> Result<Self> {
        let base = read_yaml(&config_dir.join("cardbridge.yaml"))?;
        let overlay = read_yaml(&config_dir.join(format!("cardbridge.{environment}.yaml")))?;

        debug!(
            environment,
            config_dir = %config_dir.display(),
            has_base = base.is_some(),
            has_overlay = overlay.is_some(),
            "Loading configuration"
        );

        let merged = match (base, overlay) {
            (Some(base), Some(overlay)) => merge_yaml(base, overlay),
            (Some(single), None) | (None, Some(single)) => single,
            (None, None) => YamlValue::Mapping(Default::default()),
        };

        let config: Self = serde_yaml::from_value(merged)
            .map_err(|e| BridgeError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot work
    pub fn validate(&self) -> Result<()> {
        if !self.endpoint.base_url.starts_with("http://")
            && !self.endpoint.base_url.starts_with("https://")
        {
            return Err(BridgeError::Configuration(format!(
                "endpoint.base_url must be an http(s) URL, got '{}'",
                self.endpoint.base_url
            )));
        }
        if self.endpoint.timeout_ms == 0 {
            return Err(BridgeError::Configuration(
                "endpoint.timeout_ms must be positive".to_string(),
            ));
        }
        if self.gate.ttl_ms == 0 {
            return Err(BridgeError::Configuration(
                "gate.ttl_ms must be positive".to_string(),
            ));
        }
        if self.monitor.process_names.is_empty() {
            return Err(BridgeError::Configuration(
                "monitor.process_names must not be empty".to_string(),
            ));
        }
        if self.polling.interval_ms == 0 {
            return Err(BridgeError::Configuration(
                "polling.interval_ms must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.polling.jitter_fraction) {
            return Err(BridgeError::Configuration(format!(
                "polling.jitter_fraction must be in [0, 1), got {}",
                self.polling.jitter_fraction
            )));
        }
        Ok(())
    }

    /// Client settings for the automation endpoint
    pub fn automation_client_config(&self) -> AutomationClientConfig {
        AutomationClientConfig {
            base_url: self.endpoint.base_url.clone(),
            timeout_ms: self.endpoint.timeout_ms,
        }
    }

    /// Orchestration timing for the health monitor
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            startup_grace_ms: self.monitor.startup_grace_ms,
            version_retry_delay_ms: self.monitor.version_retry_delay_ms,
        }
    }

    /// Default gate options for callers that take the configured policy
    pub fn gate_options(&self) -> GateOptions {
        GateOptions {
            ttl_ms: self.gate.ttl_ms,
            allow_proceed_if_stale: self.gate.allow_proceed_if_stale,
            refresh_if_stale: self.gate.refresh_if_stale,
        }
    }

    /// Poll loop settings
    pub fn polling_config(&self) -> PollingConfig {
        PollingConfig {
            interval_ms: self.polling.interval_ms,
            jitter_fraction: self.polling.jitter_fraction,
        }
    }

    /// Draft used by the write-capability probe
    pub fn probe_draft(&self) -> NoteDraft {
        NoteDraft::capability_probe(&self.monitor.probe_deck, &self.monitor.probe_model)
    }
}

/// Current environment from `CARDBRIDGE_ENV`, then `APP_ENV`
pub fn detect_environment() -> String {
    std::env::var("CARDBRIDGE_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn read_yaml(path: &Path) -> Result<Option<YamlValue>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| BridgeError::Configuration(format!("{}: {e}", path.display())))?;
    let value = serde_yaml::from_str(&text)
        .map_err(|e| BridgeError::Configuration(format!("{}: {e}", path.display())))?;
    Ok(Some(value))
}

/// Deep merge: overlay mappings win key-by-key, everything else replaces
fn merge_yaml(base: YamlValue, overlay: YamlValue) -> YamlValue {
    match (base, overlay) {
        (YamlValue::Mapping(mut base), YamlValue::Mapping(overlay)) => {
            for (key, overlay_value) in overlay {
                let merged = match base.remove(&key) {
                    Some(base_value) => merge_yaml(base_value, overlay_value),
                    None => overlay_value,
                };
                base.insert(key, merged);
            }
            YamlValue::Mapping(base)
        }
        (_, overlay) => overlay,
    }
}
