//! # Structured Logging
//!
//! Environment-aware tracing setup: human-readable console output plus a
//! JSON file per process for debugging probe cycles after the fact. The
//! desktop helper embeds this crate, so initialization must tolerate a host
//! that already installed a global subscriber.

use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::detect_environment;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize logging once for the process
///
/// Console and file layers share an environment-derived level filter,
/// overridable through `RUST_LOG`. Re-invocation and an already-installed
/// subscriber are both harmless.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = detect_environment();
        let log_level = default_log_level(&environment);

        let log_dir = PathBuf::from("log");
        if !log_dir.exists() && fs::create_dir_all(&log_dir).is_err() {
            // Fall back to console-only logging below
        }

        let pid = process::id();
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let file_appender = tracing_appender::rolling::never(
            &log_dir,
            format!("{environment}.{pid}.{timestamp}.log"),
        );
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

        let filter = |level: &str| {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
        };

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_filter(filter(&log_level)),
            )
            .with(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_target(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(filter(&log_level)),
            );

        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already installed, keeping it");
        }

        tracing::info!(
            pid,
            environment = %environment,
            "Structured logging initialized"
        );

        // The non-blocking writer stops on guard drop; logging lives for the
        // process, so leak it
        std::mem::forget(guard);
    });
}

/// Default log level per environment, pre-RUST_LOG override
fn default_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}
