//! # Crate Error Surface
//!
//! Top-level error type aggregating the module-specific errors. Modules keep
//! their own thiserror enums; this is the boundary callers match on.

use crate::automation::AutomationError;
use crate::health::GateError;

/// Errors surfaced by the CardBridge core
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Automation endpoint call failed
    #[error(transparent)]
    Automation(#[from] AutomationError),

    /// Health gate rejected the operation; message is user-displayable
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
