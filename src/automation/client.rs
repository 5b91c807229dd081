//! # Automation API Client
//!
//! HTTP client for the locally running flashcard application's automation
//! endpoint. All traffic is POSTs of [`AutomationRequest`] envelopes to a
//! single URL; failures the endpoint reports in-band surface as
//! [`AutomationError::Service`].
//!
//! Every request carries the client-wide timeout so that no probe or write
//! path can hang past its budget, and reqwest drops the connection on every
//! exit path (success, error, timeout).

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::protocol::{AutomationRequest, AutomationResponse, NoteDraft};
use crate::constants::{actions, endpoint};

/// Configuration for the automation API client
#[derive(Debug, Clone)]
pub struct AutomationClientConfig {
    /// URL of the automation endpoint (e.g. `http://127.0.0.1:8765`)
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for AutomationClientConfig {
    fn default() -> Self {
        Self {
            base_url: endpoint::DEFAULT_BASE_URL.to_string(),
            timeout_ms: endpoint::DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Errors from automation endpoint calls
#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    /// Request timed out before the endpoint answered
    #[error("Automation endpoint did not answer within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection-level failure (refused, reset, DNS, TLS)
    #[error("Could not reach automation endpoint: {0}")]
    Transport(String),

    /// Endpoint answered but the body was not a valid response envelope
    #[error("Malformed automation response: {0}")]
    Malformed(String),

    /// Endpoint processed the request and reported an error in-band
    #[error("Automation endpoint rejected the request: {0}")]
    Service(String),

    /// Client could not be constructed from its configuration
    #[error("Automation client configuration error: {0}")]
    Configuration(String),
}

/// HTTP client for the local automation endpoint
#[derive(Debug, Clone)]
pub struct AutomationClient {
    http: Client,
    config: AutomationClientConfig,
}

impl AutomationClient {
    /// Create a client with the given configuration
    pub fn new(config: AutomationClientConfig) -> Result<Self, AutomationError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AutomationError::Configuration(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Create a client with default local-endpoint settings
    pub fn with_defaults() -> Result<Self, AutomationError> {
        Self::new(AutomationClientConfig::default())
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Configured request timeout in milliseconds
    pub fn timeout_ms(&self) -> u64 {
        self.config.timeout_ms
    }

    /// Issue one automation call and unwrap the response envelope
    ///
    /// Returns the `result` side of the envelope; `None` is a legitimate
    /// outcome for actions that return nothing.
    pub async fn invoke<T: DeserializeOwned>(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, AutomationError> {
        let request = AutomationRequest::new(action, params);

        debug!(action = %request.action, version = request.version, "Invoking automation action");

        let response = self
            .http
            .post(&self.config.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AutomationError::Transport(format!(
                "endpoint returned HTTP {status}"
            )));
        }

        let envelope: AutomationResponse<T> = response
            .json()
            .await
            .map_err(|e| AutomationError::Malformed(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(AutomationError::Service(error));
        }

        Ok(envelope.result)
    }

    /// Reachability check: any well-formed JSON answer counts, including one
    /// whose envelope carries an in-band error
    pub async fn reachability(&self) -> Result<(), AutomationError> {
        let response = self
            .http
            .post(&self.config.base_url)
            .json(&AutomationRequest::bare(actions::VERSION))
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        response
            .json::<serde_json::Value>()
            .await
            .map(|_| ())
            .map_err(|e| AutomationError::Malformed(e.to_string()))
    }

    /// Ask the endpoint for its declared protocol version
    pub async fn version(&self) -> Result<u32, AutomationError> {
        self.invoke::<u32>(actions::VERSION, serde_json::json!({}))
            .await?
            .ok_or_else(|| AutomationError::Malformed("no version in response".to_string()))
    }

    /// Dry-run validation of a note draft; commits nothing
    pub async fn can_add_note(&self, draft: &NoteDraft) -> Result<bool, AutomationError> {
        self.invoke::<bool>(actions::CAN_ADD_NOTE, draft.to_params())
            .await?
            .ok_or_else(|| {
                AutomationError::Malformed("no verdict in canAddNote response".to_string())
            })
    }

    /// Add a note, returning its identifier
    pub async fn add_note(&self, draft: &NoteDraft) -> Result<u64, AutomationError> {
        self.invoke::<u64>(actions::ADD_NOTE, draft.to_params())
            .await?
            .ok_or_else(|| AutomationError::Malformed("no note id in response".to_string()))
    }

    /// Create a deck; succeeds if the deck already exists
    pub async fn create_deck(&self, name: &str) -> Result<(), AutomationError> {
        self.invoke::<serde_json::Value>(
            actions::CREATE_DECK,
            serde_json::json!({ "deck": name }),
        )
        .await
        .map(|_| ())
    }

    /// List the names of all decks
    pub async fn deck_names(&self) -> Result<Vec<String>, AutomationError> {
        self.invoke::<Vec<String>>(actions::DECK_NAMES, serde_json::json!({}))
            .await?
            .ok_or_else(|| AutomationError::Malformed("no deck list in response".to_string()))
    }

    fn classify_send_error(&self, error: reqwest::Error) -> AutomationError {
        if error.is_timeout() {
            AutomationError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }
        } else {
            AutomationError::Transport(error.to_string())
        }
    }
}
