//! # Automation Wire Protocol
//!
//! Envelope types for the local automation endpoint. Every call is an HTTP
//! POST with a JSON body `{ action, version, params }`; every reply is
//! `{ result, error }` where exactly one side is expected to be populated.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::protocol;

/// Outgoing request envelope
#[derive(Debug, Clone, Serialize)]
pub struct AutomationRequest {
    /// Action name, see [`crate::constants::actions`]
    pub action: String,
    /// Protocol version the client speaks
    pub version: u32,
    /// Action-specific parameters
    pub params: serde_json::Value,
}

impl AutomationRequest {
    /// Build a request for `action` with the given parameters
    pub fn new(action: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            action: action.into(),
            version: protocol::CLIENT_VERSION,
            params,
        }
    }

    /// Build a request for an action that takes no parameters
    pub fn bare(action: impl Into<String>) -> Self {
        Self::new(action, serde_json::json!({}))
    }
}

/// Incoming response envelope
///
/// The endpoint reports failures in-band through `error`; HTTP status is 200
/// even for rejected actions. `result` may legitimately be `null` for
/// fire-and-forget actions, so absence of a result is not itself an error.
#[derive(Debug, Clone, Deserialize)]
pub struct AutomationResponse<T> {
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A flashcard draft ready for submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    /// Destination deck name
    pub deck: String,
    /// Note type (model) name
    pub model: String,
    /// Field name to field content
    pub fields: HashMap<String, String>,
    /// Tags applied to the note
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NoteDraft {
    /// Wire shape expected by the endpoint's note actions
    pub fn to_params(&self) -> serde_json::Value {
        serde_json::json!({
            "note": {
                "deckName": self.deck,
                "modelName": self.model,
                "fields": self.fields,
                "tags": self.tags,
            }
        })
    }

    /// Minimal draft used by the side-effect-free write-capability probe
    pub fn capability_probe(deck: impl Into<String>, model: impl Into<String>) -> Self {
        let mut fields = HashMap::new();
        fields.insert("Front".to_string(), "cardbridge-capability-probe".to_string());
        fields.insert("Back".to_string(), String::new());
        Self {
            deck: deck.into(),
            model: model.into(),
            fields,
            tags: vec!["cardbridge-probe".to_string()],
        }
    }
}
