//! # Gated Write Path
//!
//! [`NoteSubmitter`] is the write-path collaborator surface: every
//! side-effecting automation call goes through the health gate first, so a
//! down or still-starting endpoint surfaces as an actionable message instead
//! of a hung or cryptic request failure.

use tracing::info;

use super::client::AutomationClient;
use super::protocol::NoteDraft;
use crate::error::Result;
use crate::health::{GateOptions, HealthMonitor};

/// Submits drafts and deck operations through the health gate
#[derive(Debug, Clone)]
pub struct NoteSubmitter {
    client: AutomationClient,
    monitor: HealthMonitor,
    gate_options: GateOptions,
}

impl NoteSubmitter {
    pub fn new(client: AutomationClient, monitor: HealthMonitor) -> Self {
        Self {
            client,
            monitor,
            gate_options: GateOptions::default(),
        }
    }

    /// Override the gate options used for every submission
    pub fn with_gate_options(mut self, options: GateOptions) -> Self {
        self.gate_options = options;
        self
    }

    /// Submit a note draft, returning the created note's identifier
    pub async fn submit_note(&self, draft: &NoteDraft) -> Result<u64> {
        self.monitor.ensure_healthy(self.gate_options).await?;
        let note_id = self.client.add_note(draft).await?;
        info!(note_id, deck = %draft.deck, "Note submitted");
        Ok(note_id)
    }

    /// Create a deck; succeeds if it already exists
    pub async fn create_deck(&self, name: &str) -> Result<()> {
        self.monitor.ensure_healthy(self.gate_options).await?;
        self.client.create_deck(name).await?;
        info!(deck = %name, "Deck created");
        Ok(())
    }

    /// List deck names for the capture UI's deck picker
    pub async fn deck_names(&self) -> Result<Vec<String>> {
        self.monitor.ensure_healthy(self.gate_options).await?;
        Ok(self.client.deck_names().await?)
    }
}
