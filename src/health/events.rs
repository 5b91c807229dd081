//! # Health Event Broadcast
//!
//! Fan-out of begin/end check events to any number of observing UI surfaces.
//! Delivery is best-effort: publishing with no subscribers succeeds, and a
//! slow or dropped subscriber only affects its own receiver (it lags or
//! closes), never the orchestrator.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use super::report::{CheckKind, CheckStatus};
use crate::constants::EVENT_CHANNEL_CAPACITY;

/// One state transition in a check's lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// A probe run (or skip record) has started
    BeginCheck {
        kind: CheckKind,
        started_at: DateTime<Utc>,
    },
    /// A check settled into a terminal status
    EndCheck {
        kind: CheckKind,
        status: CheckStatus,
        detail: Option<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    },
}

impl HealthEvent {
    /// Identity of the check this event concerns
    pub fn kind(&self) -> CheckKind {
        match self {
            HealthEvent::BeginCheck { kind, .. } | HealthEvent::EndCheck { kind, .. } => *kind,
        }
    }
}

/// Broadcast publisher for health events
#[derive(Debug, Clone)]
pub struct HealthEventPublisher {
    sender: broadcast::Sender<HealthEvent>,
}

impl HealthEventPublisher {
    /// Create a publisher with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers, fire-and-forget
    pub fn publish(&self, event: HealthEvent) {
        // send() errors only when no receiver exists, which is a normal
        // condition here (e.g. all observer windows closed)
        let _ = self.sender.send(event);
    }

    /// Subscribe a new observer surface
    pub fn subscribe(&self) -> broadcast::Receiver<HealthEvent> {
        self.sender.subscribe()
    }

    /// Number of currently attached observers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for HealthEventPublisher {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}
