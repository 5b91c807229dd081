//! # Automation Protocol Layer
//!
//! Client for the flashcard application's local HTTP automation endpoint.
//! Every call is a POST of `{ action, version, params }` returning
//! `{ result, error }`; the four health probes and all note/deck operations
//! ride this protocol.

pub mod client;
pub mod protocol;
pub mod submitter;

pub use client::{AutomationClient, AutomationClientConfig, AutomationError};
pub use protocol::{AutomationRequest, AutomationResponse, NoteDraft};
pub use submitter::NoteSubmitter;
