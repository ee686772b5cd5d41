//! Voice session management
//!
//! This module provides the `VoiceSessionController` state machine and the
//! runtime around it:
//! - Recognition lifecycle (start, stop, start confirmation, end)
//! - One query per recognized utterance, tagged with its turn
//! - Status and result reconciliation, with stale responses discarded
//! - A single observable snapshot plus the toggle command for renderers

mod controller;
mod result;
mod runtime;
mod snapshot;
mod status;

pub use controller::{
    QueryRequest, Settlement, StartOutcome, StopOutcome, ToggleOutcome, TurnId,
    VoiceSessionController,
};
pub use result::InteractionResult;
pub use runtime::{SessionClosed, VoiceSession, VoiceSessionHandle};
pub use snapshot::Snapshot;
pub use status::{Phase, Status, StatusMessages};
