use crate::session::VoiceSessionHandle;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Presentation surface of the running voice session
    pub session: VoiceSessionHandle,
}

impl AppState {
    pub fn new(session: VoiceSessionHandle) -> Self {
        Self { session }
    }
}
