use serde::{Deserialize, Serialize};

use crate::query::VoiceQueryResponse;

/// Latest outcome of a voice turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionResult {
    /// What the recognizer heard
    pub transcript: Option<String>,

    /// Answer from the query service
    pub answer: Option<String>,

    /// Records the answer was built from, in service order
    pub matches: Option<Vec<serde_json::Value>>,

    /// Recognition, downstream or transport failure for this turn
    pub error: Option<String>,
}

impl InteractionResult {
    pub fn transcript_only(transcript: impl Into<String>) -> Self {
        Self {
            transcript: Some(transcript.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl From<VoiceQueryResponse> for InteractionResult {
    fn from(response: VoiceQueryResponse) -> Self {
        Self {
            transcript: response.transcript,
            answer: response.answer,
            matches: response.matches,
            error: response.error,
        }
    }
}
