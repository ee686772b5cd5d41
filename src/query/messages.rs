use serde::{Deserialize, Serialize};

/// Body of `POST /api/voice`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceQueryRequest {
    pub text: String,
}

/// Body returned by `/api/voice`. Every field is optional; a present `error`
/// marks a downstream failure even when the HTTP call succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceQueryResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    /// Matching catalogue records, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
