use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::messages::{VoiceQueryRequest, VoiceQueryResponse};

/// Failures that prevent a usable response from reaching the controller
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("query service returned HTTP {0}")]
    Status(u16),

    #[error("query service returned an unreadable body: {0}")]
    MalformedResponse(String),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),
}

/// Remote service answering transcribed questions
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn ask(&self, text: &str) -> Result<VoiceQueryResponse, QueryError>;
}

/// `reqwest` client for the `/api/voice` endpoint
pub struct HttpQueryClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpQueryClient {
    /// Create a client posting to `endpoint` (a full URL, e.g.
    /// `http://localhost:3000/api/voice`)
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, QueryError> {
        let endpoint = endpoint.into();
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        debug!("Query client targeting {}", endpoint);

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QueryService for HttpQueryClient {
    async fn ask(&self, text: &str) -> Result<VoiceQueryResponse, QueryError> {
        debug!("POST {} ({} chars)", self.endpoint, text.chars().count());

        let response = self
            .client
            .post(&self.endpoint)
            .json(&VoiceQueryRequest {
                text: text.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<VoiceQueryResponse>(&body) {
            Ok(parsed) => {
                if !status.is_success() {
                    warn!("Query service answered HTTP {} with a readable body", status);
                }
                Ok(parsed)
            }
            Err(_) if !status.is_success() => Err(QueryError::Status(status.as_u16())),
            Err(e) => Err(QueryError::MalformedResponse(e.to_string())),
        }
    }
}
