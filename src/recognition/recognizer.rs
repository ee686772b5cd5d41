use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

use super::text::{TextRecognizer, UtteranceFeeder};

/// Event emitted by a speech recognizer over the lifetime of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// The recognizer confirmed the session is capturing
    Started,
    /// A final utterance was recognized
    Result(String),
    /// The session failed with a recognizer error code (e.g. "not-allowed")
    Error(String),
    /// The session closed
    End,
}

/// Sending half handed to a recognizer at acquisition
pub type RecognitionEventSender = mpsc::UnboundedSender<RecognitionEvent>;

/// Receiving half drained by the session runtime
pub type RecognitionEventReceiver = mpsc::UnboundedReceiver<RecognitionEvent>;

/// Create the event channel shared by a recognizer and its controller
pub fn event_channel() -> (RecognitionEventSender, RecognitionEventReceiver) {
    mpsc::unbounded_channel()
}

/// Configuration applied to a recognizer when it is acquired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// BCP 47 language tag
    pub lang: String,

    /// Number of alternatives requested per utterance
    pub max_alternatives: u32,

    /// Whether interim (partial) results are reported
    pub interim_results: bool,

    /// How long a session waits for speech before reporting "no-speech"
    pub no_speech_timeout: Duration,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            lang: "th-TH".to_string(),
            max_alternatives: 1,
            interim_results: false,
            no_speech_timeout: Duration::from_secs(8),
        }
    }
}

/// Errors reported synchronously by `start()` / `stop()`
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecognizerError {
    #[error("recognition has already started")]
    AlreadyStarted,

    #[error("recognizer is busy: {0}")]
    Busy(String),

    #[error("recognizer failure: {0}")]
    Other(String),
}

/// Speech recognition capability
///
/// Implementations report session progress through the event sender they
/// were given at acquisition. At most one session may be active; `start()`
/// on an active recognizer must fail with [`RecognizerError::AlreadyStarted`].
#[async_trait]
pub trait SpeechRecognizer: Send {
    /// Request a new session. `Started` is emitted once capture begins.
    async fn start(&mut self) -> Result<(), RecognizerError>;

    /// Request termination of the active session. `End` follows.
    async fn stop(&mut self) -> Result<(), RecognizerError>;

    /// Whether a session is currently open
    fn is_active(&self) -> bool;

    /// Recognizer name for logging
    fn name(&self) -> &str;
}

/// Where the host environment gets its speech capability from
#[derive(Debug, Clone)]
pub enum RecognizerSource {
    /// Utterances pushed as text (terminal input, scripted turns)
    Text,
    /// No speech capability available on this host
    Unavailable,
}

/// Capability acquired from the host
pub struct AcquiredRecognizer {
    pub recognizer: Box<dyn SpeechRecognizer>,
    /// Present for text-fed recognizers
    pub feeder: Option<UtteranceFeeder>,
}

/// Recognizer factory
pub struct RecognizerFactory;

impl RecognizerFactory {
    /// Acquire a recognizer for the given source.
    ///
    /// Returns `None` when the host offers no capability, which callers treat
    /// as a permanent unsupported condition.
    pub fn acquire(
        source: RecognizerSource,
        config: RecognitionConfig,
        events: RecognitionEventSender,
    ) -> Option<AcquiredRecognizer> {
        match source {
            RecognizerSource::Text => {
                let (recognizer, feeder) = TextRecognizer::new(config, events);
                Some(AcquiredRecognizer {
                    recognizer: Box::new(recognizer),
                    feeder: Some(feeder),
                })
            }
            RecognizerSource::Unavailable => None,
        }
    }
}
