use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info};

use super::recognizer::{
    RecognitionConfig, RecognitionEvent, RecognitionEventSender, RecognizerError,
    SpeechRecognizer,
};

/// Error code reported when a session hears nothing
pub const NO_SPEECH: &str = "no-speech";

/// Error code reported when the utterance source has gone away
pub const AUDIO_CAPTURE: &str = "audio-capture";

/// Pushes utterances into a [`TextRecognizer`]
#[derive(Debug, Clone)]
pub struct UtteranceFeeder {
    tx: mpsc::UnboundedSender<String>,
}

impl UtteranceFeeder {
    /// Queue an utterance. It is consumed by the next (or current) session.
    pub fn say(&self, text: impl Into<String>) -> Result<(), RecognizerError> {
        self.tx
            .send(text.into())
            .map_err(|_| RecognizerError::Other("recognizer has been dropped".to_string()))
    }
}

enum Heard {
    Utterance(String),
    NoSpeech,
    SourceClosed,
    Stopped,
}

/// Recognizer fed with text instead of audio.
///
/// Each session consumes exactly one utterance, mirroring a non-continuous
/// recognizer with interim results disabled.
pub struct TextRecognizer {
    config: RecognitionConfig,
    events: RecognitionEventSender,
    utterances: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
    active: Arc<AtomicBool>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl TextRecognizer {
    pub fn new(config: RecognitionConfig, events: RecognitionEventSender) -> (Self, UtteranceFeeder) {
        info!(
            "Text recognizer ready (lang={}, alternatives={}, interim={})",
            config.lang, config.max_alternatives, config.interim_results
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let recognizer = Self {
            config,
            events,
            utterances: Arc::new(Mutex::new(rx)),
            active: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
        };

        (recognizer, UtteranceFeeder { tx })
    }
}

#[async_trait]
impl SpeechRecognizer for TextRecognizer {
    async fn start(&mut self) -> Result<(), RecognizerError> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(RecognizerError::AlreadyStarted);
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        self.stop_tx = Some(stop_tx);

        let events = self.events.clone();
        let utterances = Arc::clone(&self.utterances);
        let active = Arc::clone(&self.active);
        let no_speech_timeout = self.config.no_speech_timeout;

        tokio::spawn(async move {
            let _ = events.send(RecognitionEvent::Started);

            let heard = {
                let mut rx = utterances.lock().await;
                tokio::select! {
                    _ = stop_rx => Heard::Stopped,
                    next = tokio::time::timeout(no_speech_timeout, rx.recv()) => match next {
                        Ok(Some(text)) => Heard::Utterance(text),
                        Ok(None) => Heard::SourceClosed,
                        Err(_) => Heard::NoSpeech,
                    },
                }
            };

            match heard {
                Heard::Utterance(text) if !text.trim().is_empty() => {
                    debug!("Heard utterance: {}", text.trim());
                    let _ = events.send(RecognitionEvent::Result(text.trim().to_string()));
                }
                Heard::Utterance(_) | Heard::NoSpeech => {
                    let _ = events.send(RecognitionEvent::Error(NO_SPEECH.to_string()));
                }
                Heard::SourceClosed => {
                    let _ = events.send(RecognitionEvent::Error(AUDIO_CAPTURE.to_string()));
                }
                Heard::Stopped => debug!("Session stopped before speech"),
            }

            active.store(false, Ordering::SeqCst);
            let _ = events.send(RecognitionEvent::End);
        });

        Ok(())
    }

    async fn stop(&mut self) -> Result<(), RecognizerError> {
        if !self.active.load(Ordering::SeqCst) {
            return Ok(());
        }

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "text"
    }
}
