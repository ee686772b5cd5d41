//! Speech recognition capability
//!
//! The controller never implements recognition itself. It talks to a
//! [`SpeechRecognizer`] acquired from the host through [`RecognizerFactory`];
//! session progress flows back as [`RecognitionEvent`]s on an mpsc channel.

mod recognizer;
mod text;

pub use recognizer::{
    event_channel, AcquiredRecognizer, RecognitionConfig, RecognitionEvent,
    RecognitionEventReceiver, RecognitionEventSender, RecognizerError, RecognizerFactory,
    RecognizerSource, SpeechRecognizer,
};
pub use text::{TextRecognizer, UtteranceFeeder, AUDIO_CAPTURE, NO_SPEECH};
