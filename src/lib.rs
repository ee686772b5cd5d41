pub mod config;
pub mod http;
pub mod query;
pub mod recognition;
pub mod session;

pub use config::Config;
pub use http::{create_router, AppState};
pub use query::{HttpQueryClient, QueryError, QueryService, VoiceQueryRequest, VoiceQueryResponse};
pub use recognition::{
    event_channel, RecognitionConfig, RecognitionEvent, RecognizerError, RecognizerFactory,
    RecognizerSource, SpeechRecognizer, TextRecognizer, UtteranceFeeder,
};
pub use session::{
    InteractionResult, Phase, Snapshot, StartOutcome, Status, StatusMessages, StopOutcome,
    ToggleOutcome, VoiceSession, VoiceSessionController, VoiceSessionHandle,
};
