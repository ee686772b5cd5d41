//! Shared test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use itshop_voice::recognition::{event_channel, RecognitionConfig, TextRecognizer};
use itshop_voice::{
    QueryError, QueryService, Snapshot, StatusMessages, UtteranceFeeder, VoiceQueryResponse,
    VoiceSession, VoiceSessionController, VoiceSessionHandle,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Scripted reply for one query
pub enum Reply {
    Answer(VoiceQueryResponse),
    After(Duration, VoiceQueryResponse),
    Fail(QueryError),
    Hang,
}

/// Query service that replays a script and records what it was asked
#[derive(Default)]
pub struct ScriptedQuery {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedQuery {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl QueryService for ScriptedQuery {
    async fn ask(&self, text: &str) -> Result<VoiceQueryResponse, QueryError> {
        self.calls.lock().expect("calls lock").push(text.to_string());
        let reply = self.replies.lock().expect("replies lock").pop_front();

        match reply {
            Some(Reply::Answer(response)) => Ok(response),
            Some(Reply::After(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Some(Reply::Fail(e)) => Err(e),
            Some(Reply::Hang) => std::future::pending().await,
            None => Ok(answer(text, "ok")),
        }
    }
}

/// Response carrying a transcript and an answer
pub fn answer(transcript: &str, answer: &str) -> VoiceQueryResponse {
    VoiceQueryResponse {
        transcript: Some(transcript.to_string()),
        answer: Some(answer.to_string()),
        ..VoiceQueryResponse::default()
    }
}

/// Response carrying a downstream error
pub fn downstream_error(error: &str) -> VoiceQueryResponse {
    VoiceQueryResponse {
        error: Some(error.to_string()),
        ..VoiceQueryResponse::default()
    }
}

pub struct TestSession {
    pub handle: VoiceSessionHandle,
    pub feeder: Option<UtteranceFeeder>,
    pub task: JoinHandle<()>,
}

impl TestSession {
    pub fn feeder(&self) -> &UtteranceFeeder {
        self.feeder.as_ref().expect("text session has a feeder")
    }

    /// Wait (bounded) until a published snapshot satisfies `predicate`
    pub async fn wait(&self, predicate: impl FnMut(&Snapshot) -> bool) -> Snapshot {
        tokio::time::timeout(Duration::from_secs(5), self.handle.wait_for(predicate))
            .await
            .expect("state reached in time")
            .expect("session still running")
    }

    pub async fn wait_settled(&self, turn: u64) -> Snapshot {
        self.wait(|snapshot| snapshot.turn_settled(turn)).await
    }
}

pub fn recognition_config(no_speech_timeout: Duration) -> RecognitionConfig {
    RecognitionConfig {
        no_speech_timeout,
        ..RecognitionConfig::default()
    }
}

/// Spawn a session backed by a text recognizer
pub fn text_session(query: Arc<ScriptedQuery>, query_timeout: Duration) -> TestSession {
    text_session_with(query, query_timeout, Duration::from_secs(5))
}

pub fn text_session_with(
    query: Arc<ScriptedQuery>,
    query_timeout: Duration,
    no_speech_timeout: Duration,
) -> TestSession {
    let (events_tx, events_rx) = event_channel();
    let (recognizer, feeder) =
        TextRecognizer::new(recognition_config(no_speech_timeout), events_tx);

    let controller =
        VoiceSessionController::new(Some(Box::new(recognizer)), StatusMessages::default());
    let (session, handle) = VoiceSession::new(controller, query, query_timeout, events_rx);

    TestSession {
        handle,
        feeder: Some(feeder),
        task: session.spawn(),
    }
}

/// Spawn a session on a host without speech recognition
pub fn unsupported_session(query: Arc<ScriptedQuery>) -> TestSession {
    let (_events_tx, events_rx) = event_channel();
    let controller = VoiceSessionController::new(None, StatusMessages::default());
    let (session, handle) =
        VoiceSession::new(controller, query, Duration::from_secs(1), events_rx);

    TestSession {
        handle,
        feeder: None,
        task: session.spawn(),
    }
}
