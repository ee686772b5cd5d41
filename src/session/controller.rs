use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::result::InteractionResult;
use super::snapshot::Snapshot;
use super::status::{Phase, Status, StatusMessages};
use crate::query::{QueryError, VoiceQueryResponse};
use crate::recognition::{RecognitionEvent, RecognizerError, SpeechRecognizer};

/// Identifier of one voice turn. Turn 0 means no turn has started yet.
pub type TurnId = u64;

/// Outcome of asking the recognizer to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The recognizer accepted the request; a new turn was opened
    Started,
    /// A session is already open or being opened
    AlreadyActive,
    /// No capability on this host
    Unsupported,
    /// The recognizer refused for another reason
    Failed(String),
}

/// Outcome of asking the recognizer to stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// Termination requested; the end event will follow
    Stopping,
    /// No session was open, nothing changed
    NotActive,
    Failed(String),
}

/// Outcome of the single user-facing toggle command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Start(StartOutcome),
    Stop(StopOutcome),
}

impl ToggleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleOutcome::Start(StartOutcome::Started) => "started",
            ToggleOutcome::Start(StartOutcome::AlreadyActive) => "already_active",
            ToggleOutcome::Start(StartOutcome::Unsupported) => "unsupported",
            ToggleOutcome::Start(StartOutcome::Failed(_)) => "failed",
            ToggleOutcome::Stop(StopOutcome::Stopping) => "stopping",
            ToggleOutcome::Stop(StopOutcome::NotActive) => "not_active",
            ToggleOutcome::Stop(StopOutcome::Failed(_)) => "failed",
        }
    }

    /// Failure detail, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            ToggleOutcome::Start(StartOutcome::Failed(reason))
            | ToggleOutcome::Stop(StopOutcome::Failed(reason)) => Some(reason),
            _ => None,
        }
    }
}

/// Query the runtime must issue on behalf of a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub turn: TurnId,
    pub text: String,
}

/// What happened to a settled query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Applied,
    /// The query belonged to a turn that is no longer current, or was abandoned
    Stale,
}

/// Finite-state controller for voice turns.
///
/// Owns the recognition handle exclusively. Inputs are the `toggle`/`start`/
/// `stop` commands, recognizer events and query settlements; every input is
/// applied on the caller's timeline, one at a time.
pub struct VoiceSessionController {
    id: Uuid,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    messages: StatusMessages,
    phase: Phase,
    status: Status,
    listening: bool,
    result: InteractionResult,
    turn: TurnId,
    heard_this_turn: bool,
    pending_query: Option<TurnId>,
}

impl VoiceSessionController {
    /// Create a controller around the capability acquired from the host.
    ///
    /// `None` puts the controller in the terminal unsupported phase.
    pub fn new(recognizer: Option<Box<dyn SpeechRecognizer>>, messages: StatusMessages) -> Self {
        let id = Uuid::new_v4();

        let (phase, status) = match &recognizer {
            Some(r) => {
                info!(controller = %id, "Voice controller using recognizer '{}'", r.name());
                (Phase::Idle, Status::Ready)
            }
            None => {
                warn!(controller = %id, "No speech recognition capability, voice input disabled");
                (Phase::Unsupported, Status::Unsupported)
            }
        };

        Self {
            id,
            recognizer,
            messages,
            phase,
            status,
            listening: false,
            result: InteractionResult::default(),
            turn: 0,
            heard_this_turn: false,
            pending_query: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn status_message(&self) -> String {
        self.status.message(&self.messages)
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn result(&self) -> &InteractionResult {
        &self.result
    }

    pub fn turn(&self) -> TurnId {
        self.turn
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn has_pending_query(&self) -> bool {
        self.pending_query.is_some()
    }

    /// True while a session is open or a query for the current turn is in flight
    pub fn is_busy(&self) -> bool {
        self.listening
            || self.pending_query.is_some()
            || self.recognizer.as_ref().is_some_and(|r| r.is_active())
    }

    /// The single user-facing command: stop when listening, otherwise clear
    /// the result and start a new turn.
    pub async fn toggle(&mut self) -> ToggleOutcome {
        if self.phase == Phase::Unsupported {
            return ToggleOutcome::Start(StartOutcome::Unsupported);
        }

        if self.listening {
            ToggleOutcome::Stop(self.stop().await)
        } else {
            self.result.clear();
            ToggleOutcome::Start(self.start().await)
        }
    }

    /// Ask the recognizer for a new session.
    ///
    /// Phase and status only change once the recognizer confirms with
    /// [`RecognitionEvent::Started`].
    pub async fn start(&mut self) -> StartOutcome {
        let Some(recognizer) = self.recognizer.as_mut() else {
            return StartOutcome::Unsupported;
        };

        if self.listening {
            warn!(controller = %self.id, "Start rejected, already listening");
            return StartOutcome::AlreadyActive;
        }

        match recognizer.start().await {
            Ok(()) => {
                self.turn += 1;
                self.heard_this_turn = false;
                if let Some(stale) = self.pending_query.take() {
                    info!(controller = %self.id, "Turn {} superseded while its query was in flight", stale);
                }
                info!(controller = %self.id, "Turn {} requested recognition", self.turn);
                StartOutcome::Started
            }
            Err(RecognizerError::AlreadyStarted) => {
                warn!(controller = %self.id, "Start rejected by recognizer: session already open");
                StartOutcome::AlreadyActive
            }
            Err(e) => {
                warn!(controller = %self.id, "Failed to start recognition: {}", e);
                StartOutcome::Failed(e.to_string())
            }
        }
    }

    /// Ask the recognizer to end the open session. Safe to call at any time.
    pub async fn stop(&mut self) -> StopOutcome {
        let Some(recognizer) = self.recognizer.as_mut() else {
            return StopOutcome::NotActive;
        };

        if !self.listening && !recognizer.is_active() {
            debug!(controller = %self.id, "Stop ignored, no session open");
            return StopOutcome::NotActive;
        }

        match recognizer.stop().await {
            Ok(()) => {
                info!(controller = %self.id, "Stop requested for turn {}", self.turn);
                StopOutcome::Stopping
            }
            Err(e) => {
                warn!(controller = %self.id, "Failed to stop recognition: {}", e);
                StopOutcome::Failed(e.to_string())
            }
        }
    }

    /// Apply a recognizer event. Returns the query to issue when the event
    /// was a recognized utterance for the current turn.
    pub fn handle_event(&mut self, event: RecognitionEvent) -> Option<QueryRequest> {
        debug!(controller = %self.id, "Recognition event {:?} in phase {}", event, self.phase.label());

        if self.phase == Phase::Unsupported {
            return None;
        }

        match event {
            RecognitionEvent::Started => {
                self.listening = true;
                self.transition(Phase::Listening, Status::Listening);
                None
            }
            RecognitionEvent::Result(text) => self.on_result(text),
            RecognitionEvent::Error(code) => {
                self.listening = false;
                if let Some(abandoned) = self.pending_query.take() {
                    info!(controller = %self.id, "Abandoning query for turn {} after recognition error", abandoned);
                }
                self.result.answer = None;
                self.result.matches = None;
                self.result.error = Some(code.clone());
                self.transition(Phase::Error, Status::RecognitionError(code));
                None
            }
            RecognitionEvent::End => {
                self.listening = false;
                match self.phase {
                    Phase::Listening => self.transition(Phase::Idle, Status::Finished),
                    // Transient until the query settles
                    Phase::Thinking => self.status = Status::Finished,
                    _ => {}
                }
                None
            }
        }
    }

    fn on_result(&mut self, text: String) -> Option<QueryRequest> {
        if self.turn == 0 || self.heard_this_turn || self.phase == Phase::Error {
            warn!(controller = %self.id, "Ignoring utterance outside an open turn");
            return None;
        }

        self.heard_this_turn = true;
        self.result = InteractionResult::transcript_only(text.clone());
        self.pending_query = Some(self.turn);
        self.transition(Phase::Thinking, Status::Thinking);

        Some(QueryRequest {
            turn: self.turn,
            text,
        })
    }

    /// Apply the outcome of the query issued for `turn`.
    pub fn settle_query(
        &mut self,
        turn: TurnId,
        outcome: Result<VoiceQueryResponse, QueryError>,
    ) -> Settlement {
        if self.pending_query != Some(turn) {
            warn!(controller = %self.id, "Discarding stale response for turn {} (current turn {})", turn, self.turn);
            return Settlement::Stale;
        }
        self.pending_query = None;

        match outcome {
            Ok(response) => {
                let status = if response.error.is_some() {
                    Status::QueryError
                } else {
                    Status::ReadyForNext
                };
                self.result = response.into();
                self.transition(Phase::Ready, status);
            }
            Err(e) => {
                error!(controller = %self.id, "Query for turn {} failed: {}", turn, e);
                self.result = InteractionResult {
                    transcript: self.result.transcript.take(),
                    error: Some(e.to_string()),
                    ..InteractionResult::default()
                };
                self.transition(Phase::Ready, Status::QueryError);
            }
        }

        Settlement::Applied
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.status_message(),
            status_kind: self.status.clone(),
            phase: self.phase,
            listening: self.listening,
            turn: self.turn,
            busy: self.is_busy(),
            result: self.result.clone(),
            updated_at: Utc::now(),
        }
    }

    fn transition(&mut self, phase: Phase, status: Status) {
        if self.phase != phase {
            info!(controller = %self.id, "Turn {}: {} -> {}", self.turn, self.phase.label(), phase.label());
        }
        self.phase = phase;
        self.status = status;
    }
}
