use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::controller::{QueryRequest, ToggleOutcome, TurnId, VoiceSessionController};
use super::snapshot::Snapshot;
use crate::query::{QueryError, QueryService, VoiceQueryResponse};
use crate::recognition::{RecognitionEvent, RecognitionEventReceiver};

/// Returned by handle operations once the session task has exited
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("voice session has shut down")]
pub struct SessionClosed;

enum Command {
    Toggle(oneshot::Sender<ToggleOutcome>),
    Shutdown,
}

struct QueryCompletion {
    turn: TurnId,
    outcome: Result<VoiceQueryResponse, QueryError>,
}

enum Step {
    Command(Option<Command>),
    Recognition(RecognitionEvent),
    Completed(QueryCompletion),
}

/// Drives a [`VoiceSessionController`] on a single task.
///
/// Handle commands, recognizer events and query completions are applied one
/// at a time in arrival order. Queries run on their own tasks so the loop
/// stays responsive while one is in flight.
pub struct VoiceSession {
    controller: VoiceSessionController,
    query: Arc<dyn QueryService>,
    query_timeout: Duration,
    events: RecognitionEventReceiver,
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::UnboundedSender<QueryCompletion>,
    completions: mpsc::UnboundedReceiver<QueryCompletion>,
    state_tx: watch::Sender<Snapshot>,
}

impl VoiceSession {
    /// Wire a controller to its recognizer events and query service
    pub fn new(
        controller: VoiceSessionController,
        query: Arc<dyn QueryService>,
        query_timeout: Duration,
        events: RecognitionEventReceiver,
    ) -> (Self, VoiceSessionHandle) {
        let (commands_tx, commands) = mpsc::channel(32);
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(controller.snapshot());

        let session = Self {
            controller,
            query,
            query_timeout,
            events,
            commands,
            completions_tx,
            completions,
            state_tx,
        };

        let handle = VoiceSessionHandle {
            commands: commands_tx,
            state: state_rx,
        };

        (session, handle)
    }

    /// Run the session on a new tokio task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process inputs until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        info!(controller = %self.controller.id(), "Voice session loop started");

        loop {
            let step = tokio::select! {
                command = self.commands.recv() => Step::Command(command),
                Some(event) = self.events.recv() => Step::Recognition(event),
                Some(done) = self.completions.recv() => Step::Completed(done),
            };

            match step {
                Step::Command(Some(Command::Toggle(reply))) => {
                    let outcome = self.controller.toggle().await;
                    debug!("Toggle -> {}", outcome.as_str());
                    // Callers read the new turn right after the reply
                    self.state_tx.send_replace(self.controller.snapshot());
                    let _ = reply.send(outcome);
                }
                Step::Command(Some(Command::Shutdown)) | Step::Command(None) => break,
                Step::Recognition(event) => {
                    if let Some(request) = self.controller.handle_event(event) {
                        self.dispatch(request);
                    }
                }
                Step::Completed(done) => {
                    self.controller.settle_query(done.turn, done.outcome);
                }
            }

            self.state_tx.send_replace(self.controller.snapshot());
        }

        self.controller.stop().await;
        info!(controller = %self.controller.id(), "Voice session loop stopped");
    }

    fn dispatch(&self, request: QueryRequest) {
        let query = Arc::clone(&self.query);
        let completions = self.completions_tx.clone();
        let timeout = self.query_timeout;

        info!("Turn {}: querying for \"{}\"", request.turn, request.text);

        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, query.ask(&request.text)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(QueryError::Timeout(timeout)),
            };

            let _ = completions.send(QueryCompletion {
                turn: request.turn,
                outcome,
            });
        });
    }
}

/// Presentation surface of a running [`VoiceSession`]: a read-only snapshot
/// and the toggle command.
#[derive(Clone)]
pub struct VoiceSessionHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<Snapshot>,
}

impl VoiceSessionHandle {
    pub async fn toggle(&self) -> Result<ToggleOutcome, SessionClosed> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::Toggle(reply))
            .await
            .map_err(|_| SessionClosed)?;
        outcome.await.map_err(|_| SessionClosed)
    }

    /// Latest published state
    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified on every published state
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.clone()
    }

    /// Wait until a published state satisfies `predicate`
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&Snapshot) -> bool,
    ) -> Result<Snapshot, SessionClosed> {
        let mut state = self.state.clone();
        let snapshot = state
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| SessionClosed)?;
        Ok(snapshot.clone())
    }

    /// Ask the session loop to stop. Idempotent.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }
}
