//! Session controller: the stateful orchestrator.
//!
//! One controller owns one session: one active uploaded document plus its
//! transcript. All transcript mutation happens here, guarded by the phase
//! machine; backends are injected seams and the presentation layer only
//! consumes the read surface and the event stream.

use super::event::SessionEvent;
use super::message::Message;
use super::model::{ContentPart, FileReference, Role, Turn};
use super::phase::SessionPhase;
use super::transcript::Transcript;
use super::uploader::UploadGateway;
use crate::backend::{CompletionBackend, StorageBackend};
use crate::config::SessionConfig;
use crate::error::{CompletionError, SessionError};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;

/// The only MIME type the session accepts.
pub const ACCEPTED_MIME: &str = "application/pdf";

/// Capacity of the event channel; slow subscribers lag, they never block
/// the session.
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct SessionState {
    phase: SessionPhase,
    transcript: Transcript,
    messages: Vec<Message>,
    file: Option<FileReference>,
}

/// Orchestrates uploads and completions for a single session.
///
/// Concurrency model: at most one network operation is in flight per
/// session. Mutating calls that arrive while the session is `Uploading`
/// or `AwaitingCompletion` are rejected with [`SessionError::Busy`],
/// never queued; interleaved completions against a shared, mutating
/// transcript would corrupt turn ordering.
///
/// Backend failures are not returned to the caller: they are converted
/// into a visible MODEL-role transcript entry, and the session returns to
/// an actionable phase. The conversation itself is the error channel.
pub struct SessionController {
    config: SessionConfig,
    storage: Arc<dyn StorageBackend>,
    completion: Arc<dyn CompletionBackend>,
    state: RwLock<SessionState>,
    cancel: RwLock<CancellationToken>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    /// Creates a controller with injected backends.
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        completion: Arc<dyn CompletionBackend>,
        config: SessionConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            storage,
            completion,
            state: RwLock::new(SessionState::default()),
            cancel: RwLock::new(CancellationToken::new()),
            events,
        }
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Returns the current lifecycle phase.
    pub async fn phase(&self) -> SessionPhase {
        self.state.read().await.phase
    }

    /// Returns the ordered message projections of the transcript.
    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.messages.clone()
    }

    /// Returns the number of transcript turns.
    pub async fn transcript_len(&self) -> usize {
        self.state.read().await.transcript.len()
    }

    /// Returns the active file reference, if a document was processed.
    pub async fn file_reference(&self) -> Option<FileReference> {
        self.state.read().await.file.clone()
    }

    /// Abandons the in-flight operation, if any.
    ///
    /// The suspension point observes the token, surfaces a cancellation
    /// message in the transcript, and the session returns to an
    /// actionable phase. A fresh token is armed for the next operation,
    /// so cancelling an idle session is a no-op.
    pub async fn cancel(&self) {
        self.cancel.read().await.cancel();
    }

    /// Uploads a new document and seeds the conversation with it.
    ///
    /// Any previously uploaded document and its transcript are discarded
    /// wholesale; the session holds a single active document. On upload
    /// failure the session returns to `ReadyIdle` with no file reference;
    /// on completion failure after a successful upload the file reference
    /// is retained so a transient error does not force a re-upload.
    pub async fn submit_file(
        &self,
        bytes: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> Result<(), SessionError> {
        {
            let mut state = self.state.write().await;
            if state.phase.is_busy() {
                return Err(SessionError::busy(state.phase.as_str()));
            }
            if mime_type != ACCEPTED_MIME {
                return Err(SessionError::UnsupportedFile(mime_type.to_string()));
            }
            let size = bytes.len() as u64;
            if size > self.config.max_file_size_bytes {
                return Err(SessionError::FileTooLarge {
                    size,
                    limit: self.config.max_file_size_bytes,
                });
            }

            // Single active document: replace, never merge.
            state.transcript = Transcript::new();
            state.messages.clear();
            state.file = None;
            self.set_phase_locked(&mut state, SessionPhase::Uploading);
        }

        let token = self.arm_cancellation().await;
        let gateway = UploadGateway::new(self.storage.as_ref(), &self.config.poll, &token);
        match gateway.run(bytes, display_name, mime_type).await {
            Ok(file) => {
                self.emit(SessionEvent::FileAccepted {
                    uri: file.uri.clone(),
                });
                {
                    let mut state = self.state.write().await;
                    state.file = Some(file.clone());
                    let seed = Turn::new(
                        Role::User,
                        vec![
                            ContentPart::file(file),
                            ContentPart::text(self.config.seed_instruction.clone()),
                        ],
                    );
                    self.append_turn_locked(&mut state, seed);
                    self.set_phase_locked(&mut state, SessionPhase::AwaitingCompletion);
                }
                self.run_completion(&token).await;
            }
            Err(err) => {
                tracing::warn!(display_name, error = %err, "document upload failed");
                let mut state = self.state.write().await;
                self.append_turn_locked(
                    &mut state,
                    Turn::model_text(format!("Document upload failed: {err}")),
                );
                self.set_phase_locked(&mut state, SessionPhase::ReadyIdle);
            }
        }
        Ok(())
    }

    /// Appends a user message and requests a reply over the entire
    /// transcript.
    ///
    /// Rejected with [`SessionError::NotReady`] unless the session is
    /// idle with a processed document attached. A rejection leaves the
    /// transcript untouched.
    pub async fn submit_message(&self, text: &str) -> Result<(), SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        {
            let mut state = self.state.write().await;
            if state.phase.is_busy() {
                return Err(SessionError::busy(state.phase.as_str()));
            }
            let ready = state.phase == SessionPhase::ReadyIdle
                && state.file.as_ref().is_some_and(|f| f.is_ready());
            if !ready {
                return Err(SessionError::NotReady);
            }
            self.append_turn_locked(&mut state, Turn::user_text(text));
            self.set_phase_locked(&mut state, SessionPhase::AwaitingCompletion);
        }

        let token = self.arm_cancellation().await;
        self.run_completion(&token).await;
        Ok(())
    }

    /// Requests a completion over the current transcript and appends the
    /// outcome as a MODEL turn. Assumes the phase is already
    /// `AwaitingCompletion`; always returns the session to `ReadyIdle`.
    async fn run_completion(&self, cancel: &CancellationToken) {
        let (turns, validation) = {
            let state = self.state.read().await;
            (
                state.transcript.turns().to_vec(),
                state.transcript.validate_for_completion(),
            )
        };

        let outcome = match validation {
            Err(err) => Err(err),
            Ok(()) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(CompletionError::Cancelled),
                    result = self
                        .completion
                        .complete(&turns, &self.config.system_instruction) => result,
                }
            }
        };

        let reply = match outcome {
            Ok(text) => Turn::model_text(text),
            Err(err) => {
                tracing::warn!(error = %err, "completion request failed");
                Turn::model_text(format!("The assistant could not reply: {err}"))
            }
        };

        let mut state = self.state.write().await;
        self.append_turn_locked(&mut state, reply);
        self.set_phase_locked(&mut state, SessionPhase::ReadyIdle);
    }

    async fn arm_cancellation(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.cancel.write().await = token.clone();
        token
    }

    fn emit(&self, event: SessionEvent) {
        // Send only fails when nobody subscribes, which is fine.
        let _ = self.events.send(event);
    }

    /// Appends a turn and its message projection together, keeping the
    /// transcript and the view list in 1:1 order correspondence.
    fn append_turn_locked(&self, state: &mut SessionState, turn: Turn) {
        let message = Message::from_turn(&turn);
        state.transcript.push(turn);
        state.messages.push(message.clone());
        self.emit(SessionEvent::MessageAppended { message });
    }

    fn set_phase_locked(&self, state: &mut SessionState, phase: SessionPhase) {
        if state.phase != phase {
            state.phase = phase;
            self.emit(SessionEvent::PhaseChanged { phase });
        }
    }
}
