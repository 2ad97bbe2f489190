//! Error types for the folio session core.

use thiserror::Error;

/// Failures raised while transferring a document to the backend file store.
///
/// The file store boundary never retries internally; the documented poll
/// loop retries a status check only. Everything else surfaces here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Network-level failure talking to the file store.
    #[error("upload transport error: {0}")]
    Transport(String),

    /// The backend accepted the file but reported that processing failed,
    /// or the poll deadline was exhausted while it was still pending.
    #[error("file processing failed: {0}")]
    ProcessingFailed(String),

    /// The backend rejected the upload outright.
    #[error("upload rejected by backend: {0}")]
    Rejected(String),

    /// The operation was abandoned via the session's cancellation token.
    #[error("upload cancelled")]
    Cancelled,
}

impl UploadError {
    /// Creates a Transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a ProcessingFailed error.
    pub fn processing_failed(message: impl Into<String>) -> Self {
        Self::ProcessingFailed(message.into())
    }

    /// Check if this error came from a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failures raised while requesting a completion from the AI backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// Network-level or HTTP-level failure talking to the completion API.
    #[error("completion transport error: {0}")]
    Transport(String),

    /// The transcript failed validation before any network call was made.
    #[error("invalid completion input: {0}")]
    InvalidInput(String),

    /// The backend answered but produced no generated text.
    #[error("backend returned an empty response")]
    EmptyResponse,

    /// The operation was abandoned via the session's cancellation token.
    #[error("completion cancelled")]
    Cancelled,
}

impl CompletionError {
    /// Creates a Transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Check if this error came from a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Caller-misuse signals from the session controller.
///
/// These are rejections, not backend failures: the session state is left
/// exactly as it was, and nothing is appended to the transcript.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No processed document is attached to this session yet.
    #[error("session has no processed document attached")]
    NotReady,

    /// Another upload or completion is already in flight.
    #[error("another operation is in flight ({0})")]
    Busy(String),

    /// The submitted file is not of an accepted MIME type.
    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),

    /// The submitted file exceeds the configured size ceiling.
    #[error("file is {size} bytes, limit is {limit}")]
    FileTooLarge { size: u64, limit: u64 },

    /// The submitted message contained no text.
    #[error("message text is empty")]
    EmptyMessage,
}

impl SessionError {
    /// Creates a Busy error naming the phase that blocked the call.
    pub fn busy(phase: impl Into<String>) -> Self {
        Self::Busy(phase.into())
    }

    /// Check if this is a NotReady rejection.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady)
    }

    /// Check if this is a Busy rejection.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}
