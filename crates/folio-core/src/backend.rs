//! Backend traits for the AI service boundary.
//!
//! The observed deployments bind a process-wide, credential-bound client.
//! Here the two halves of that client are abstract seams injected into
//! the session controller at construction, so tests run against doubles
//! and no global state is involved.

use crate::error::{CompletionError, UploadError};
use crate::session::{ProcessingState, Turn};
use async_trait::async_trait;

/// A file as reported by the backend file store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Handle used to poll the file's status (e.g. `files/abc123`).
    pub name: String,
    /// Opaque URI used to reference the file in completion requests.
    pub uri: String,
    /// MIME type recorded by the backend.
    pub mime_type: String,
    /// Current processing state.
    pub state: ProcessingState,
}

/// An abstract file store that holds uploaded documents for the
/// completion backend to reference.
///
/// Implementations must not retry internally; transient failures surface
/// to the caller, which owns the (bounded) status poll loop.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Submits raw file bytes with a display name. Returns the accepted
    /// file, typically still in the `Pending` state.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> Result<RemoteFile, UploadError>;

    /// Fetches the current state of a previously uploaded file.
    async fn status(&self, name: &str) -> Result<RemoteFile, UploadError>;
}

/// An abstract, stateless completion endpoint.
///
/// The entire transcript is resent on every call; the backend retains no
/// dialog state between calls.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generates a reply for the given transcript. Returns the generated
    /// text verbatim; citation parsing happens downstream.
    async fn complete(
        &self,
        transcript: &[Turn],
        system_instruction: &str,
    ) -> Result<String, CompletionError>;
}
