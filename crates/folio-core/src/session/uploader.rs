//! Upload gateway: transfer a document and poll until it is usable.

use super::model::{FileReference, ProcessingState};
use crate::backend::StorageBackend;
use crate::config::PollPolicy;
use crate::error::UploadError;
use tokio_util::sync::CancellationToken;

/// Drives a [`StorageBackend`] through the upload-then-poll protocol.
///
/// The gateway submits the raw bytes, then polls the status endpoint on
/// the configured interval until the backend reports the file `Ready` or
/// `Failed`. Polling is bounded by `PollPolicy::max_attempts` and both
/// suspension points (the sleep and the network calls) honor the
/// cancellation token.
pub struct UploadGateway<'a> {
    storage: &'a dyn StorageBackend,
    poll: &'a PollPolicy,
    cancel: &'a CancellationToken,
}

impl<'a> UploadGateway<'a> {
    pub fn new(
        storage: &'a dyn StorageBackend,
        poll: &'a PollPolicy,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            storage,
            poll,
            cancel,
        }
    }

    /// Uploads `bytes` and waits for the backend to finish processing.
    ///
    /// The caller validates MIME type and size ceiling beforehand; the
    /// gateway propagates backend rejection but does not re-validate
    /// content.
    pub async fn run(
        &self,
        bytes: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> Result<FileReference, UploadError> {
        let size = bytes.len();
        tracing::info!(display_name, size, "uploading document to file store");

        let mut file = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(UploadError::Cancelled),
            result = self.storage.upload(bytes, display_name, mime_type) => result?,
        };

        let mut attempts = 0u32;
        while file.state == ProcessingState::Pending {
            attempts += 1;
            if attempts > self.poll.max_attempts {
                tracing::warn!(
                    name = %file.name,
                    attempts,
                    "file still pending after poll deadline"
                );
                return Err(UploadError::processing_failed(format!(
                    "file was still processing after {} status checks",
                    self.poll.max_attempts
                )));
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(UploadError::Cancelled),
                _ = tokio::time::sleep(self.poll.interval) => {}
            }

            file = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(UploadError::Cancelled),
                result = self.storage.status(&file.name) => result?,
            };
        }

        match file.state {
            ProcessingState::Ready => {
                tracing::info!(name = %file.name, uri = %file.uri, "file ready for reference");
                Ok(FileReference {
                    uri: file.uri,
                    mime_type: file.mime_type,
                    state: ProcessingState::Ready,
                })
            }
            ProcessingState::Failed => Err(UploadError::processing_failed(
                "backend reported file processing failure",
            )),
            ProcessingState::Pending => unreachable!("poll loop exits on a settled state"),
        }
    }
}
