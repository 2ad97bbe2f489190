//! GeminiFileStore - Direct REST implementation of `StorageBackend`.
//!
//! Uploads documents to the Gemini Files API and reads back their
//! processing state. Files uploaded here are referenced from completion
//! requests by URI; no bytes are kept locally after the transfer.

use async_trait::async_trait;
use folio_core::backend::{RemoteFile, StorageBackend};
use folio_core::error::UploadError;
use folio_core::session::ProcessingState;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";

/// File store backend that talks to the Gemini Files HTTP API.
#[derive(Clone)]
pub struct GeminiFileStore {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiFileStore {
    /// Creates a backend with the provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Loads configuration from secret.json or the `GEMINI_API_KEY`
    /// environment variable.
    pub fn try_from_env() -> Result<Self, String> {
        let (api_key, _) = crate::config::gemini_credentials()?;
        Ok(Self::new(api_key))
    }

    /// Overrides the base URL (e.g. for proxying).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl StorageBackend for GeminiFileStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> Result<RemoteFile, UploadError> {
        let url = format!(
            "{}/upload/{}/files?uploadType=multipart&key={}",
            self.base_url, API_VERSION, self.api_key
        );
        let boundary = format!("folio-{}", Uuid::new_v4().simple());
        let body = build_multipart_body(&boundary, display_name, mime_type, &bytes);

        let response = self
            .client
            .post(url)
            .header(
                "Content-Type",
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .map_err(|err| UploadError::transport(format!("file upload failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read file store error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: UploadFileResponse = response.json().await.map_err(|err| {
            UploadError::transport(format!("Failed to parse upload response: {err}"))
        })?;

        Ok(parsed.file.into_remote(mime_type))
    }

    async fn status(&self, name: &str) -> Result<RemoteFile, UploadError> {
        let url = format!("{}/{}/{}?key={}", self.base_url, API_VERSION, name, self.api_key);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| UploadError::transport(format!("status check failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read file store error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GeminiFile = response.json().await.map_err(|err| {
            UploadError::transport(format!("Failed to parse status response: {err}"))
        })?;

        Ok(parsed.into_remote("application/octet-stream"))
    }
}

/// Builds a `multipart/related` body: a JSON metadata part carrying the
/// display name, followed by the raw media part.
fn build_multipart_body(
    boundary: &str,
    display_name: &str,
    mime_type: &str,
    bytes: &[u8],
) -> Vec<u8> {
    let metadata = serde_json::to_string(&UploadMetadata {
        file: FileMetadata {
            display_name: display_name.to_string(),
        },
    })
    .expect("upload metadata serializes");

    let mut body = Vec::with_capacity(bytes.len() + metadata.len() + 256);
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[derive(Serialize)]
struct UploadMetadata {
    file: FileMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata {
    display_name: String,
}

#[derive(Deserialize)]
struct UploadFileResponse {
    file: GeminiFile,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiFile {
    name: String,
    uri: Option<String>,
    mime_type: Option<String>,
    state: FileState,
}

impl GeminiFile {
    fn into_remote(self, fallback_mime: &str) -> RemoteFile {
        let state = match self.state {
            FileState::Processing | FileState::StateUnspecified => ProcessingState::Pending,
            FileState::Active => ProcessingState::Ready,
            FileState::Failed | FileState::Unknown => ProcessingState::Failed,
        };
        RemoteFile {
            uri: self.uri.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            mime_type: self
                .mime_type
                .unwrap_or_else(|| fallback_mime.to_string()),
            state,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum FileState {
    StateUnspecified,
    Processing,
    Active,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

fn map_http_error(status: StatusCode, body: String) -> UploadError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    if status.is_client_error() {
        UploadError::Rejected(format!("HTTP {}: {}", status.as_u16(), message))
    } else {
        UploadError::transport(format!("HTTP {}: {}", status.as_u16(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_body_shape() {
        let body = build_multipart_body("b123", "report.pdf", "application/pdf", b"%PDF-1.7");
        let text = String::from_utf8_lossy(&body);

        assert!(text.starts_with("--b123\r\n"));
        assert!(text.contains("Content-Type: application/json; charset=UTF-8"));
        assert!(text.contains("\"displayName\":\"report.pdf\""));
        assert!(text.contains("Content-Type: application/pdf"));
        assert!(text.contains("%PDF-1.7"));
        assert!(text.ends_with("\r\n--b123--\r\n"));
    }

    #[test]
    fn test_upload_response_parsing() {
        let response: UploadFileResponse = serde_json::from_str(
            r#"{"file":{"name":"files/abc123","uri":"https://generativelanguage.googleapis.com/v1beta/files/abc123","mimeType":"application/pdf","state":"PROCESSING"}}"#,
        )
        .unwrap();

        let remote = response.file.into_remote("application/pdf");
        assert_eq!(remote.name, "files/abc123");
        assert_eq!(
            remote.uri,
            "https://generativelanguage.googleapis.com/v1beta/files/abc123"
        );
        assert_eq!(remote.state, ProcessingState::Pending);
    }

    #[test]
    fn test_state_mapping() {
        let cases = [
            ("PROCESSING", ProcessingState::Pending),
            ("STATE_UNSPECIFIED", ProcessingState::Pending),
            ("ACTIVE", ProcessingState::Ready),
            ("FAILED", ProcessingState::Failed),
            ("SOMETHING_NEW", ProcessingState::Failed),
        ];
        for (wire, expected) in cases {
            let json = format!(r#"{{"name":"files/x","state":"{wire}"}}"#);
            let file: GeminiFile = serde_json::from_str(&json).unwrap();
            assert_eq!(file.into_remote("application/pdf").state, expected, "{wire}");
        }
    }

    #[test]
    fn test_missing_uri_falls_back_to_name() {
        let file: GeminiFile =
            serde_json::from_str(r#"{"name":"files/x","state":"ACTIVE"}"#).unwrap();
        let remote = file.into_remote("application/pdf");
        assert_eq!(remote.uri, "files/x");
        assert_eq!(remote.mime_type, "application/pdf");
    }

    #[test]
    fn test_client_errors_map_to_rejected() {
        let err = map_http_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"Unsupported file type","status":"INVALID_ARGUMENT"}}"#
                .to_string(),
        );
        assert!(matches!(err, UploadError::Rejected(_)));

        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream died".to_string());
        assert!(matches!(err, UploadError::Transport(_)));
    }
}
