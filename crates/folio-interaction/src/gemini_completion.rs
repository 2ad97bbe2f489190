//! GeminiCompletion - Direct REST implementation of `CompletionBackend`.
//!
//! Calls the Gemini generateContent API directly. The endpoint is
//! stateless per call: the entire transcript is serialized into every
//! request.

use async_trait::async_trait;
use folio_core::backend::CompletionBackend;
use folio_core::error::CompletionError;
use folio_core::session::{ContentPart, Turn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";

/// Completion backend that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiCompletion {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiCompletion {
    /// Creates a backend with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Loads configuration from secret.json or the `GEMINI_API_KEY`
    /// environment variable.
    ///
    /// Model name defaults to the configured default if not specified.
    pub fn try_from_env() -> Result<Self, String> {
        let (api_key, model_name) = crate::config::gemini_credentials()?;
        let model = model_name.unwrap_or_else(|| folio_core::config::DEFAULT_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the base URL (e.g. for proxying).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn send_request(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<String, CompletionError> {
        let url = format!(
            "{}/{}/models/{}:generateContent?key={}",
            self.base_url, API_VERSION, self.model, self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                CompletionError::transport(format!("Gemini API request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            CompletionError::transport(format!("Failed to parse Gemini response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl CompletionBackend for GeminiCompletion {
    async fn complete(
        &self,
        transcript: &[Turn],
        system_instruction: &str,
    ) -> Result<String, CompletionError> {
        // Fail fast, before any network call.
        if transcript.is_empty() {
            return Err(CompletionError::invalid_input("transcript is empty"));
        }
        if let Some(index) = transcript.iter().position(|turn| turn.parts.is_empty()) {
            return Err(CompletionError::invalid_input(format!(
                "turn {index} has no content parts"
            )));
        }

        let contents = transcript.iter().map(Content::from).collect();
        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content {
                role: "system".to_string(),
                parts: vec![Part::Text {
                    text: system_instruction.to_string(),
                }],
            }),
        };

        tracing::debug!(model = %self.model, turns = transcript.len(), "requesting completion");
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        Content {
            role: turn.role.as_str().to_string(),
            parts: turn.parts.iter().map(Part::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileDataPayload,
    },
}

impl From<&ContentPart> for Part {
    fn from(part: &ContentPart) -> Self {
        match part {
            ContentPart::Text { text } => Part::Text { text: text.clone() },
            ContentPart::FileRef { file } => Part::FileData {
                file_data: FileDataPayload {
                    mime_type: file.mime_type.clone(),
                    file_uri: file.uri.clone(),
                },
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileDataPayload {
    mime_type: String,
    file_uri: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
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

fn extract_text_response(response: GenerateContentResponse) -> Result<String, CompletionError> {
    response
        .candidates
        .and_then(|mut candidates| {
            if candidates.is_empty() {
                None
            } else {
                Some(candidates.remove(0))
            }
        })
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .filter(|text| !text.is_empty())
        .ok_or(CompletionError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: String) -> CompletionError {
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

    CompletionError::transport(format!("HTTP {}: {}", status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::session::{FileReference, ProcessingState, Role};

    fn seed_turn() -> Turn {
        Turn::new(
            Role::User,
            vec![
                ContentPart::file(FileReference {
                    uri: "https://files.example/abc123".to_string(),
                    mime_type: "application/pdf".to_string(),
                    state: ProcessingState::Ready,
                }),
                ContentPart::text("Summarize this document."),
            ],
        )
    }

    #[test]
    fn test_request_serialization() {
        let turns = vec![seed_turn(), Turn::model_text("Summary [Page 1]")];
        let request = GenerateContentRequest {
            contents: turns.iter().map(Content::from).collect(),
            system_instruction: Some(Content {
                role: "system".to_string(),
                parts: vec![Part::Text {
                    text: "cite pages".to_string(),
                }],
            }),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"role\":\"model\""));
        assert!(json.contains("\"fileData\""));
        assert!(json.contains("\"fileUri\":\"https://files.example/abc123\""));
        assert!(json.contains("\"mimeType\":\"application/pdf\""));
        assert!(json.contains("\"text\":\"Summarize this document.\""));
        assert!(json.contains("\"system_instruction\""));
    }

    #[test]
    fn test_extract_text_from_response() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Summary text [Page 1]"}],"role":"model"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            extract_text_response(response).unwrap(),
            "Summary text [Page 1]"
        );
    }

    #[test]
    fn test_empty_candidates_is_empty_response() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(
            extract_text_response(response).unwrap_err(),
            CompletionError::EmptyResponse
        );

        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":""}],"role":"model"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            extract_text_response(response).unwrap_err(),
            CompletionError::EmptyResponse
        );
    }

    #[test]
    fn test_map_http_error_parses_error_body() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#
                .to_string(),
        );
        match err {
            CompletionError::Transport(message) => {
                assert!(message.contains("429"));
                assert!(message.contains("RESOURCE_EXHAUSTED: Quota exceeded"));
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_input_fails_before_network() {
        // The base URL points nowhere; a network attempt would fail with
        // a transport error, so an InvalidInput result proves the guard
        // ran first.
        let backend = GeminiCompletion::new("key", "gemini-2.0-flash")
            .with_base_url("http://127.0.0.1:9");

        let err = backend.complete(&[], "instruction").await.unwrap_err();
        assert!(matches!(err, CompletionError::InvalidInput(_)));

        let turns = vec![Turn::new(Role::User, Vec::new())];
        let err = backend.complete(&turns, "instruction").await.unwrap_err();
        assert!(matches!(err, CompletionError::InvalidInput(_)));
    }
}
