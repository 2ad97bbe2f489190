//! Conversation domain types.
//!
//! This module contains the types that make up a transcript: roles,
//! file references produced by the upload gateway, content parts, and
//! turns.

use serde::{Deserialize, Serialize};

/// Represents the author of a turn in a conversation.
///
/// The wire names (`user` / `model`) match what the completion backend
/// expects and are load-bearing: a transcript is resent verbatim on every
/// completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Turn authored by the user.
    User,
    /// Turn generated by the model (including surfaced error messages).
    Model,
}

impl Role {
    /// Returns the wire-level role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// Processing state of a file held by the backend file store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    /// The backend accepted the file and is still processing it.
    Pending,
    /// The file is ready to be referenced in completion requests.
    Ready,
    /// The backend could not process the file.
    Failed,
}

/// A reference to a document held by the backend file store.
///
/// Created by the upload gateway once the backend accepts the file.
/// Immutable once `Ready` or `Failed`; replaced wholesale (never merged)
/// when a new file is uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    /// Opaque URI the backend uses to resolve the file.
    pub uri: String,
    /// MIME type reported by the backend.
    pub mime_type: String,
    /// Processing state at the time the reference was produced.
    pub state: ProcessingState,
}

impl FileReference {
    /// Check whether this reference can be sent with completion requests.
    pub fn is_ready(&self) -> bool {
        self.state == ProcessingState::Ready
    }
}

/// One piece of content within a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text { text: String },
    /// A reference to an uploaded document.
    FileRef { file: FileReference },
}

impl ContentPart {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Creates a file reference part.
    pub fn file(file: FileReference) -> Self {
        ContentPart::FileRef { file }
    }
}

/// A single turn in the conversation.
///
/// Turns are immutable once appended to the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// The author of this turn.
    pub role: Role,
    /// Ordered content parts; never empty for turns sent to the backend.
    pub parts: Vec<ContentPart>,
    /// Timestamp when the turn was created (ISO 8601 format).
    pub created_at: String,
}

impl Turn {
    /// Creates a turn with the given role and parts.
    pub fn new(role: Role, parts: Vec<ContentPart>) -> Self {
        Self {
            role,
            parts,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Creates a user turn holding a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentPart::text(text)])
    }

    /// Creates a model turn holding a single text part.
    pub fn model_text(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![ContentPart::text(text)])
    }

    /// Concatenates the text parts of this turn, skipping file references.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::FileRef { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}
