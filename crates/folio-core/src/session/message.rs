//! View-facing message projection.

use super::model::{Role, Turn};
use crate::citation::{self, Citation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rendering-facing projection of a transcript turn.
///
/// Messages are what the presentation layer consumes. They are not
/// authoritative: the transcript's turn sequence is the source of truth
/// sent to the backend, and the message list stays in 1:1 order
/// correspondence with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Stable identifier assigned when the turn was appended.
    pub id: Uuid,
    /// The role of the underlying turn.
    pub role: Role,
    /// The concatenated text parts of the underlying turn.
    pub text: String,
    /// Timestamp of the underlying turn (ISO 8601 format).
    pub created_at: String,
}

impl Message {
    /// Projects a turn into a message with a fresh identifier.
    pub fn from_turn(turn: &Turn) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: turn.role,
            text: turn.text(),
            created_at: turn.created_at.clone(),
        }
    }

    /// Citations found in this message's text, recomputed on demand.
    pub fn citations(&self) -> Vec<Citation> {
        citation::extract_all(&self.text)
    }
}
