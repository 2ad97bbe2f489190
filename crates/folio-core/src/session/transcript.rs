//! Append-only transcript store.

use super::model::Turn;
use crate::error::CompletionError;
use serde::{Deserialize, Serialize};

/// An append-only, ordered record of conversation turns.
///
/// Insertion order is the conversation order and is resent verbatim on
/// every completion request. The transcript is exclusively owned by the
/// session controller; turns are never reordered or deleted, only the
/// whole transcript is replaced when a new document is uploaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn. This is the only mutation the transcript supports.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Returns the turns in conversation order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns the number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check whether the transcript holds no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Validates the transcript for a completion request.
    ///
    /// Fails fast with `InvalidInput` before any network call: the
    /// transcript must be non-empty and every turn must carry at least
    /// one content part.
    pub fn validate_for_completion(&self) -> Result<(), CompletionError> {
        if self.turns.is_empty() {
            return Err(CompletionError::invalid_input("transcript is empty"));
        }
        if let Some(index) = self.turns.iter().position(|turn| turn.parts.is_empty()) {
            return Err(CompletionError::invalid_input(format!(
                "turn {index} has no content parts"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::Role;

    #[test]
    fn test_push_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user_text("first"));
        transcript.push(Turn::model_text("second"));
        transcript.push(Turn::user_text("third"));

        let texts: Vec<String> = transcript.turns().iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(transcript.turns()[1].role, Role::Model);
    }

    #[test]
    fn test_validate_rejects_empty_transcript() {
        let transcript = Transcript::new();
        let err = transcript.validate_for_completion().unwrap_err();
        assert!(matches!(err, CompletionError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_empty_parts() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user_text("hello"));
        transcript.push(Turn::new(Role::Model, Vec::new()));

        let err = transcript.validate_for_completion().unwrap_err();
        assert!(matches!(err, CompletionError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user_text("hello"));
        assert!(transcript.validate_for_completion().is_ok());
    }
}
