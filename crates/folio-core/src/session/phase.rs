//! Session lifecycle phases.

use serde::{Deserialize, Serialize};

/// The lifecycle phase of a session.
///
/// `Empty -> Uploading -> ReadyIdle <-> AwaitingCompletion`, with failures
/// always returning to an actionable phase. At most one network operation
/// is in flight per session; the busy phases are the guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No document has been submitted yet.
    #[default]
    Empty,
    /// A document was submitted and the backend is processing it.
    Uploading,
    /// The session is idle and can accept input.
    ReadyIdle,
    /// A completion request is in flight.
    AwaitingCompletion,
}

impl SessionPhase {
    /// Check whether a network operation is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Uploading | Self::AwaitingCompletion)
    }

    /// Returns a short lowercase name for logging and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Uploading => "uploading",
            Self::ReadyIdle => "ready_idle",
            Self::AwaitingCompletion => "awaiting_completion",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_phases() {
        assert!(SessionPhase::Uploading.is_busy());
        assert!(SessionPhase::AwaitingCompletion.is_busy());
        assert!(!SessionPhase::Empty.is_busy());
        assert!(!SessionPhase::ReadyIdle.is_busy());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SessionPhase::AwaitingCompletion).unwrap();
        assert_eq!(json, "\"awaiting_completion\"");
    }
}
