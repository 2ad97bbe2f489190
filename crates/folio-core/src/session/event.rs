//! Session events consumed by the presentation layer.

use super::message::Message;
use super::phase::SessionPhase;
use serde::{Deserialize, Serialize};

/// High-level events published by a session as it changes.
///
/// The rendering layer subscribes to these instead of polling; the core
/// never calls into presentation code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The session moved to a new lifecycle phase.
    PhaseChanged { phase: SessionPhase },
    /// A turn was appended; `message` is its view projection.
    MessageAppended { message: Message },
    /// The backend finished processing an uploaded document.
    FileAccepted { uri: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = SessionEvent::PhaseChanged {
            phase: SessionPhase::Uploading,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"phase_changed\""));
        assert!(json.contains("\"phase\":\"uploading\""));
    }
}
