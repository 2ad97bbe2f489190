//! Session configuration types.

use std::time::Duration;

/// Default completion model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default size ceiling for uploaded documents (50 MB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Instruction text for the seed turn created right after an upload.
pub const DEFAULT_SEED_INSTRUCTION: &str = "Summarize this document.";

/// System instruction sent alongside every completion request.
///
/// The `[Page N]` marker format here is a wire-level contract: the
/// citation extractor parses exactly this shape out of generated text.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "\
You are a helpful assistant that helps users understand and analyze the \
attached document. Provide clear, concise answers grounded in the document \
content. When referencing specific parts of the document, include page \
citations using the exact format [Page N], where N is the 1-indexed page \
number. If the answer is not in the document, say so.";

/// Bounded retry policy for the upload status poll loop.
///
/// The poll retries a status check, never the upload itself. Exhausting
/// `max_attempts` fails the upload with a processing error instead of
/// polling forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between consecutive status checks.
    pub interval: Duration,
    /// Maximum number of status checks before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

/// Configuration recognized by the session core.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Size ceiling for uploaded documents, in bytes.
    pub max_file_size_bytes: u64,
    /// Status poll policy for the upload gateway.
    pub poll: PollPolicy,
    /// Completion model identifier.
    pub model: String,
    /// System instruction sent with every completion request.
    pub system_instruction: String,
    /// Instruction text appended to the seed turn after an upload.
    pub seed_instruction: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            poll: PollPolicy::default(),
            model: DEFAULT_MODEL.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            seed_instruction: DEFAULT_SEED_INSTRUCTION.to_string(),
        }
    }
}

impl SessionConfig {
    /// Overrides the completion model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Overrides the file size ceiling.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }

    /// Overrides the upload poll policy.
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}
