//! Core of the folio document-chat system.
//!
//! A session owns one uploaded document and its conversation transcript.
//! The upload gateway transfers the document to the backend file store
//! and polls until it is usable; the session controller accumulates the
//! transcript and relays it to a stateless completion backend; the
//! citation extractor links `[Page N]` markers in replies back to the
//! page viewer. Backends are injected traits, so the whole flow runs
//! against test doubles.

pub mod backend;
pub mod citation;
pub mod config;
pub mod error;
pub mod pagination;
pub mod session;

// Re-export the error taxonomy
pub use error::{CompletionError, SessionError, UploadError};
