//! Session domain module.
//!
//! This module contains the conversation domain model and the stateful
//! session controller that orchestrates uploads and completions.
//!
//! # Module Structure
//!
//! - `model`: conversation domain types (`Role`, `FileReference`,
//!   `ContentPart`, `Turn`)
//! - `transcript`: append-only transcript store (`Transcript`)
//! - `message`: view-facing projection (`Message`)
//! - `phase`: session lifecycle phases (`SessionPhase`)
//! - `event`: events published to the presentation layer (`SessionEvent`)
//! - `uploader`: upload gateway with bounded status polling
//!   (`UploadGateway`)
//! - `controller`: session orchestration (`SessionController`)

mod controller;
mod event;
mod message;
mod model;
mod phase;
mod transcript;
mod uploader;

// Re-export public API
pub use controller::{ACCEPTED_MIME, SessionController};
pub use event::SessionEvent;
pub use message::Message;
pub use model::{ContentPart, FileReference, ProcessingState, Role, Turn};
pub use phase::SessionPhase;
pub use transcript::Transcript;
pub use uploader::UploadGateway;
