//! Core domain types for RAGna.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod conversation;
mod message;
mod proofs;
mod tutor;
pub mod ui;

pub use conversation::{Conversation, DEFAULT_MAX_MESSAGES};
pub use message::{Message, Role};
pub use proofs::{ApiKey, EmptyApiKeyError, EmptyStringError, NonEmptyString};
pub use tutor::{
    DEFAULT_STUDY_WEEKS, Difficulty, Language, StudyWeeks, Topic, ZeroWeeksError,
    numeric_problem_id,
};
pub use ui::{Screen, Tab, ViewState};
