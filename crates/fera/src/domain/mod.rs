//! Domain Layer
//!
//! Pure business entities and logic, without infrastructure dependencies.

pub mod entities;
pub mod errors;

pub use entities::{ConversationEntry, SearchHistory, SearchSession, Source, MAX_SESSIONS};
pub use errors::DomainError;
