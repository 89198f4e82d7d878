//! Ports - Abstract interfaces

pub mod search;

pub use search::{ConversationTurn, GroundedAnswer, GroundedSearch};
