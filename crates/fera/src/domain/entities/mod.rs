//! Domain Entities

pub mod session;
pub mod source;

pub use session::{ConversationEntry, SearchHistory, SearchSession, MAX_SESSIONS};
pub use source::Source;
