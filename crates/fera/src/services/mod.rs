//! Services - Concrete implementations

pub mod citations;
pub mod format;
pub mod gemini;
