//! Fera Domain Library
//!
//! Core domain types and interfaces for the Fera grounded web search system.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (Source, ConversationEntry, SearchSession, SearchHistory)
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `search/`: Grounded search provider interface
//!
//! - **Services** (`services/`): Concrete implementations
//!   - `gemini/`: Gemini provider with the `google_search` grounding tool
//!   - `format/`: Heuristic response formatter (markdown / HTML)
//!   - `citations/`: Grounding-metadata citation extractor

pub mod domain;
pub mod ports;
pub mod services;

// Re-export commonly used types
pub use domain::{
    ConversationEntry, DomainError, SearchHistory, SearchSession, Source, MAX_SESSIONS,
};
pub use ports::{ConversationTurn, GroundedAnswer, GroundedSearch};
pub use services::citations::extract_sources;
pub use services::format::{format_html, format_markdown};
pub use services::gemini::GeminiAgent;
