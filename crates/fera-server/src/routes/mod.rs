//! Fera API Routes
//!
//! - GET  /api/search?q=     - grounded web search, starts a session
//! - POST /api/follow-up     - follow-up chained onto prior turns

pub mod follow_up;
pub mod search;
pub mod swagger;
