#![deny(unsafe_code)]

/// Conversation turns, the timeline contract and operation events.
pub mod chat;
/// Interactive command parsing.
pub mod command;
/// Per-language chrome strings.
pub mod locale;
pub mod predictions;
/// Plain-text transcript rendering.
pub mod render;
/// Session ownership and the upload, follow-up and export operations.
pub mod session;
/// Settings persistence.
pub mod settings;
