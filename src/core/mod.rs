//! Core business logic - framework-agnostic game and detection rules.
//!
//! Nothing in here talks to Discord; the bot layer feeds in message text and ids and
//! renders whatever comes back.

/// Counting game rules and persistence
pub mod counting;
/// Haiku detection and its per-guild settings
pub mod haiku;
/// Bounded arithmetic evaluation for counts written as expressions
pub mod math;
