/// Database configuration and connection management
pub mod database;

/// Bot settings loaded from config.toml
pub mod settings;

pub use settings::{CountingConfig, HaikuConfig, Settings};
