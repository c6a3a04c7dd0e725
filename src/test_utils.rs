//! Shared test utilities for Kosmo.
//!
//! Helpers for setting up an in-memory database and enabling the guild features
//! that most tests start from.

use crate::{
    core::{counting, haiku},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Enables the counting game in `channel_id`.
pub async fn enable_counting(
    db: &DatabaseConnection,
    guild_id: u64,
    channel_id: u64,
    allow_math: bool,
) -> Result<entities::CountingSettingsModel> {
    counting::upsert_settings(db, guild_id, channel_id, allow_math).await
}

/// Enables haiku detection with the defaults of `/haiku setup`.
///
/// # Defaults
/// * `channel_id`: None (no log channel)
/// * `announce`: true
/// * `react`: false
pub async fn enable_haiku(
    db: &DatabaseConnection,
    guild_id: u64,
) -> Result<entities::HaikuSettingsModel> {
    haiku::upsert_settings(db, guild_id, None, true, false).await
}
