//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables. Each entity has a Model struct for data
//! and an Entity struct for operations.
//!
//! Discord snowflakes are stored as `i64` columns; use [`to_db_id`] and [`from_db_id`]
//! to cross that boundary.

pub mod counting_data;
pub mod counting_settings;
pub mod haiku_settings;

// Re-export specific types to avoid conflicts
pub use counting_data::{
    Column as CountingDataColumn, Entity as CountingData, Model as CountingDataModel,
};
pub use counting_settings::{
    Column as CountingSettingsColumn, Entity as CountingSettings, Model as CountingSettingsModel,
};
pub use haiku_settings::{
    Column as HaikuSettingsColumn, Entity as HaikuSettings, Model as HaikuSettingsModel,
};

/// Converts a Discord snowflake into its database representation.
#[allow(clippy::cast_possible_wrap)] // Snowflakes only use the low 63 bits
#[must_use]
pub const fn to_db_id(id: u64) -> i64 {
    id as i64
}

/// Converts a stored snowflake back into a Discord id.
#[allow(clippy::cast_sign_loss)] // Only ever holds values written by `to_db_id`
#[must_use]
pub const fn from_db_id(id: i64) -> u64 {
    id as u64
}
