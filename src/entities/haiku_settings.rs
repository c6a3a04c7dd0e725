//! Haiku settings entity - per-guild switches for the haiku detector.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Haiku settings database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "haiku_settings")]
pub struct Model {
    /// Guild the settings belong to
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: i64,
    /// Whether the detector runs at all
    pub enabled: bool,
    /// Channel that collects every detected haiku, if any
    pub channel_id: Option<i64>,
    /// Reply to the original message with the formatted haiku
    pub announce: bool,
    /// React to the original message
    pub react: bool,
    /// When these settings were last changed
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
