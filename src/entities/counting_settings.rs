//! Counting settings entity - one row per guild that has set up the counting game.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Counting settings database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "counting_settings")]
pub struct Model {
    /// Guild the settings belong to
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: i64,
    /// The only channel in which counts are accepted
    pub channel_id: i64,
    /// Whether the game currently runs
    pub enabled: bool,
    /// Whether counts may be written as arithmetic (`2x3`, `(1+2)^2`)
    pub allow_math: bool,
    /// When these settings were last changed
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
