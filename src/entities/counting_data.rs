//! Counting data entity - the live state of a guild's count.
//!
//! A missing row is equivalent to a fresh game: next number 1, highscore 0, nobody has
//! counted yet.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Counting state database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "counting_data")]
pub struct Model {
    /// Guild the count belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: i64,
    /// The number the next message must contain
    pub next_number: i64,
    /// Highest number ever reached in this guild
    pub highscore: i64,
    /// Member who sent the last accepted count
    pub last_counted_member_id: Option<i64>,
    /// Message holding the last accepted count (or the bot's reminder replacing it)
    pub last_counted_message_id: Option<i64>,
    /// When the count last changed
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
