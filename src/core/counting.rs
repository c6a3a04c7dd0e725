//! Counting game business logic.
//!
//! Each guild picks one channel where members count upwards, one message per number,
//! never twice in a row. A wrong number or a double count resets the game to 1 and
//! may set a new highscore. When math is allowed, a count can be written as an
//! expression (see [`crate::core::math`]).
//!
//! Everything here is framework-agnostic: ids are plain `u64` snowflakes and results
//! are returned as [`Verdict`]s for the bot layer to render.

use crate::{
    core::math,
    entities::{
        CountingData, CountingSettings, counting_data, counting_settings, from_db_id, to_db_id,
    },
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{debug, info};

/// Live state of a guild's count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountState {
    /// The number the next message must contain
    pub next_number: i64,
    /// Highest number reached before the last reset
    pub highscore: i64,
    /// Member who sent the last accepted count
    pub last_member_id: Option<u64>,
    /// Message that holds the last accepted count
    pub last_message_id: Option<u64>,
}

impl Default for CountState {
    fn default() -> Self {
        Self {
            next_number: 1,
            highscore: 0,
            last_member_id: None,
            last_message_id: None,
        }
    }
}

impl From<counting_data::Model> for CountState {
    fn from(model: counting_data::Model) -> Self {
        Self {
            next_number: model.next_number,
            highscore: model.highscore,
            last_member_id: model.last_counted_member_id.map(from_db_id),
            last_message_id: model.last_counted_message_id.map(from_db_id),
        }
    }
}

/// Why a count was reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    /// The member sent something other than the next number
    WrongNumber {
        /// What they should have sent
        expected: i64,
    },
    /// The member tried to count twice in a row
    CountingAlone,
}

impl ResetReason {
    /// Human-readable explanation, addressed at `mention`.
    #[must_use]
    pub fn describe(self, mention: &str) -> String {
        match self {
            Self::WrongNumber { expected } => format!("{mention} can't count past {expected}!"),
            Self::CountingAlone => format!("{mention} is trying to count alone!"),
        }
    }
}

/// Outcome of a message sent to the counting channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not a count, or the game is not running here
    Ignore,
    /// The count was correct
    Accept {
        /// The number that was just counted
        counted: i64,
        /// The number expected next
        next: i64,
    },
    /// The count broke the game
    Reset {
        /// What went wrong
        reason: ResetReason,
        /// Highscore after the reset
        highscore: i64,
        /// Whether this run beat the previous highscore
        new_highscore: bool,
    },
}

/// A message that might be a count.
#[derive(Debug, Clone, Copy)]
pub struct CountAttempt<'a> {
    /// Guild the message was sent in
    pub guild_id: u64,
    /// Channel the message was sent in
    pub channel_id: u64,
    /// Author of the message
    pub author_id: u64,
    /// The message itself
    pub message_id: u64,
    /// Message text with mentions already cleaned up
    pub content: &'a str,
}

/// Extracts the number a message counts, if any.
///
/// With math allowed the message may be any bounded expression, but the result has to
/// be a non-negative integer. Otherwise only plain digits count.
#[must_use]
pub fn parse_count(content: &str, allow_math: bool) -> Option<i64> {
    if !allow_math {
        if content.is_empty() || !content.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        return content.parse().ok();
    }

    let value = math::try_compute(content)?;
    #[allow(clippy::cast_precision_loss)] // Only used as an upper bound
    let in_range = value >= 0.0 && value < i64::MAX as f64;
    if !in_range || value.fract() != 0.0 {
        return None;
    }

    #[allow(clippy::cast_possible_truncation)] // Integral and in range, checked above
    Some(value as i64)
}

/// Decides what a count does to the game.
///
/// Before anyone has counted, wrong numbers are ignored rather than punished. A member
/// counting twice in a row always resets, even with the right number.
#[must_use]
pub fn judge(state: &CountState, author_id: u64, number: i64) -> Verdict {
    let mut reason = None;

    if number != state.next_number {
        if state.next_number == 1 {
            return Verdict::Ignore;
        }
        reason = Some(ResetReason::WrongNumber {
            expected: state.next_number,
        });
    }
    if state.last_member_id == Some(author_id) {
        reason = Some(ResetReason::CountingAlone);
    }

    match reason {
        Some(reason) => {
            let reached = state.next_number - 1;
            let highscore = reached.max(state.highscore);
            Verdict::Reset {
                reason,
                highscore,
                new_highscore: highscore > state.highscore,
            }
        }
        None => Verdict::Accept {
            counted: number,
            next: number.saturating_add(1),
        },
    }
}

/// Retrieves the counting settings of a guild.
pub async fn get_settings<C>(db: &C, guild_id: u64) -> Result<Option<counting_settings::Model>>
where
    C: ConnectionTrait,
{
    CountingSettings::find_by_id(to_db_id(guild_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the counting settings of a guild, but only if `channel_id` is its counting channel.
pub async fn get_settings_for_channel<C>(
    db: &C,
    guild_id: u64,
    channel_id: u64,
) -> Result<Option<counting_settings::Model>>
where
    C: ConnectionTrait,
{
    CountingSettings::find()
        .filter(counting_settings::Column::GuildId.eq(to_db_id(guild_id)))
        .filter(counting_settings::Column::ChannelId.eq(to_db_id(channel_id)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Enables the game in `channel_id`, replacing any previous settings for the guild.
///
/// The count itself is kept, so moving the game to another channel does not reset it.
pub async fn upsert_settings(
    db: &DatabaseConnection,
    guild_id: u64,
    channel_id: u64,
    allow_math: bool,
) -> Result<counting_settings::Model> {
    let settings = counting_settings::ActiveModel {
        guild_id: Set(to_db_id(guild_id)),
        channel_id: Set(to_db_id(channel_id)),
        enabled: Set(true),
        allow_math: Set(allow_math),
        updated_at: Set(Utc::now().naive_utc()),
    };

    let model = if get_settings(db, guild_id).await?.is_some() {
        settings.update(db).await?
    } else {
        settings.insert(db).await?
    };

    info!("Counting enabled in guild {guild_id}, channel {channel_id} (math: {allow_math})");
    Ok(model)
}

/// Turns the game off for a guild. Returns `false` if it was never set up.
pub async fn disable(db: &DatabaseConnection, guild_id: u64) -> Result<bool> {
    let Some(existing) = get_settings(db, guild_id).await? else {
        return Ok(false);
    };

    let mut settings: counting_settings::ActiveModel = existing.into();
    settings.enabled = Set(false);
    settings.updated_at = Set(Utc::now().naive_utc());
    settings.update(db).await?;

    info!("Counting disabled in guild {guild_id}");
    Ok(true)
}

/// Retrieves the stored count of a guild, `None` if nobody has ever counted.
pub async fn get_data<C>(db: &C, guild_id: u64) -> Result<Option<CountState>>
where
    C: ConnectionTrait,
{
    Ok(CountingData::find_by_id(to_db_id(guild_id))
        .one(db)
        .await?
        .map(CountState::from))
}

/// Retrieves the count of a guild, treating a missing row as a fresh game.
pub async fn get_state<C>(db: &C, guild_id: u64) -> Result<CountState>
where
    C: ConnectionTrait,
{
    Ok(get_data(db, guild_id).await?.unwrap_or_default())
}

async fn save_state<C>(db: &C, guild_id: u64, state: &CountState) -> Result<()>
where
    C: ConnectionTrait,
{
    let key = to_db_id(guild_id);
    let data = counting_data::ActiveModel {
        guild_id: Set(key),
        next_number: Set(state.next_number),
        highscore: Set(state.highscore),
        last_counted_member_id: Set(state.last_member_id.map(to_db_id)),
        last_counted_message_id: Set(state.last_message_id.map(to_db_id)),
        updated_at: Set(Utc::now().naive_utc()),
    };

    if CountingData::find_by_id(key).one(db).await?.is_some() {
        data.update(db).await?;
    } else {
        data.insert(db).await?;
    }
    Ok(())
}

/// Stores an accepted count. The highscore is left untouched.
pub async fn record_success<C>(
    db: &C,
    guild_id: u64,
    next_number: i64,
    member_id: u64,
    message_id: u64,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let state = get_state(db, guild_id).await?;
    save_state(
        db,
        guild_id,
        &CountState {
            next_number,
            highscore: state.highscore,
            last_member_id: Some(member_id),
            last_message_id: Some(message_id),
        },
    )
    .await
}

/// Resets a guild's count to 1 and stores its highscore.
pub async fn record_reset<C>(db: &C, guild_id: u64, highscore: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    save_state(
        db,
        guild_id,
        &CountState {
            highscore,
            ..CountState::default()
        },
    )
    .await
}

/// Points the "last counted message" at another message, e.g. the bot's reminder.
pub async fn set_last_message(db: &DatabaseConnection, guild_id: u64, message_id: u64) -> Result<()> {
    let Some(existing) = CountingData::find_by_id(to_db_id(guild_id)).one(db).await? else {
        return Ok(());
    };

    let mut data: counting_data::ActiveModel = existing.into();
    data.last_counted_message_id = Set(Some(to_db_id(message_id)));
    data.updated_at = Set(Utc::now().naive_utc());
    data.update(db).await?;
    Ok(())
}

/// Handles a message that may be a count: parses it, judges it and stores the result.
///
/// The read-judge-write cycle runs in one transaction so concurrent counts are
/// applied one after another.
pub async fn process_count(db: &DatabaseConnection, attempt: &CountAttempt<'_>) -> Result<Verdict> {
    let Some(settings) =
        get_settings_for_channel(db, attempt.guild_id, attempt.channel_id).await?
    else {
        return Ok(Verdict::Ignore);
    };
    if !settings.enabled {
        return Ok(Verdict::Ignore);
    }

    let Some(number) = parse_count(attempt.content, settings.allow_math) else {
        debug!(
            "Ignoring non-count {:?} in guild {}",
            attempt.content, attempt.guild_id
        );
        return Ok(Verdict::Ignore);
    };

    let txn = db.begin().await?;
    let state = get_state(&txn, attempt.guild_id).await?;
    let verdict = judge(&state, attempt.author_id, number);

    match verdict {
        Verdict::Accept { next, .. } => {
            record_success(
                &txn,
                attempt.guild_id,
                next,
                attempt.author_id,
                attempt.message_id,
            )
            .await?;
        }
        Verdict::Reset {
            highscore,
            new_highscore,
            ..
        } => {
            record_reset(&txn, attempt.guild_id, highscore).await?;
            info!(
                "Count reset in guild {} at {} (highscore {highscore}, new: {new_highscore})",
                attempt.guild_id, state.next_number
            );
        }
        Verdict::Ignore => {}
    }

    txn.commit().await?;
    Ok(verdict)
}

/// Checks whether a changed or deleted message was the guild's last count.
///
/// Returns the current state when it was and the game is under way, so the bot can
/// repost the next number before anyone gets confused.
pub async fn find_disturbed_count(
    db: &DatabaseConnection,
    guild_id: u64,
    channel_id: u64,
    message_ids: &[u64],
) -> Result<Option<CountState>> {
    match get_settings_for_channel(db, guild_id, channel_id).await? {
        Some(settings) if settings.enabled => {}
        _ => return Ok(None),
    }

    let Some(state) = get_data(db, guild_id).await? else {
        return Ok(None);
    };
    if state.next_number == 1 {
        return Ok(None);
    }

    Ok(state
        .last_message_id
        .filter(|id| message_ids.contains(id))
        .map(|_| state))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    const GUILD: u64 = 821_043_163_716_124_713;
    const CHANNEL: u64 = 900_000_000_000_000_001;
    const ALICE: u64 = 100_000_000_000_000_001;
    const BOB: u64 = 100_000_000_000_000_002;

    fn state(next_number: i64, highscore: i64, last_member_id: Option<u64>) -> CountState {
        CountState {
            next_number,
            highscore,
            last_member_id,
            last_message_id: last_member_id.map(|_| 1),
        }
    }

    async fn count(db: &DatabaseConnection, author_id: u64, message_id: u64, content: &str) -> Verdict {
        process_count(
            db,
            &CountAttempt {
                guild_id: GUILD,
                channel_id: CHANNEL,
                author_id,
                message_id,
                content,
            },
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_parse_count_plain() {
        assert_eq!(parse_count("1", false), Some(1));
        assert_eq!(parse_count("0042", false), Some(42));
        assert_eq!(parse_count("2x3", false), None);
        assert_eq!(parse_count(" 5", false), None);
        assert_eq!(parse_count("", false), None);
        assert_eq!(parse_count(&"9".repeat(30), false), None);
    }

    #[test]
    fn test_parse_count_math() {
        assert_eq!(parse_count("7", true), Some(7));
        assert_eq!(parse_count("2x3", true), Some(6));
        assert_eq!(parse_count("10/4", true), None);
        assert_eq!(parse_count("10/5", true), Some(2));
        assert_eq!(parse_count("1-5", true), None);
        assert_eq!(parse_count("hello", true), None);
        assert_eq!(parse_count("2^11", true), None);
    }

    #[test]
    fn test_judge_accepts_next_number() {
        assert_eq!(
            judge(&CountState::default(), ALICE, 1),
            Verdict::Accept {
                counted: 1,
                next: 2
            }
        );
        assert_eq!(
            judge(&state(5, 0, Some(BOB)), ALICE, 5),
            Verdict::Accept {
                counted: 5,
                next: 6
            }
        );
    }

    #[test]
    fn test_judge_ignores_wrong_start() {
        assert_eq!(judge(&CountState::default(), ALICE, 7), Verdict::Ignore);
    }

    #[test]
    fn test_judge_wrong_number() {
        assert_eq!(
            judge(&state(5, 10, Some(BOB)), ALICE, 6),
            Verdict::Reset {
                reason: ResetReason::WrongNumber { expected: 5 },
                highscore: 10,
                new_highscore: false,
            }
        );
        assert_eq!(
            judge(&state(12, 10, Some(BOB)), ALICE, 6),
            Verdict::Reset {
                reason: ResetReason::WrongNumber { expected: 12 },
                highscore: 11,
                new_highscore: true,
            }
        );
    }

    #[test]
    fn test_judge_counting_alone_wins() {
        // Right number, same member
        assert_eq!(
            judge(&state(5, 0, Some(ALICE)), ALICE, 5),
            Verdict::Reset {
                reason: ResetReason::CountingAlone,
                highscore: 4,
                new_highscore: true,
            }
        );
        // Wrong number, same member: counting alone is reported
        assert!(matches!(
            judge(&state(5, 0, Some(ALICE)), ALICE, 9),
            Verdict::Reset {
                reason: ResetReason::CountingAlone,
                ..
            }
        ));
    }

    #[test]
    fn test_reset_reason_text() {
        assert_eq!(
            ResetReason::WrongNumber { expected: 4 }.describe("<@1>"),
            "<@1> can't count past 4!"
        );
        assert_eq!(
            ResetReason::CountingAlone.describe("<@1>"),
            "<@1> is trying to count alone!"
        );
    }

    #[tokio::test]
    async fn test_full_game() -> Result<()> {
        let db = setup_test_db().await?;
        enable_counting(&db, GUILD, CHANNEL, true).await?;

        assert_eq!(count(&db, ALICE, 10, "1").await, Verdict::Accept { counted: 1, next: 2 });
        assert_eq!(count(&db, BOB, 11, "1+1").await, Verdict::Accept { counted: 2, next: 3 });
        assert_eq!(count(&db, ALICE, 12, "(1+2)").await, Verdict::Accept { counted: 3, next: 4 });

        let state = get_state(&db, GUILD).await?;
        assert_eq!(state.next_number, 4);
        assert_eq!(state.highscore, 0);
        assert_eq!(state.last_member_id, Some(ALICE));
        assert_eq!(state.last_message_id, Some(12));
        Ok(())
    }

    #[tokio::test]
    async fn test_chatter_is_ignored() -> Result<()> {
        let db = setup_test_db().await?;
        enable_counting(&db, GUILD, CHANNEL, true).await?;

        assert_eq!(count(&db, ALICE, 10, "1").await, Verdict::Accept { counted: 1, next: 2 });
        assert_eq!(count(&db, BOB, 11, "nice one").await, Verdict::Ignore);
        assert_eq!(count(&db, BOB, 12, "1/3").await, Verdict::Ignore);
        assert_eq!(get_state(&db, GUILD).await?.next_number, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_cleaned_mentions_are_not_counts() -> Result<()> {
        let db = setup_test_db().await?;
        enable_counting(&db, GUILD, CHANNEL, true).await?;

        assert_eq!(count(&db, ALICE, 10, "1").await, Verdict::Accept { counted: 1, next: 2 });
        // `<@…>` arrives as `@name`, which never parses as a number
        assert_eq!(count(&db, BOB, 11, "@Alice 2").await, Verdict::Ignore);
        assert_eq!(count(&db, BOB, 12, "@Alice").await, Verdict::Ignore);
        assert_eq!(get_state(&db, GUILD).await?.next_number, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_start_creates_no_state() -> Result<()> {
        let db = setup_test_db().await?;
        enable_counting(&db, GUILD, CHANNEL, false).await?;

        assert_eq!(count(&db, ALICE, 10, "5").await, Verdict::Ignore);
        assert!(get_data(&db, GUILD).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_keeps_best_highscore() -> Result<()> {
        let db = setup_test_db().await?;
        enable_counting(&db, GUILD, CHANNEL, false).await?;

        count(&db, ALICE, 10, "1").await;
        count(&db, BOB, 11, "2").await;
        count(&db, ALICE, 12, "3").await;
        assert_eq!(
            count(&db, BOB, 13, "5").await,
            Verdict::Reset {
                reason: ResetReason::WrongNumber { expected: 4 },
                highscore: 3,
                new_highscore: true,
            }
        );
        assert_eq!(
            get_state(&db, GUILD).await?,
            CountState {
                next_number: 1,
                highscore: 3,
                last_member_id: None,
                last_message_id: None,
            }
        );

        count(&db, ALICE, 14, "1").await;
        assert_eq!(
            count(&db, ALICE, 15, "2").await,
            Verdict::Reset {
                reason: ResetReason::CountingAlone,
                highscore: 3,
                new_highscore: false,
            }
        );
        assert_eq!(get_state(&db, GUILD).await?.highscore, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_math_requires_setting() -> Result<()> {
        let db = setup_test_db().await?;
        enable_counting(&db, GUILD, CHANNEL, false).await?;
        assert_eq!(count(&db, ALICE, 10, "2-1").await, Verdict::Ignore);

        enable_counting(&db, GUILD, CHANNEL, true).await?;
        assert_eq!(count(&db, ALICE, 11, "2-1").await, Verdict::Accept { counted: 1, next: 2 });
        Ok(())
    }

    #[tokio::test]
    async fn test_other_channels_and_disabled_games_are_ignored() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(count(&db, ALICE, 10, "1").await, Verdict::Ignore);

        enable_counting(&db, GUILD, CHANNEL + 1, true).await?;
        assert_eq!(count(&db, ALICE, 11, "1").await, Verdict::Ignore);

        enable_counting(&db, GUILD, CHANNEL, true).await?;
        assert!(disable(&db, GUILD).await?);
        assert_eq!(count(&db, ALICE, 12, "1").await, Verdict::Ignore);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_settings_replaces_channel() -> Result<()> {
        let db = setup_test_db().await?;
        enable_counting(&db, GUILD, CHANNEL, true).await?;
        let settings = upsert_settings(&db, GUILD, CHANNEL + 5, false).await?;

        assert_eq!(settings.channel_id, to_db_id(CHANNEL + 5));
        assert!(settings.enabled);
        assert!(!settings.allow_math);
        assert!(get_settings_for_channel(&db, GUILD, CHANNEL).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_disable_without_settings() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(!disable(&db, GUILD).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_disturbed_count() -> Result<()> {
        let db = setup_test_db().await?;
        enable_counting(&db, GUILD, CHANNEL, false).await?;

        // Nothing counted yet
        assert!(find_disturbed_count(&db, GUILD, CHANNEL, &[10]).await?.is_none());

        count(&db, ALICE, 10, "1").await;
        count(&db, BOB, 11, "2").await;

        // Older counts do not matter
        assert!(find_disturbed_count(&db, GUILD, CHANNEL, &[10]).await?.is_none());
        // Wrong channel
        assert!(find_disturbed_count(&db, GUILD, CHANNEL + 1, &[11]).await?.is_none());

        let disturbed = find_disturbed_count(&db, GUILD, CHANNEL, &[9, 11]).await?;
        assert_eq!(disturbed.map(|s| (s.next_number, s.last_member_id)), Some((3, Some(BOB))));

        // After the bot reposts, its reminder becomes the message to watch
        set_last_message(&db, GUILD, 50).await?;
        assert!(find_disturbed_count(&db, GUILD, CHANNEL, &[11]).await?.is_none());
        assert!(find_disturbed_count(&db, GUILD, CHANNEL, &[50]).await?.is_some());
        assert_eq!(get_state(&db, GUILD).await?.last_member_id, Some(BOB));
        Ok(())
    }
}
