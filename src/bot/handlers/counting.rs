//! Counting game event handling.
//!
//! New messages in a counting channel are judged by [`counting::process_count`] and
//! answered with reactions or a reset notice. Edits and deletions of the last count
//! make the bot repost the next number, so nobody can erase a count to confuse the
//! channel.

use crate::{
    bot::BotData,
    core::counting::{self, CountAttempt, ResetReason, Verdict},
    errors::Result,
};
use poise::serenity_prelude as serenity;
use tracing::{debug, info, warn};

const RESET_COLOUR: u32 = 0x00ff_5b0a;

/// Judges a new message in the guild's counting channel.
pub async fn on_message(
    ctx: &serenity::Context,
    data: &BotData,
    msg: &serenity::Message,
) -> Result<()> {
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    if msg.content.is_empty() {
        return Ok(());
    }
    // Mentions read as names, not ids
    let content = msg.content_safe(&ctx.cache);

    let attempt = CountAttempt {
        guild_id: guild_id.get(),
        channel_id: msg.channel_id.get(),
        author_id: msg.author.id.get(),
        message_id: msg.id.get(),
        content: &content,
    };
    let reactions = &data.settings.counting;

    match counting::process_count(&data.database, &attempt).await? {
        Verdict::Ignore => {}
        Verdict::Accept { counted, .. } => {
            react(ctx, msg, &reactions.success_reaction).await;
            if let Some(special) = reactions.special_reaction(counted) {
                react(ctx, msg, special).await;
            }
        }
        Verdict::Reset {
            reason,
            highscore,
            new_highscore,
        } => {
            react(ctx, msg, &reactions.failure_reaction).await;
            if new_highscore {
                info!("New counting highscore of {highscore} in guild {guild_id}");
            }
            announce_reset(ctx, msg, reason, highscore, new_highscore).await;
        }
    }
    Ok(())
}

/// Reposts the count when one of `message_ids` was the last counted message.
pub async fn on_messages_changed(
    ctx: &serenity::Context,
    data: &BotData,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
    message_ids: &[serenity::MessageId],
) -> Result<()> {
    let ids: Vec<u64> = message_ids.iter().map(|id| id.get()).collect();
    let Some(state) =
        counting::find_disturbed_count(&data.database, guild_id.get(), channel_id.get(), &ids)
            .await?
    else {
        return Ok(());
    };

    debug!("Last count in guild {guild_id} was changed, reposting");
    let last_counted = state
        .last_member_id
        .map_or_else(|| "nobody".to_string(), |id| format!("<@{id}>"));
    let reminder = format!(
        "⚠️ Next Number: **{}**\nLast Counted: {last_counted}",
        state.next_number
    );

    match channel_id.say(&ctx.http, reminder).await {
        Ok(sent) => {
            counting::set_last_message(&data.database, guild_id.get(), sent.id.get()).await?;
        }
        Err(e) => warn!("Failed to repost count in channel {channel_id}: {e}"),
    }
    Ok(())
}

async fn announce_reset(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    reason: ResetReason,
    highscore: i64,
    new_highscore: bool,
) {
    let footer = if new_highscore {
        format!("New highscore of {highscore}!")
    } else {
        format!("Highscore: {highscore}")
    };
    let embed = serenity::CreateEmbed::new()
        .title("Count Reset to 0")
        .description(reason.describe(&format!("<@{}>", msg.author.id)))
        .colour(RESET_COLOUR)
        .footer(serenity::CreateEmbedFooter::new(footer));

    if let Err(e) = msg
        .channel_id
        .send_message(ctx, serenity::CreateMessage::new().embed(embed))
        .await
    {
        warn!("Failed to announce count reset in channel {}: {e}", msg.channel_id);
    }
}

/// Adds a reaction, logging instead of failing when Discord refuses it.
pub(super) async fn react(ctx: &serenity::Context, msg: &serenity::Message, emoji: &str) {
    let reaction = match serenity::ReactionType::try_from(emoji) {
        Ok(reaction) => reaction,
        Err(e) => {
            warn!("Configured reaction {emoji:?} is not an emoji: {e}");
            return;
        }
    };

    if let Err(e) = msg.react(ctx, reaction).await {
        warn!("Failed to react to message {}: {e}", msg.id);
    }
}
