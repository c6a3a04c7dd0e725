//! Gateway event handlers
//!
//! Poise hands every gateway event to [`handle_event`], which routes the ones Kosmo
//! cares about to the counting game and the haiku detector.

/// Counting game: judging counts and guarding the last count against edits and deletions
pub mod counting;
/// Haiku detection on new messages
pub mod haiku;

use crate::{
    bot::BotData,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use tracing::{error, info};

/// Routes a gateway event to the handlers interested in it.
pub async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!(
                "{} has logged into Discord (Running on {} servers)",
                data_about_bot.user.name,
                data_about_bot.guilds.len()
            );
        }
        serenity::FullEvent::GuildCreate { guild, is_new } => {
            if *is_new == Some(true) {
                info!("Joined guild {} ({})", guild.name, guild.id);
            }
        }
        serenity::FullEvent::GuildDelete { incomplete, full } => {
            if !incomplete.unavailable {
                let name = full.as_ref().map_or("unknown", |guild| guild.name.as_str());
                info!("Left guild {name} ({})", incomplete.id);
            }
        }
        serenity::FullEvent::Message { new_message } => {
            if new_message.author.bot || new_message.guild_id.is_none() {
                return Ok(());
            }
            // Each feature gets the message even when another one fails
            let outcomes = [
                ("counting", counting::on_message(ctx, data, new_message).await),
                ("haiku", haiku::on_message(ctx, data, new_message).await),
            ];
            log_failures(new_message.id, outcomes);
        }
        serenity::FullEvent::MessageUpdate { event, .. } => {
            // Embed-only updates (link previews) leave the content alone
            if event.content.is_none() {
                return Ok(());
            }
            if let Some(guild_id) = event.guild_id {
                counting::on_messages_changed(ctx, data, guild_id, event.channel_id, &[event.id])
                    .await?;
            }
        }
        serenity::FullEvent::MessageDelete {
            channel_id,
            deleted_message_id,
            guild_id,
        } => {
            if let Some(guild_id) = guild_id {
                counting::on_messages_changed(ctx, data, *guild_id, *channel_id, &[*deleted_message_id])
                    .await?;
            }
        }
        serenity::FullEvent::MessageDeleteBulk {
            channel_id,
            multiple_deleted_messages_ids,
            guild_id,
        } => {
            if let Some(guild_id) = guild_id {
                counting::on_messages_changed(
                    ctx,
                    data,
                    *guild_id,
                    *channel_id,
                    multiple_deleted_messages_ids,
                )
                .await?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Logs every failed feature outcome and returns how many failed.
fn log_failures<const N: usize>(
    message_id: serenity::MessageId,
    outcomes: [(&str, Result<()>); N],
) -> usize {
    outcomes
        .into_iter()
        .filter_map(|(feature, outcome)| outcome.err().map(|e| (feature, e)))
        .inspect(|(feature, e)| error!("{feature} failed on message {message_id}: {e}"))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_do_not_hide_other_outcomes() {
        let message_id = serenity::MessageId::new(1);
        let outcomes = [
            (
                "counting",
                Err(Error::InvalidSetting {
                    message: "database unavailable".to_string(),
                }),
            ),
            ("haiku", Ok(())),
        ];
        assert_eq!(log_failures(message_id, outcomes), 1);

        assert_eq!(log_failures(message_id, [("counting", Ok(())), ("haiku", Ok(()))]), 0);
    }
}
