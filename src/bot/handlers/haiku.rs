//! Haiku detection on new messages.

use super::counting::react;
use crate::{bot::BotData, core::haiku, entities::from_db_id, errors::Result};
use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

const HAIKU_COLOUR: u32 = 0x00fc_f5e5;

/// Checks a new message for a haiku and shares it the way the guild asked for.
pub async fn on_message(
    ctx: &serenity::Context,
    data: &BotData,
    msg: &serenity::Message,
) -> Result<()> {
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    let settings = match haiku::get_settings(&data.database, guild_id.get()).await? {
        Some(settings) if settings.enabled => settings,
        _ => return Ok(()),
    };

    // Mentions read as names, not ids
    let content = msg.content_safe(&ctx.cache);
    let Some(poem) = haiku::find_haiku(&content) else {
        return Ok(());
    };
    debug!("Found a haiku by {} in guild {guild_id}", msg.author.id);

    let embed = serenity::CreateEmbed::new()
        .description(poem)
        .colour(HAIKU_COLOUR)
        .footer(
            serenity::CreateEmbedFooter::new(format!("- {}", msg.author.display_name()))
                .icon_url(msg.author.face()),
        );

    if let Some(channel_id) = settings.channel_id {
        let channel_id = serenity::ChannelId::new(from_db_id(channel_id));
        let jump = serenity::CreateButton::new_link(msg.link()).label("Jump to message");
        let log = serenity::CreateMessage::new()
            .embed(embed.clone())
            .components(vec![serenity::CreateActionRow::Buttons(vec![jump])]);

        if let Err(e) = channel_id.send_message(ctx, log).await {
            warn!("Failed to log haiku to channel {channel_id}: {e}");
        }
    }

    if settings.announce {
        let reply = serenity::CreateMessage::new()
            .embed(embed)
            .reference_message(msg)
            .allowed_mentions(serenity::CreateAllowedMentions::new().replied_user(false));

        if let Err(e) = msg.channel_id.send_message(ctx, reply).await {
            warn!("Failed to announce haiku in channel {}: {e}", msg.channel_id);
        }
    }

    if settings.react {
        react(ctx, msg, &data.settings.haiku.reaction).await;
    }
    Ok(())
}
