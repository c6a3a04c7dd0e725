//! Haiku detection Discord commands - `/haiku setup` and `/haiku disable`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::Context,
        core::haiku as detector,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Parent command for haiku detection.
    #[poise::command(
        slash_command,
        guild_only,
        subcommands("haiku_setup", "haiku_disable"),
        subcommand_required
    )]
    pub async fn haiku(_ctx: Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Turns on haiku detection for this server.
    #[poise::command(
        slash_command,
        rename = "setup",
        guild_only,
        required_permissions = "MANAGE_GUILD"
    )]
    pub async fn haiku_setup(
        ctx: Context<'_>,
        #[description = "Text channel where every haiku found is logged"] channel: Option<
            serenity::GuildChannel,
        >,
        #[description = "Reply to the haiku where it was written. Defaults to true."]
        announce: Option<bool>,
        #[description = "React to the haiku. Defaults to false."] react: Option<bool>,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        if let Some(channel) = &channel {
            if channel.kind != serenity::ChannelType::Text {
                return Err(Error::InvalidSetting {
                    message: format!("<#{}> is not a text channel", channel.id),
                });
            }
        }

        let settings = detector::upsert_settings(
            &ctx.data().database,
            guild_id.get(),
            channel.map(|channel| channel.id.get()),
            announce.unwrap_or(true),
            react.unwrap_or(false),
        )
        .await?;

        let log = settings
            .channel_id
            .map_or_else(|| "no log channel".to_string(), |id| format!("logging to <#{id}>"));
        ctx.say(format!(
            "✅ Haiku detection is now enabled ({log}, announce: {}, react: {}).",
            settings.announce, settings.react
        ))
        .await?;
        Ok(())
    }

    /// Turns off haiku detection for this server.
    #[poise::command(
        slash_command,
        rename = "disable",
        guild_only,
        required_permissions = "MANAGE_GUILD"
    )]
    pub async fn haiku_disable(ctx: Context<'_>) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };

        if detector::disable(&ctx.data().database, guild_id.get()).await? {
            ctx.say("✅ Haiku detection is now disabled.").await?;
        } else {
            ctx.say("ℹ️ Haiku detection was never set up here.").await?;
        }
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
