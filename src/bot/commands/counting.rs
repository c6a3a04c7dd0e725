//! Counting game Discord commands - `/ct stats`, `/ct setup` and `/ct disable`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::Context,
        core::counting,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    const STATS_COLOUR: u32 = 0x0032_0aff;

    /// Parent command for the counting game.
    #[poise::command(
        slash_command,
        rename = "ct",
        guild_only,
        subcommands("counting_stats", "counting_setup", "counting_disable"),
        subcommand_required
    )]
    pub async fn counting(_ctx: Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Shows the current count, who counted last and the highscore.
    #[poise::command(slash_command, rename = "stats", guild_only)]
    pub async fn counting_stats(ctx: Context<'_>) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let db = &ctx.data().database;

        let enabled = counting::get_settings(db, guild_id.get())
            .await?
            .is_some_and(|settings| settings.enabled);
        if !enabled {
            ctx.send(private_reply("The Counting module is disabled!")).await?;
            return Ok(());
        }

        let Some(state) = counting::get_data(db, guild_id.get()).await? else {
            ctx.send(private_reply("Nobody has started counting!")).await?;
            return Ok(());
        };

        ctx.send(poise::CreateReply::default().embed(stats_embed(&state)))
            .await?;
        Ok(())
    }

    /// A reply only the invoking member sees.
    pub(super) fn private_reply(content: &str) -> poise::CreateReply {
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true)
    }

    /// Next number and last counter side by side, the highscore on its own row.
    pub(super) fn stats_fields(state: &counting::CountState) -> Vec<(&'static str, String, bool)> {
        let last_counted = state
            .last_member_id
            .map_or_else(|| "Nobody".to_string(), |id| format!("<@{id}>"));
        vec![
            ("Next Number", state.next_number.to_string(), true),
            ("Last Counted", last_counted, true),
            ("Highscore", state.highscore.to_string(), false),
        ]
    }

    fn stats_embed(state: &counting::CountState) -> serenity::CreateEmbed {
        serenity::CreateEmbed::default()
            .title("Counting Stats")
            .colour(STATS_COLOUR)
            .fields(stats_fields(state))
    }

    /// Starts the counting game in a channel, replacing the previous one.
    #[poise::command(
        slash_command,
        rename = "setup",
        guild_only,
        required_permissions = "MANAGE_GUILD"
    )]
    pub async fn counting_setup(
        ctx: Context<'_>,
        #[description = "Text channel to count in"] channel: serenity::GuildChannel,
        #[description = "Allow counts written as math, like 2x(3+4). Defaults to true."]
        allow_math: Option<bool>,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        if channel.kind != serenity::ChannelType::Text {
            return Err(Error::InvalidSetting {
                message: format!("<#{}> is not a text channel", channel.id),
            });
        }

        let allow_math = allow_math.unwrap_or(true);
        counting::upsert_settings(&ctx.data().database, guild_id.get(), channel.id.get(), allow_math)
            .await?;

        let math = if allow_math { "allowed" } else { "not allowed" };
        ctx.say(format!(
            "✅ Counting is now enabled in <#{}> (math {math}).",
            channel.id
        ))
        .await?;
        Ok(())
    }

    /// Stops the counting game. The count and highscore are kept.
    #[poise::command(
        slash_command,
        rename = "disable",
        guild_only,
        required_permissions = "MANAGE_GUILD"
    )]
    pub async fn counting_disable(ctx: Context<'_>) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };

        if counting::disable(&ctx.data().database, guild_id.get()).await? {
            ctx.say("✅ Counting is now disabled.").await?;
        } else {
            ctx.say("ℹ️ Counting was never set up here.").await?;
        }
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
