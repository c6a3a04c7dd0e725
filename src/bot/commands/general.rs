//! General Discord commands - ping and help.
//! These don't touch the database.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{bot::Context, errors::Result};

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: Context<'_>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        let help_text = "**Kosmo Help**\n\
        Here is a summary of all available commands.\n\n\
        **Counting**\n\
        • `/ct stats` - Shows the current count, who counted last and the highscore.\n\
        • `/ct setup <channel> [allow_math]` - Starts the counting game in a channel.\n\
        • `/ct disable` - Stops the counting game.\n\n\
        **Haiku**\n\
        • `/haiku setup [channel] [announce] [react]` - Turns on haiku detection.\n\
        • `/haiku disable` - Turns off haiku detection.\n\n\
        **Utility Commands**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.\n\n\
        Setup commands need the Manage Server permission. With math allowed, counts may be \
        written as expressions like `2x(3+4)` or `2^5`.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
