//! Haiku detection business logic.
//!
//! A message is a haiku when its words split, in order, into lines of 5, 7 and 5
//! syllables. Detection works on the message as shown to members (markdown removed,
//! mentions already resolved), and the detected lines are reported as word indices so
//! the bot can quote the member's original words.

mod markdown;
mod numbers;
mod syllables;

pub use markdown::{escape_markdown, strip_markdown};
pub use numbers::spell_out;
pub use syllables::{count_syllables, estimate};

use crate::{
    entities::{HaikuSettings, haiku_settings, to_db_id},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use tracing::info;

/// Syllables per line.
pub const LINE_SYLLABLES: [u32; 3] = [5, 7, 5];

/// Punctuation a haiku may contain besides letters, digits and spaces.
const PUNCTUATION: &[char] = &[
    '(', ')', '{', '}', '[', ']', '"', '*', '\'', '+', '-', '$', '%', '#', '@', '!', '^', '&',
    ',', ';', ':', '?', '.',
];

/// Word indices making up each of the three lines.
pub type HaikuLines = [Vec<usize>; 3];

/// Cleans message text for detection.
///
/// Newlines become spaces, markdown is removed and runs of spaces collapse. Messages
/// containing anything beyond letters, digits, spaces and common punctuation (emoji,
/// links with `/`, code) are not candidates and yield `None`.
#[must_use]
pub fn prepare(content: &str) -> Option<String> {
    let flattened = content.replace('\n', " ");
    let stripped = strip_markdown(&flattened);
    let collapsed = stripped
        .split(' ')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let acceptable = !collapsed.is_empty()
        && collapsed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || PUNCTUATION.contains(&c));
    acceptable.then_some(collapsed)
}

/// Rewrites a word the way it is read: `5.0` becomes `5 point 0` and punctuation
/// other than hyphens is dropped.
fn speakable(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut spoken = String::with_capacity(word.len());
    let mut index = 0;

    while index < chars.len() {
        let c = chars[index];
        let decimal_point = c.is_ascii_digit()
            && chars.get(index + 1) == Some(&'.')
            && chars.get(index + 2).is_some_and(char::is_ascii_digit);

        if decimal_point {
            spoken.push(c);
            spoken.push_str(" point ");
            spoken.push(chars[index + 2]);
            index += 3;
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c.is_whitespace() {
            spoken.push(c);
        }
        index += 1;
    }
    spoken
}

/// Syllables in one word of prepared text. Pure punctuation counts as zero; a word
/// with uncountable parts yields `None`.
fn word_syllables(word: &str) -> Option<u32> {
    let spoken = speakable(word);
    if !spoken.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Some(0);
    }
    spoken.split_whitespace().map(count_syllables).sum()
}

/// Splits prepared text (see [`prepare`]) into 5-7-5 lines.
///
/// Words are consumed in order: the first time the running count reaches 5 the first
/// line closes; after that, the first time it reaches 7 the second closes. The text is a
/// haiku if the remaining words hold exactly 5 syllables.
#[must_use]
pub fn detect(text: &str) -> Option<HaikuLines> {
    let mut lines = HaikuLines::default();
    let mut line = 0;
    let mut total = 0;

    for (index, word) in text.split(' ').enumerate() {
        lines[line].push(index);
        total += word_syllables(word)?;

        if line < 2 && total == LINE_SYLLABLES[line] {
            line += 1;
            total = 0;
        }
    }

    (line == 2 && total == LINE_SYLLABLES[2]).then_some(lines)
}

/// Renders the detected lines of `text` as three italic lines.
#[must_use]
pub fn format_haiku(text: &str, lines: &HaikuLines) -> String {
    let words: Vec<&str> = text.split(' ').collect();

    lines
        .iter()
        .map(|line| {
            let joined = line
                .iter()
                .filter_map(|&index| words.get(index).copied())
                .collect::<Vec<_>>()
                .join(" ");
            format!("*{}*", escape_markdown(&joined))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Detects and formats a haiku in raw message content in one go.
#[must_use]
pub fn find_haiku(content: &str) -> Option<String> {
    let text = prepare(content)?;
    let lines = detect(&text)?;
    Some(format_haiku(&text, &lines))
}

/// Retrieves the haiku settings of a guild.
pub async fn get_settings(
    db: &DatabaseConnection,
    guild_id: u64,
) -> Result<Option<haiku_settings::Model>> {
    HaikuSettings::find_by_id(to_db_id(guild_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Enables haiku detection for a guild, replacing any previous settings.
pub async fn upsert_settings(
    db: &DatabaseConnection,
    guild_id: u64,
    channel_id: Option<u64>,
    announce: bool,
    react: bool,
) -> Result<haiku_settings::Model> {
    let settings = haiku_settings::ActiveModel {
        guild_id: Set(to_db_id(guild_id)),
        enabled: Set(true),
        channel_id: Set(channel_id.map(to_db_id)),
        announce: Set(announce),
        react: Set(react),
        updated_at: Set(Utc::now().naive_utc()),
    };

    let model = if get_settings(db, guild_id).await?.is_some() {
        settings.update(db).await?
    } else {
        settings.insert(db).await?
    };

    info!("Haiku detection enabled in guild {guild_id}");
    Ok(model)
}

/// Turns haiku detection off for a guild. Returns `false` if it was never set up.
pub async fn disable(db: &DatabaseConnection, guild_id: u64) -> Result<bool> {
    let Some(existing) = get_settings(db, guild_id).await? else {
        return Ok(false);
    };

    let mut settings: haiku_settings::ActiveModel = existing.into();
    settings.enabled = Set(false);
    settings.updated_at = Set(Utc::now().naive_utc());
    settings.update(db).await?;

    info!("Haiku detection disabled in guild {guild_id}");
    Ok(true)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{enable_haiku, setup_test_db};

    const BASHO: &str = "An old silent pond, a frog jumps into the pond. Splash! Silence again.";

    #[test]
    fn test_prepare_cleans_text() {
        assert_eq!(
            prepare("**An old**  silent\npond").as_deref(),
            Some("An old silent pond")
        );
        assert_eq!(prepare("  padded  ").as_deref(), Some("padded"));
    }

    #[test]
    fn test_prepare_rejects_foreign_characters() {
        assert!(prepare("").is_none());
        assert!(prepare("   ").is_none());
        assert!(prepare("see https://example.com").is_none());
        assert!(prepare("nice 🐸").is_none());
        assert!(prepare("café").is_none());
    }

    #[test]
    fn test_speakable() {
        assert_eq!(speakable("pond."), "pond");
        assert_eq!(speakable("5.0"), "5 point 0");
        assert_eq!(speakable("well-known!"), "well-known");
        assert_eq!(speakable("\"quoted\""), "quoted");
    }

    #[test]
    fn test_detect_classic_haiku() {
        let text = prepare(BASHO).unwrap();
        let lines = detect(&text).unwrap();

        assert_eq!(lines[0], vec![0, 1, 2, 3]);
        assert_eq!(lines[1], vec![4, 5, 6, 7, 8, 9]);
        assert_eq!(lines[2], vec![10, 11, 12]);
    }

    #[test]
    fn test_detect_rejects_wrong_shapes() {
        assert!(detect("hello world").is_none());
        // 5 + 7 + 6
        assert!(detect("An old silent pond a frog jumps into the pond splash silence again now").is_none());
        // 5 + 5 + ...: the second line never reaches exactly 7
        assert!(detect("An old silent pond little table little table silent pond").is_none());
    }

    #[test]
    fn test_detect_counts_numbers_as_words() {
        // "twenty-one" is three syllables
        let text = "I saw 21 frogs in an old silent pond. Splash! Silence again.";
        assert!(detect(text).is_some());
    }

    #[test]
    fn test_detect_uncountable_word_breaks_haiku() {
        let text = "An old silent pond 99999999999999999999999 a frog jumps into the pond splash silence again";
        assert!(detect(text).is_none());
    }

    #[test]
    fn test_punctuation_only_words_ride_along() {
        let text = prepare("An old silent pond - a frog jumps into the pond splash silence again").unwrap();
        let lines = detect(&text).unwrap();
        // The dash belongs to the second line but adds no syllables
        assert_eq!(lines[1][0], 4);
    }

    #[test]
    fn test_format_haiku() {
        let formatted = find_haiku(BASHO).unwrap();
        assert_eq!(
            formatted,
            "*An old silent pond,*\n*a frog jumps into the pond.*\n*Splash! Silence again.*"
        );
    }

    #[test]
    fn test_format_escapes_markdown() {
        let text = "a_b";
        let lines: HaikuLines = [vec![0], vec![], vec![]];
        assert_eq!(format_haiku(text, &lines), "*a\\_b*\n**\n**");
    }

    #[tokio::test]
    async fn test_settings_round_trip() -> Result<()> {
        let db = setup_test_db().await?;
        const GUILD: u64 = 821_043_163_716_124_713;

        assert!(get_settings(&db, GUILD).await?.is_none());
        assert!(!disable(&db, GUILD).await?);

        let settings = upsert_settings(&db, GUILD, Some(42), true, false).await?;
        assert!(settings.enabled);
        assert_eq!(settings.channel_id, Some(42));

        let settings = upsert_settings(&db, GUILD, None, false, true).await?;
        assert_eq!(settings.channel_id, None);
        assert!(settings.react);

        assert!(disable(&db, GUILD).await?);
        assert!(!get_settings(&db, GUILD).await?.unwrap().enabled);
        Ok(())
    }

    #[tokio::test]
    async fn test_setup_defaults() -> Result<()> {
        let db = setup_test_db().await?;
        const GUILD: u64 = 42;

        let settings = enable_haiku(&db, GUILD).await?;
        assert!(settings.enabled);
        assert!(settings.announce);
        assert!(!settings.react);
        assert!(settings.channel_id.is_none());
        Ok(())
    }
}
