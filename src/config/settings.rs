//! Bot settings loading from config.toml
//!
//! Everything in the file is optional. A missing file or a missing table falls back to
//! the defaults below, which reproduce the reactions the bot has always used.

use crate::errors::{Error, Result};
use serde::{Deserialize, Deserializer, de::Error as _};
use std::{collections::BTreeMap, path::Path};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Register commands in this guild only (fast iteration while developing)
    pub dev_guild_id: Option<u64>,
    /// Counting game options
    pub counting: CountingConfig,
    /// Haiku detector options
    pub haiku: HaikuConfig,
}

/// Counting game options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CountingConfig {
    /// Reaction added to every accepted count
    pub success_reaction: String,
    /// Reaction added to the message that broke the count
    pub failure_reaction: String,
    /// Extra reactions for memorable numbers
    #[serde(deserialize_with = "deserialize_special_numbers")]
    pub special_numbers: BTreeMap<i64, String>,
}

impl Default for CountingConfig {
    fn default() -> Self {
        let special_numbers = [
            (3, "✨"),
            (7, "🍀"),
            (13, "🎲"),
            (21, "🍻"),
            (42, "💻"),
            (66, "🔫"),
            (69, "👌"),
            (100, "💯"),
            (101, "🐕"),
            (404, "⚠️"),
            (420, "🌿"),
            (666, "😈"),
            (1922, "🇷🇺"),
            (2020, "🔥"),
            (7573, "🔁"),
            (9001, "❗"),
        ]
        .into_iter()
        .map(|(number, emoji)| (number, emoji.to_string()))
        .collect();

        Self {
            success_reaction: "✅".to_string(),
            failure_reaction: "❌".to_string(),
            special_numbers,
        }
    }
}

impl CountingConfig {
    /// Returns the extra reaction for `number`, if it has one.
    #[must_use]
    pub fn special_reaction(&self, number: i64) -> Option<&str> {
        self.special_numbers.get(&number).map(String::as_str)
    }
}

/// Haiku detector options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HaikuConfig {
    /// Reaction added to messages that turned out to be haikus
    pub reaction: String,
}

impl Default for HaikuConfig {
    fn default() -> Self {
        Self {
            reaction: "📜".to_string(),
        }
    }
}

// TOML table keys are always strings, so `3 = "✨"` arrives as ("3", "✨").
fn deserialize_special_numbers<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<i64, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, emoji)| {
            key.trim()
                .parse::<i64>()
                .map(|number| (number, emoji))
                .map_err(|_| D::Error::custom(format!("special number `{key}` is not an integer")))
        })
        .collect()
}

/// Parses settings from a TOML string.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from a TOML file. A missing file yields the defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!("No config file at {path:?}, using default settings");
        return Ok(Settings::default());
    }

    tracing::debug!("Loading settings from {path:?}");
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path:?}: {e}"),
    })?;
    parse_settings(&contents)
}

/// Loads settings from `KOSMO_CONFIG`, or ./config.toml when it is unset.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("KOSMO_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_settings(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = parse_settings("").unwrap();
        assert!(settings.dev_guild_id.is_none());
        assert_eq!(settings.counting.success_reaction, "✅");
        assert_eq!(settings.counting.failure_reaction, "❌");
        assert_eq!(settings.counting.special_reaction(100), Some("💯"));
        assert_eq!(settings.counting.special_reaction(99), None);
        assert_eq!(settings.haiku.reaction, "📜");
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            dev_guild_id = 821043163716124713

            [counting]
            success_reaction = "👍"

            [counting.special_numbers]
            5 = "🖐️"
            1000 = "🎉"

            [haiku]
            reaction = "🌸"
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.dev_guild_id, Some(821_043_163_716_124_713));
        assert_eq!(settings.counting.success_reaction, "👍");
        // Unset fields inside a present table still default
        assert_eq!(settings.counting.failure_reaction, "❌");
        // A provided table replaces the default one entirely
        assert_eq!(settings.counting.special_reaction(5), Some("🖐️"));
        assert_eq!(settings.counting.special_reaction(1000), Some("🎉"));
        assert_eq!(settings.counting.special_reaction(100), None);
        assert_eq!(settings.haiku.reaction, "🌸");
    }

    #[test]
    fn test_non_numeric_special_number_is_rejected() {
        let toml_str = r#"
            [counting.special_numbers]
            seven = "🍀"
        "#;

        let result = parse_settings(toml_str);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = load_settings("definitely/not/a/real/config.toml").unwrap();
        assert_eq!(settings.counting.special_numbers.len(), 16);
    }
}
