//! Discord markdown handling for haiku text.

/// Paired delimiters removed from message text, in the order they are tried.
const DELIMITERS: &[&str] = &["__", "_", "**", "*", "~~", "||", "```", "`"];

/// Characters that need a backslash to show up literally in Discord.
const ESCAPED: &[char] = &['\\', '*', '_', '~', '|', '`'];

/// Removes markdown formatting, keeping the formatted text.
///
/// For each delimiter in turn, the first and last occurrence are dropped as long as they
/// enclose at least one character, which mirrors a greedy `(d)(.+)(d)` replacement
/// applied until nothing matches.
#[must_use]
pub fn strip_markdown(text: &str) -> String {
    let mut text = text.to_string();

    for delimiter in DELIMITERS {
        while let Some((start, end)) = enclosing_pair(&text, delimiter) {
            text.replace_range(end..end + delimiter.len(), "");
            text.replace_range(start..start + delimiter.len(), "");
        }
    }
    text
}

fn enclosing_pair(text: &str, delimiter: &str) -> Option<(usize, usize)> {
    let start = text.find(delimiter)?;
    let end = text.rfind(delimiter)?;
    (end > start + delimiter.len()).then_some((start, end))
}

/// Escapes markdown so the text renders exactly as written.
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if ESCAPED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
