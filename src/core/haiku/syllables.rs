//! Syllable estimation for English words.
//!
//! There is no pronunciation dictionary behind this; syllables are estimated from vowel
//! groups with a handful of corrections for silent endings and vowels that are spoken
//! separately. Words the rules get wrong often enough live in [`EXCEPTIONS`].

use super::numbers::spell_out;

/// Words whose spelling misleads the vowel-group rules.
const EXCEPTIONS: &[(&str, u32)] = &[
    ("business", 2),
    ("create", 2),
    ("fire", 2),
    ("ninety", 2),
    ("nineteen", 2),
    ("poem", 2),
    ("poet", 2),
    ("science", 2),
];

/// Counts the syllables of one word as it would be read aloud.
///
/// Digit strings are spelled out first (`21` reads "twenty-one"). Hyphenated words are
/// counted part by part. Returns `None` when the word has no countable syllables, or is
/// a number too large to spell.
#[must_use]
pub fn count_syllables(word: &str) -> Option<u32> {
    let spelled;
    let text = if !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit()) {
        spelled = spell_out(word.parse().ok()?);
        spelled.as_str()
    } else {
        word
    };

    let total: u32 = text
        .split(['-', ' '])
        .filter(|part| !part.is_empty())
        .map(estimate)
        .sum();
    (total > 0).then_some(total)
}

/// Estimates the syllables of a single word. Non-letters are ignored; a word without
/// letters has zero syllables.
#[must_use]
pub fn estimate(word: &str) -> u32 {
    let word: Vec<char> = word
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if word.is_empty() {
        return 0;
    }

    let spelled: String = word.iter().collect();
    if let Some((_, count)) = EXCEPTIONS.iter().find(|(exception, _)| *exception == spelled) {
        return *count;
    }

    let mut count = vowel_groups(&word) + hiatuses(&word);
    if count > 1 && has_silent_ending(&word) {
        count -= 1;
    }
    count.max(1)
}

// `y` is a consonant at the start of a word ("yes") and a vowel elsewhere ("happy").
fn is_vowel(word: &[char], index: usize) -> bool {
    match word.get(index) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => true,
        Some('y') => index > 0,
        _ => false,
    }
}

fn vowel_groups(word: &[char]) -> u32 {
    let mut groups = 0;
    let mut in_group = false;
    for index in 0..word.len() {
        let vowel = is_vowel(word, index);
        if vowel && !in_group {
            groups += 1;
        }
        in_group = vowel;
    }
    groups
}

/// Adjacent vowels that are spoken as two syllables ("li-on", "go-ing", "qui-et").
fn hiatuses(word: &[char]) -> u32 {
    let before = |index: usize| index.checked_sub(1).and_then(|i| word.get(i)).copied();
    let mut count = 0;

    for index in 1..word.len() {
        let pair = (word[index - 1], word[index]);
        let preceding = before(index - 1);
        let following: String = word.iter().skip(index + 1).take(2).collect();

        let split = match pair {
            ('i', 'a') => !matches!(preceding, Some('c' | 't' | 's' | 'g')),
            ('i', 'o') => {
                !matches!(preceding, Some('c' | 't' | 's' | 'g' | 'x'))
                    && !(preceding == Some('l') && before(index - 2) == Some('l'))
            }
            ('u', 'a') => !matches!(preceding, Some('q' | 'g')),
            ('e', 'a') => index + 1 == word.len(),
            ('i', 'e') => following.starts_with('t'),
            (_, 'i') => is_vowel(word, index - 1) && following == "ng",
            _ => false,
        };
        if split {
            count += 1;
        }
    }
    count
}

fn has_silent_ending(word: &[char]) -> bool {
    let len = word.len();
    let is_consonant = |index: usize| index < len && !is_vowel(word, index);

    match word {
        // "table" keeps its final syllable, "whale" does not
        [.., 'l', 'e'] if len >= 3 && is_consonant(len - 3) => false,
        [.., 'e'] => len >= 2 && is_consonant(len - 2),
        // "hundred" and "sacred" keep it, "bored" does not
        [.., 'r', 'e', 'd'] if len >= 4 && is_consonant(len - 4) => false,
        [.., prev, 'e', 'd'] => is_consonant(len - 3) && !matches!(prev, 't' | 'd'),
        [.., 'c' | 's', 'h', 'e', 's'] => false,
        [.., prev, 'e', 's'] => is_consonant(len - 3) && !matches!(prev, 's' | 'x' | 'z' | 'c' | 'g'),
        _ => false,
    }
}
