//! Input sanitizing and tokenizing.

use super::parser::ParseError;

/// Longest text that is considered at all. Discord caps messages at 4000 characters.
pub const MAX_INPUT_LEN: usize = 4000;

/// Characters allowed besides ASCII digits.
const ALLOWED: &[char] = &['(', ')', 'x', '^', '-', '+', '.', '/', ' '];

/// Member-facing spellings and the operators they stand for.
const ALIASES: &[(char, &str)] = &[('x', "*"), ('^', "**")];

/// Checks `text` against the expression whitelist and normalizes it.
///
/// A lone digit is returned untouched. Anything else must consist only of digits and
/// `()x^-+./ `. Operator aliases are rewritten (`x` to `*`, `^` to `**`), and a `*` is
/// inserted wherever a digit or `)` is immediately followed by `(`.
#[must_use]
pub fn sanitize(text: &str) -> Option<String> {
    if text.len() == 1 && text.as_bytes()[0].is_ascii_digit() {
        return Some(text.to_string());
    }

    if text.is_empty()
        || text.len() > MAX_INPUT_LEN
        || !text.chars().all(|c| c.is_ascii_digit() || ALLOWED.contains(&c))
    {
        return None;
    }

    let mut normalized = String::with_capacity(text.len() + 8);
    let mut previous: Option<char> = None;
    for c in text.chars() {
        if c == '(' && previous.is_some_and(|p| p == ')' || p.is_ascii_digit()) {
            normalized.push('*');
        }

        match ALIASES.iter().find(|(alias, _)| *alias == c) {
            Some((_, canonical)) => normalized.push_str(canonical),
            None => normalized.push(c),
        }
        previous = Some(c);
    }

    Some(normalized)
}

/// A lexical token of a normalized expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    /// Integer or decimal literal
    Number(f64),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `**`
    Pow,
    /// `(`
    LParen,
    /// `)`
    RParen,
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lexeme {
    /// The token itself
    pub token: Token,
    /// Byte offset into the normalized text
    pub offset: usize,
}

/// Splits a normalized expression into tokens. Spaces only separate tokens.
///
/// # Errors
/// Fails on characters outside the normalized alphabet and on literals that are not
/// numbers (`.`, `1.2.3`).
pub fn tokenize(normalized: &str) -> Result<Vec<Lexeme>, ParseError> {
    let mut lexemes = Vec::new();
    let mut chars = normalized.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let token = match c {
            ' ' => continue,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '*' => {
                if chars.next_if(|&(_, next)| next == '*').is_some() {
                    Token::Pow
                } else {
                    Token::Star
                }
            }
            '0'..='9' | '.' => {
                let mut end = offset + 1;
                while let Some((i, _)) = chars.next_if(|&(_, next)| next.is_ascii_digit() || next == '.') {
                    end = i + 1;
                }
                Token::Number(number_literal(&normalized[offset..end], offset)?)
            }
            _ => {
                return Err(ParseError::Malformed {
                    offset,
                    reason: "unexpected character",
                });
            }
        };

        lexemes.push(Lexeme { token, offset });
    }

    Ok(lexemes)
}

fn number_literal(literal: &str, offset: usize) -> Result<f64, ParseError> {
    // Rust's float grammar accepts `1.` and `.5` but not `.` or `1.2.3`
    let value: f64 = literal.parse().map_err(|_| ParseError::Malformed {
        offset,
        reason: "invalid number",
    })?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::Malformed {
            offset,
            reason: "number too large",
        })
    }
}
