//! Recursive-descent parser producing [`Expr`] trees.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expression := term (("+" | "-") term)*
//! term       := unary (("*" | "/") unary)*
//! unary      := "-" unary | power
//! power      := atom ("**" unary)?
//! atom       := NUMBER | "(" expression ")"
//! ```
//!
//! `**` binds tighter than unary minus on its left (`-2**2` is `-4`) and is
//! right-associative (`2**3**2` is `2**9`).

use super::lexer::{Lexeme, Token, tokenize};
use super::{BinOp, Expr};
use thiserror::Error;

/// How deeply parentheses, unary minus and exponents may nest.
pub const MAX_NESTING: usize = 200;

const ADDITIVE: &[(Token, BinOp)] = &[(Token::Plus, BinOp::Add), (Token::Minus, BinOp::Sub)];
const MULTIPLICATIVE: &[(Token, BinOp)] = &[(Token::Star, BinOp::Mul), (Token::Slash, BinOp::Div)];

/// The text passed the whitelist but is not a well-formed expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Unbalanced parentheses, dangling operators, empty operands, trailing input
    #[error("malformed expression at offset {offset}: {reason}")]
    Malformed {
        /// Byte offset into the normalized text
        offset: usize,
        /// Short description of the problem
        reason: &'static str,
    },
}

/// Parses a normalized expression (the output of [`super::sanitize`]).
///
/// # Errors
/// Returns [`ParseError::Malformed`] for anything the grammar cannot reduce, and for
/// nesting deeper than [`MAX_NESTING`].
pub fn parse(normalized: &str) -> Result<Expr, ParseError> {
    let lexemes = tokenize(normalized)?;
    let mut parser = Parser {
        lexemes: &lexemes,
        position: 0,
        depth: 0,
        end: normalized.len(),
    };

    let expr = parser.expression()?;
    if parser.peek().is_some() {
        return Err(parser.malformed("unexpected trailing input"));
    }
    Ok(expr)
}

struct Parser<'a> {
    lexemes: &'a [Lexeme],
    position: usize,
    depth: usize,
    end: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.lexemes.get(self.position).map(|lexeme| lexeme.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.position += 1;
        Some(token)
    }

    fn eat(&mut self, expected: Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn operator(&mut self, table: &[(Token, BinOp)]) -> Option<BinOp> {
        let token = self.peek()?;
        let (_, op) = table.iter().find(|(candidate, _)| *candidate == token)?;
        self.position += 1;
        Some(*op)
    }

    fn malformed(&self, reason: &'static str) -> ParseError {
        let offset = self
            .lexemes
            .get(self.position)
            .map_or(self.end, |lexeme| lexeme.offset);
        ParseError::Malformed { offset, reason }
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.malformed("expression nested too deeply"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.term()?;
        while let Some(op) = self.operator(ADDITIVE) {
            let right = self.term()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;
        while let Some(op) = self.operator(MULTIPLICATIVE) {
            let right = self.unary()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat(Token::Minus) {
            let operand = self.nested(Self::unary)?;
            return Ok(Expr::binary(BinOp::Sub, Expr::Number(0.0), operand));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.atom()?;
        if self.eat(Token::Pow) {
            let exponent = self.nested(Self::unary)?;
            return Ok(Expr::binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some(Token::Number(value)) => {
                self.advance();
                Ok(Expr::Number(value))
            }
            Some(Token::LParen) => {
                self.advance();
                let inner = self.nested(Self::expression)?;
                if self.eat(Token::RParen) {
                    Ok(inner)
                } else {
                    Err(self.malformed("unclosed parenthesis"))
                }
            }
            Some(_) => Err(self.malformed("expected a number or '('")),
            None => Err(self.malformed("unexpected end of input")),
        }
    }
}
