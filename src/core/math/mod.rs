//! Bounded arithmetic for the counting game.
//!
//! Members may write their count as a small expression (`2x3`, `(1+2)^2`, `10/2`). The
//! text goes through four stages:
//!
//! 1. [`sanitize`] checks the character whitelist, rewrites operator aliases and makes
//!    implicit multiplication explicit.
//! 2. [`parse`] tokenizes the result and builds an [`Expr`] tree.
//! 3. [`evaluate`] reduces the tree, refusing exponents above [`MAX_EXPONENT`].
//! 4. [`try_compute`] chains the three and turns every failure into `None`.
//!
//! [`Expr`] only has numbers and the five binary operators. Nothing else can be
//! represented, so nothing else can be evaluated.

mod eval;
mod lexer;
mod parser;

use std::fmt;
use thiserror::Error;

pub use eval::{EvalError, MAX_EXPONENT, evaluate};
pub use lexer::{Lexeme, MAX_INPUT_LEN, Token, sanitize, tokenize};
pub use parser::{MAX_NESTING, ParseError, parse};

/// Binary operators understood by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`, written `x` by members
    Mul,
    /// `/`
    Div,
    /// `**`, written `^` by members
    Pow,
}

impl BinOp {
    /// Canonical spelling of the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
        }
    }
}

/// A parsed arithmetic expression.
///
/// Unary minus is stored as `0 - operand` so every inner node has exactly two children.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// `left op right`
    Binary {
        /// Operator joining the two operands
        op: BinOp,
        /// Left operand
        left: Box<Expr>,
        /// Right operand
        right: Box<Expr>,
    },
}

impl Expr {
    /// Builds a binary node.
    #[must_use]
    pub fn binary(op: BinOp, left: Self, right: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
        }
    }
}

/// Why a piece of text did not produce a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    /// The text contains characters no expression may contain
    #[error("input is not an arithmetic expression")]
    RejectedInput,
    /// The text looks like arithmetic but does not parse
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The expression parsed but cannot be evaluated
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Runs the full pipeline, keeping the reason for a failure.
///
/// # Errors
/// Returns the first stage that failed. A result that does not fit in an `f64` is
/// reported as [`EvalError::Overflow`].
pub fn compute(text: &str) -> Result<f64, MathError> {
    let normalized = sanitize(text).ok_or(MathError::RejectedInput)?;
    let expr = parse(&normalized)?;
    let value = evaluate(&expr)?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::Overflow.into())
    }
}

/// Evaluates `text` as a bounded arithmetic expression, or returns `None`.
///
/// The result may be fractional; deciding whether that is acceptable is up to the caller.
#[must_use]
pub fn try_compute(text: &str) -> Option<f64> {
    compute(text)
        .inspect_err(|e| tracing::debug!("Not a usable expression {text:?}: {e}"))
        .ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_single_digits() {
        for digit in 0..=9_u8 {
            let text = digit.to_string();
            assert_eq!(try_compute(&text), Some(f64::from(digit)));
        }
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(try_compute("2(3)"), Some(6.0));
        assert_eq!(try_compute("2*3"), None); // `*` is not a member-facing character
        assert_eq!(try_compute("2x3"), Some(6.0));
        assert_eq!(try_compute("(1+1)(2+1)"), Some(6.0));
        assert_eq!(try_compute("2(3)(4)"), Some(24.0));
    }

    #[test]
    fn test_exponent_guard() {
        assert_eq!(try_compute("2^3"), Some(8.0));
        assert_eq!(try_compute("2^10"), Some(1024.0));
        assert_eq!(try_compute("2^11"), None);
        assert_eq!(try_compute("9999^9999"), None);
        assert_eq!(try_compute("2^(5+6)"), None);
        assert_eq!(compute("2^11"), Err(MathError::Eval(EvalError::Overflow)));
    }

    #[test]
    fn test_overflow_hidden_in_exponent() {
        let nines = "9".repeat(300);
        assert_eq!(try_compute(&format!("2^-({nines}x{nines})")), None);
        assert_eq!(try_compute(&format!("1/({nines}x{nines})")), None);
        assert_eq!(
            compute(&format!("{nines}x{nines}")),
            Err(MathError::Eval(EvalError::Overflow))
        );
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(try_compute("1/0"), None);
        assert_eq!(try_compute("1/(2-2)"), None);
        assert_eq!(compute("1/0"), Err(MathError::Eval(EvalError::DivideByZero)));
    }

    #[test]
    fn test_precedence_and_grouping() {
        assert_eq!(try_compute("(1+2)x3"), Some(9.0));
        assert_eq!(try_compute("(1+2)(3)"), Some(9.0));
        assert_eq!(try_compute("1+2x3"), Some(7.0));
        assert_eq!(try_compute("10-4-3"), Some(3.0));
        // Right-associative: 2^(3^2), not (2^3)^2
        assert_eq!(try_compute("2^3^2"), Some(512.0));
        assert_eq!(try_compute("2^2^3"), Some(256.0));
        assert_eq!(try_compute("2^2^2^2"), None);
        assert_eq!(try_compute("-2^2"), Some(-4.0));
        assert_eq!(try_compute("2^-1"), Some(0.5));
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(try_compute("1+"), None);
        assert_eq!(try_compute("(1+2"), None);
        assert_eq!(try_compute("1+2)"), None);
        assert_eq!(try_compute("()"), None);
        assert_eq!(try_compute("x"), None);
        assert_eq!(try_compute("1 2"), None);
        assert_eq!(try_compute("1.2.3"), None);
        assert!(matches!(compute("1+"), Err(MathError::Parse(_))));
    }

    #[test]
    fn test_rejected_characters() {
        assert_eq!(try_compute("hello"), None);
        assert_eq!(try_compute("1+1 lol"), None);
        assert_eq!(try_compute("2*3"), None);
        assert_eq!(try_compute("__import__('os')"), None);
        assert_eq!(try_compute(""), None);
        assert_eq!(compute("abc"), Err(MathError::RejectedInput));
    }

    #[test]
    fn test_fractional_results_are_returned() {
        assert_eq!(try_compute("1/2"), Some(0.5));
        assert_eq!(try_compute("10/4"), Some(2.5));
        assert_eq!(try_compute(".5+.5"), Some(1.0));
    }

    #[test]
    fn test_repeated_evaluation_is_stable() {
        for text in ["2(3)", "1/0", "(1+2)x3", "7", "nope"] {
            assert_eq!(try_compute(text), try_compute(text));
        }
    }

    #[test]
    fn test_display_parenthesizes_everything() {
        let expr = parse("1+2*3").map(|e| e.to_string());
        assert_eq!(expr.as_deref(), Ok("(1 + (2 * 3))"));
    }
}
