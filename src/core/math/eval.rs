//! Tree evaluation with the exponent guard.

use super::{BinOp, Expr};
use thiserror::Error;

/// Largest exponent the evaluator will compute.
pub const MAX_EXPONENT: f64 = 10.0;

/// The expression parsed but has no usable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Division by zero, including zero raised to a negative power
    #[error("division by zero")]
    DivideByZero,
    /// Exponent above [`MAX_EXPONENT`], or a result too large for an `f64`
    #[error("number too large")]
    Overflow,
    /// A negative base raised to a fractional power
    #[error("result is not a real number")]
    NotReal,
}

/// Reduces `expr` to a number, children before parents.
///
/// For `**` the exponent is evaluated first and checked against [`MAX_EXPONENT`] before
/// the base is touched.
///
/// # Errors
/// See [`EvalError`].
pub fn evaluate(expr: &Expr) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Binary {
            op: BinOp::Pow,
            left,
            right,
        } => {
            let exponent = evaluate(right)?;
            check_exponent(exponent)?;
            power(evaluate(left)?, exponent)
        }
        Expr::Binary { op, left, right } => {
            let lhs = evaluate(left)?;
            let rhs = evaluate(right)?;
            finite(apply(*op, lhs, rhs)?)
        }
    }
}

// An infinite operand would slip past the exponent guard as `-inf`
fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::Overflow)
    }
}

fn apply(op: BinOp, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
    match op {
        BinOp::Add => Ok(lhs + rhs),
        BinOp::Sub => Ok(lhs - rhs),
        BinOp::Mul => Ok(lhs * rhs),
        BinOp::Div if rhs == 0.0 => Err(EvalError::DivideByZero),
        BinOp::Div => Ok(lhs / rhs),
        BinOp::Pow => {
            check_exponent(rhs)?;
            power(lhs, rhs)
        }
    }
}

fn check_exponent(exponent: f64) -> Result<(), EvalError> {
    if exponent > MAX_EXPONENT {
        Err(EvalError::Overflow)
    } else {
        Ok(())
    }
}

fn power(base: f64, exponent: f64) -> Result<f64, EvalError> {
    if base == 0.0 && exponent < 0.0 {
        return Err(EvalError::DivideByZero);
    }

    // Integral exponents go through powi so small powers stay exact
    #[allow(clippy::cast_possible_truncation)]
    let value = if exponent.fract() == 0.0 && exponent.abs() <= f64::from(i32::MAX) {
        base.powi(exponent as i32)
    } else {
        base.powf(exponent)
    };

    if value.is_nan() {
        Err(EvalError::NotReal)
    } else if value.is_infinite() {
        Err(EvalError::Overflow)
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::math::parse;

    fn eval(normalized: &str) -> Result<f64, EvalError> {
        evaluate(&parse(normalized).unwrap())
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(eval("1+2"), Ok(3.0));
        assert_eq!(eval("5-7"), Ok(-2.0));
        assert_eq!(eval("6*7"), Ok(42.0));
        assert_eq!(eval("7/2"), Ok(3.5));
        assert_eq!(eval("(2+3)*(4-1)"), Ok(15.0));
        assert_eq!(eval("-(3)"), Ok(-3.0));
    }

    #[test]
    fn test_exponent_threshold_is_inclusive() {
        assert_eq!(eval("3**10"), Ok(59049.0));
        assert_eq!(eval("3**10.5"), Err(EvalError::Overflow));
        assert_eq!(eval("1**11"), Err(EvalError::Overflow));
        assert_eq!(eval("2**(2*5)"), Ok(1024.0));
        assert_eq!(eval("2**(2*6)"), Err(EvalError::Overflow));
    }

    #[test]
    fn test_exponent_guard_runs_before_base() {
        // The base divides by zero, but the oversized exponent is reported first
        assert_eq!(eval("(1/0)**11"), Err(EvalError::Overflow));
        assert_eq!(eval("(1/0)**2"), Err(EvalError::DivideByZero));
    }

    #[test]
    fn test_base_magnitude_is_not_bounded() {
        assert_eq!(eval("1000000**2"), Ok(1e12));
        assert_eq!(eval("10**-3"), Ok(0.001));
    }

    #[test]
    fn test_pow_edge_cases() {
        assert_eq!(eval("0**0"), Ok(1.0));
        assert_eq!(eval("0**-1"), Err(EvalError::DivideByZero));
        assert_eq!(eval("(0-8)**0.5"), Err(EvalError::NotReal));
        assert_eq!(eval("4**0.5"), Ok(2.0));
        assert_eq!(eval("(0-2)**3"), Ok(-8.0));
    }

    #[test]
    fn test_float_overflow_in_pow() {
        let huge = format!("{}**10", "9".repeat(300));
        assert_eq!(eval(&huge), Err(EvalError::Overflow));
    }

    #[test]
    fn test_infinite_intermediates_overflow() {
        let nines = "9".repeat(300);
        assert_eq!(eval(&format!("{nines}*{nines}")), Err(EvalError::Overflow));
        assert_eq!(eval(&format!("2**-({nines}*{nines})")), Err(EvalError::Overflow));
        assert_eq!(eval(&format!("1/({nines}*{nines})")), Err(EvalError::Overflow));
        assert_eq!(eval(&format!("0-{nines}*{nines}")), Err(EvalError::Overflow));
        assert_eq!(eval(&format!("{nines}/{nines}")), Ok(1.0));
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(eval("1/0"), Err(EvalError::DivideByZero));
        assert_eq!(eval("0/0"), Err(EvalError::DivideByZero));
        assert_eq!(eval("1/(3-3)"), Err(EvalError::DivideByZero));
        assert_eq!(eval("0/5"), Ok(0.0));
    }

    #[test]
    fn test_apply_guards_pow_too() {
        assert_eq!(apply(BinOp::Pow, 2.0, 11.0), Err(EvalError::Overflow));
        assert_eq!(apply(BinOp::Pow, 2.0, 3.0), Ok(8.0));
    }
}
