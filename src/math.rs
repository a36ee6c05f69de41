//! Arithmetic primitives. Both the constant folder and the evaluator go
//! through these, so a folded constant is bit-for-bit what evaluation would
//! have produced.

use crate::ast::{BinaryOperator, UnaryOperator};

impl UnaryOperator {
    #[inline]
    pub fn apply(self, operand: f64) -> f64 {
        match self {
            UnaryOperator::Neg => -operand,
        }
    }
}

impl BinaryOperator {
    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOperator::Add => lhs + rhs,
            BinaryOperator::Sub => lhs - rhs,
            BinaryOperator::Mul => lhs * rhs,
            BinaryOperator::Div => lhs / rhs,
            BinaryOperator::Mod => lhs % rhs,
            BinaryOperator::Pow => pow(lhs, rhs),
        }
    }
}

#[inline]
pub fn pow(base: f64, exponent: f64) -> f64 {
    base.powf(exponent)
}

/// -1, 0 or 1. Unlike [`f64::signum`], zero maps to zero.
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        // 0.0, -0.0 and NaN
        x
    }
}

/// Smallest argument, or NaN if any argument is NaN.
pub fn min(args: &[f64]) -> f64 {
    args.iter().copied().fold(f64::INFINITY, |acc, x| {
        if x.is_nan() || acc.is_nan() {
            f64::NAN
        } else {
            acc.min(x)
        }
    })
}

/// Largest argument, or NaN if any argument is NaN.
pub fn max(args: &[f64]) -> f64 {
    args.iter().copied().fold(f64::NEG_INFINITY, |acc, x| {
        if x.is_nan() || acc.is_nan() {
            f64::NAN
        } else {
            acc.max(x)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ieee_division() {
        assert_eq!(BinaryOperator::Div.apply(1.0, 0.0), f64::INFINITY);
        assert_eq!(BinaryOperator::Div.apply(-1.0, 0.0), f64::NEG_INFINITY);
        assert!(BinaryOperator::Div.apply(0.0, 0.0).is_nan());
        assert!(BinaryOperator::Mod.apply(1.0, 0.0).is_nan());
    }

    #[test]
    fn modulo_keeps_sign_of_dividend() {
        assert_eq!(BinaryOperator::Mod.apply(7.0, 3.0), 1.0);
        assert_eq!(BinaryOperator::Mod.apply(-7.0, 3.0), -1.0);
        assert_eq!(BinaryOperator::Mod.apply(5.5, 2.0), 1.5);
    }

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-3.5), -1.0);
        assert_eq!(sign(f64::INFINITY), 1.0);
        assert!(sign(f64::NAN).is_nan());
    }

    #[test]
    fn min_max_propagate_nan() {
        assert_eq!(min(&[3.0, -1.0, 2.0]), -1.0);
        assert_eq!(max(&[3.0, -1.0, 2.0]), 3.0);
        assert!(min(&[1.0, f64::NAN]).is_nan());
        assert!(max(&[f64::NAN, 1.0]).is_nan());
    }
}
