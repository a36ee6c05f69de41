use std::f64::consts;

use crate::ast::Function;
use crate::math;
use crate::symbols::{Arity, Resolved};

/// The fixed set of names every expression can use without binding them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Builtin {
    // Constants
    Pi,
    E,

    // Functions
    Abs,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Sqrt,
    Exp,
    Ln,
    Log,
    Log2,
    Floor,
    Ceil,
    Round,
    Int,
    Sign,
    Pow,
    Atan2,
    Min,
    Max,
}

impl Builtin {
    pub const ALL: [Builtin; 29] = [
        Builtin::Pi,
        Builtin::E,
        Builtin::Abs,
        Builtin::Sin,
        Builtin::Cos,
        Builtin::Tan,
        Builtin::Asin,
        Builtin::Acos,
        Builtin::Atan,
        Builtin::Sinh,
        Builtin::Cosh,
        Builtin::Tanh,
        Builtin::Asinh,
        Builtin::Acosh,
        Builtin::Atanh,
        Builtin::Sqrt,
        Builtin::Exp,
        Builtin::Ln,
        Builtin::Log,
        Builtin::Log2,
        Builtin::Floor,
        Builtin::Ceil,
        Builtin::Round,
        Builtin::Int,
        Builtin::Sign,
        Builtin::Pow,
        Builtin::Atan2,
        Builtin::Min,
        Builtin::Max,
    ];

    pub fn lookup(name: &str) -> Option<Builtin> {
        Some(match name {
            "pi" => Builtin::Pi,
            "e" => Builtin::E,
            "abs" => Builtin::Abs,
            "sin" => Builtin::Sin,
            "cos" => Builtin::Cos,
            "tan" => Builtin::Tan,
            "asin" => Builtin::Asin,
            "acos" => Builtin::Acos,
            "atan" => Builtin::Atan,
            "sinh" => Builtin::Sinh,
            "cosh" => Builtin::Cosh,
            "tanh" => Builtin::Tanh,
            "asinh" => Builtin::Asinh,
            "acosh" => Builtin::Acosh,
            "atanh" => Builtin::Atanh,
            "sqrt" => Builtin::Sqrt,
            "exp" => Builtin::Exp,
            "ln" => Builtin::Ln,
            "log" => Builtin::Log,
            "log2" => Builtin::Log2,
            "floor" => Builtin::Floor,
            "ceil" => Builtin::Ceil,
            "round" => Builtin::Round,
            "int" => Builtin::Int,
            "sign" => Builtin::Sign,
            "pow" => Builtin::Pow,
            "atan2" => Builtin::Atan2,
            "min" => Builtin::Min,
            "max" => Builtin::Max,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Pi => "pi",
            Builtin::E => "e",
            Builtin::Abs => "abs",
            Builtin::Sin => "sin",
            Builtin::Cos => "cos",
            Builtin::Tan => "tan",
            Builtin::Asin => "asin",
            Builtin::Acos => "acos",
            Builtin::Atan => "atan",
            Builtin::Sinh => "sinh",
            Builtin::Cosh => "cosh",
            Builtin::Tanh => "tanh",
            Builtin::Asinh => "asinh",
            Builtin::Acosh => "acosh",
            Builtin::Atanh => "atanh",
            Builtin::Sqrt => "sqrt",
            Builtin::Exp => "exp",
            Builtin::Ln => "ln",
            Builtin::Log => "log",
            Builtin::Log2 => "log2",
            Builtin::Floor => "floor",
            Builtin::Ceil => "ceil",
            Builtin::Round => "round",
            Builtin::Int => "int",
            Builtin::Sign => "sign",
            Builtin::Pow => "pow",
            Builtin::Atan2 => "atan2",
            Builtin::Min => "min",
            Builtin::Max => "max",
        }
    }

    /// `None` for constants.
    pub fn arity(&self) -> Option<Arity> {
        match self.resolve() {
            Resolved::Function(function) => Some(function.arity()),
            _ => None,
        }
    }

    /// Map the built-in onto a direct function reference, so evaluation
    /// never dispatches on the built-in's identity.
    pub(crate) fn resolve(self) -> Resolved<'static> {
        let name = self.name();
        let unary = |func: fn(f64) -> f64| Resolved::Function(Function::Unary { name, func });
        let binary =
            |func: fn(f64, f64) -> f64| Resolved::Function(Function::Binary { name, func });

        match self {
            Builtin::Pi => Resolved::Constant(consts::PI),
            Builtin::E => Resolved::Constant(consts::E),
            Builtin::Abs => unary(f64::abs),
            Builtin::Sin => unary(f64::sin),
            Builtin::Cos => unary(f64::cos),
            Builtin::Tan => unary(f64::tan),
            Builtin::Asin => unary(f64::asin),
            Builtin::Acos => unary(f64::acos),
            Builtin::Atan => unary(f64::atan),
            Builtin::Sinh => unary(f64::sinh),
            Builtin::Cosh => unary(f64::cosh),
            Builtin::Tanh => unary(f64::tanh),
            Builtin::Asinh => unary(f64::asinh),
            Builtin::Acosh => unary(f64::acosh),
            Builtin::Atanh => unary(f64::atanh),
            Builtin::Sqrt => unary(f64::sqrt),
            Builtin::Exp => unary(f64::exp),
            Builtin::Ln => unary(f64::ln),
            Builtin::Log => unary(f64::log10),
            Builtin::Log2 => unary(f64::log2),
            Builtin::Floor => unary(f64::floor),
            Builtin::Ceil => unary(f64::ceil),
            Builtin::Round => unary(f64::round),
            Builtin::Int => unary(f64::trunc),
            Builtin::Sign => unary(math::sign),
            Builtin::Pow => binary(math::pow),
            Builtin::Atan2 => binary(f64::atan2),
            Builtin::Min => Resolved::Function(Function::Variadic {
                name,
                arity: Arity::AtLeast(1),
                func: math::min,
            }),
            Builtin::Max => Resolved::Function(Function::Variadic {
                name,
                arity: Arity::AtLeast(1),
                func: math::max,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_is_found_by_its_name() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::lookup(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::lookup("foo"), None);
    }

    #[test]
    fn arities() {
        assert_eq!(Builtin::Pi.arity(), None);
        assert_eq!(Builtin::Sqrt.arity(), Some(Arity::Exact(1)));
        assert_eq!(Builtin::Pow.arity(), Some(Arity::Exact(2)));
        assert_eq!(Builtin::Max.arity(), Some(Arity::AtLeast(1)));
    }

    #[test]
    fn log_flavours() {
        let call = |builtin: Builtin, x: f64| match builtin.resolve() {
            Resolved::Function(Function::Unary { func, .. }) => func(x),
            _ => unreachable!(),
        };
        assert_eq!(call(Builtin::Log, 1000.0), 3.0);
        assert_eq!(call(Builtin::Log2, 8.0), 3.0);
        assert_eq!(call(Builtin::Ln, 1.0), 0.0);
    }
}
