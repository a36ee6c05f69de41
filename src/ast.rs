use std::fmt;

use crate::symbols::{Arity, Var};
use crate::token::Span;

#[derive(Debug, PartialEq, Clone)]
pub struct TokenTree<T> {
    pub node: T,
    pub span: Span,
}

impl<T> TokenTree<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Expression tree produced by the parser. Every name in it has already been
/// resolved, so nothing here refers to an unknown identifier.
#[derive(Debug, Clone)]
pub enum Expression<'a> {
    Literal(f64),
    Variable {
        name: &'a str,
        var: &'a Var,
    },
    UnaryOp {
        op: TokenTree<UnaryOperator>,
        operand: Box<TokenTree<Expression<'a>>>,
    },
    /// `lhs op0 rhs0 op1 rhs1 ...`, combined left to right. A run of
    /// left-associative operators stays flat here instead of nesting, so the
    /// tree is never taller than the parser's nesting limit.
    BinaryOp {
        lhs: Box<TokenTree<Expression<'a>>>,
        rest: Vec<(TokenTree<BinaryOperator>, TokenTree<Expression<'a>>)>,
    },
    Call {
        function: Function<'a>,
        args: Vec<TokenTree<Expression<'a>>>,
    },
}

impl<'a> Expression<'a> {
    pub fn as_literal(&self) -> Option<f64> {
        match self {
            Expression::Literal(value) => Some(*value),
            _ => None,
        }
    }

    /// Number of nodes in the tree rooted here.
    pub fn node_count(&self) -> usize {
        match self {
            Expression::Literal(_) | Expression::Variable { .. } => 1,
            Expression::UnaryOp { operand, .. } => 1 + operand.node.node_count(),
            Expression::BinaryOp { lhs, rest } => {
                1 + lhs.node.node_count()
                    + rest.iter().map(|(_, rhs)| rhs.node.node_count()).sum::<usize>()
            }
            Expression::Call { args, .. } => {
                1 + args.iter().map(|arg| arg.node.node_count()).sum::<usize>()
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Neg,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "^",
        })
    }
}

/// A resolved function: its name and a direct reference to the primitive.
#[derive(Debug, Clone, Copy)]
pub enum Function<'a> {
    Unary {
        name: &'a str,
        func: fn(f64) -> f64,
    },
    Binary {
        name: &'a str,
        func: fn(f64, f64) -> f64,
    },
    Variadic {
        name: &'a str,
        arity: Arity,
        func: fn(&[f64]) -> f64,
    },
}

impl<'a> Function<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Function::Unary { name, .. }
            | Function::Binary { name, .. }
            | Function::Variadic { name, .. } => name,
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Function::Unary { .. } => Arity::Exact(1),
            Function::Binary { .. } => Arity::Exact(2),
            Function::Variadic { arity, .. } => *arity,
        }
    }

    /// Call the primitive. `args` must satisfy [`Function::arity`].
    pub fn call(&self, args: &[f64]) -> f64 {
        match self {
            Function::Unary { func, .. } => func(args[0]),
            Function::Binary { func, .. } => func(args[0], args[1]),
            Function::Variadic { func, .. } => func(args),
        }
    }
}
