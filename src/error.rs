use std::fmt::Display;

use miette::{Diagnostic, LabeledSpan};
use thiserror::Error;

use crate::token::Span;

/// Everything that can go wrong while compiling an expression.
///
/// Evaluation itself never fails: numeric anomalies travel through IEEE-754
/// NaN and infinity instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("unknown variable or function")]
    UnknownVariable,
    #[error("wrong number of arguments")]
    ArityMismatch,
    #[error("unmatched parenthesis")]
    UnmatchedParen,
    #[error("unexpected input after the end of the expression")]
    TrailingInput,
    #[error("empty expression")]
    EmptyExpression,
    #[error("invalid number literal")]
    InvalidNumber,
    #[error("expression is too long")]
    ExpressionTooLong,
    #[error("expression is nested too deeply")]
    NestingTooDeep,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnexpectedToken => "unexpected_token",
            ErrorKind::UnknownVariable => "unknown_variable",
            ErrorKind::ArityMismatch => "arity_mismatch",
            ErrorKind::UnmatchedParen => "unmatched_paren",
            ErrorKind::TrailingInput => "trailing_input",
            ErrorKind::EmptyExpression => "empty_expression",
            ErrorKind::InvalidNumber => "invalid_number",
            ErrorKind::ExpressionTooLong => "expression_too_long",
            ErrorKind::NestingTooDeep => "nesting_too_deep",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ErrorKind::UnexpectedToken => "unexpected here",
            ErrorKind::UnknownVariable => "not bound",
            ErrorKind::ArityMismatch => "here",
            ErrorKind::UnmatchedParen => "expected a matching parenthesis",
            ErrorKind::TrailingInput => "expected end of input",
            ErrorKind::EmptyExpression => "expected an expression",
            ErrorKind::InvalidNumber => "malformed number",
            ErrorKind::ExpressionTooLong => "input is cut off here",
            ErrorKind::NestingTooDeep => "too deep",
        }
    }

    fn help(&self) -> Option<&'static str> {
        match self {
            ErrorKind::TrailingInput => {
                Some("implicit multiplication is not supported, write `2*x` instead of `2x`")
            }
            ErrorKind::UnknownVariable => {
                Some("bind the name in the symbol table before compiling")
            }
            _ => None,
        }
    }
}

/// A compile failure: what went wrong and where in the source.
///
/// Implements [`Diagnostic`], so a caller can render it with a caret under the
/// offending text by attaching the source code to a `miette::Report`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {}", .span.start)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub span: Span,
}

impl CompileError {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Byte offset in the source where the problem was detected.
    pub fn offset(&self) -> usize {
        self.span.start
    }
}

impl Diagnostic for CompileError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.kind
            .help()
            .map(|help| Box::new(help) as Box<dyn Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::at(
            self.span.start..self.span.end,
            self.kind.label(),
        ))))
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
