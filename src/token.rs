use crate::error::ErrorKind;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span, used for errors reported at the end of the input.
    pub fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn to(self, other: Span) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Punctuation
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    OpenParen,
    CloseParen,
    Comma,

    Identifier, // NOTE: The name of the identifier is stored in the token's span.

    // Literals
    Number(f64),

    End,
    /// Something the lexer could not make sense of. Never recovered from.
    Error(ErrorKind),
}

impl Token {
    /// The slice of `source` this token was scanned from.
    pub fn text<'source>(&self, source: &'source str) -> &'source str {
        &source[self.span.start..self.span.end]
    }
}
