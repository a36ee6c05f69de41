use crate::error::ErrorKind;
use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'source> {
    source: &'source str,
    rest: &'source str,
    pub position: usize,
    peeked: Option<Token>,
    scanned: usize,
    finished: bool,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            peeked: None,
            scanned: 0,
            finished: false,
        }
    }

    pub fn source(&self) -> &'source str {
        self.source
    }

    /// Tokens scanned so far, not counting the end of input.
    pub fn token_count(&self) -> usize {
        self.scanned
    }

    pub fn peek(&mut self) -> &Token {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan(),
        };
        self.peeked.insert(token)
    }

    /// Produce the next token. Once the input is exhausted this keeps
    /// returning [`TokenKind::End`] tokens positioned at the end of the source.
    pub fn next_token(&mut self) -> Token {
        match self.peeked.take() {
            Some(token) => token,
            None => self.scan(),
        }
    }

    fn advance(&mut self, width: usize) {
        self.position += width;
        self.rest = &self.rest[width..];
    }

    fn scan(&mut self) -> Token {
        let skipped = self.rest.len() - self.rest.trim_start().len();
        self.advance(skipped);

        let start = self.position;
        let Some(c) = self.rest.chars().next() else {
            return Token {
                kind: TokenKind::End,
                span: Span::at(start),
            };
        };
        self.advance(c.len_utf8());
        self.scanned += 1;

        macro_rules! token {
            ($kind:ident) => {
                Token {
                    kind: TokenKind::$kind,
                    span: Span::new(start, self.position),
                }
            };
        }

        match c {
            '+' => token!(Plus),
            '-' => token!(Minus),
            '*' => token!(Star),
            '/' => token!(Slash),
            '%' => token!(Percent),
            '^' => token!(Caret),
            '(' => token!(OpenParen),
            ')' => token!(CloseParen),
            ',' => token!(Comma),
            '0'..='9' | '.' => self.parse_number(start),
            c if c.is_ascii_alphabetic() => self.parse_ident(start),
            _ => Token {
                kind: TokenKind::Error(ErrorKind::UnexpectedToken),
                span: Span::new(start, self.position),
            },
        }
    }

    fn parse_ident(&mut self, start: usize) -> Token {
        let len = self
            .rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(self.rest.len());
        self.advance(len);

        Token {
            kind: TokenKind::Identifier,
            span: Span::new(start, self.position),
        }
    }

    /// Scan `digits [. digits] [(e|E) [+|-] digits]`. The first character has
    /// already been consumed. A leading sign is never part of the literal.
    fn parse_number(&mut self, start: usize) -> Token {
        let first = self.source.as_bytes()[start];
        let mut has_digits = first.is_ascii_digit();
        let mut has_fraction = first == b'.';

        loop {
            match self.rest.as_bytes().first() {
                Some(b'0'..=b'9') => {
                    has_digits = true;
                    self.advance(1);
                }
                Some(b'.') if !has_fraction => {
                    has_fraction = true;
                    self.advance(1);
                }
                _ => break,
            }
        }

        if !has_digits {
            // A lone `.`
            return Token {
                kind: TokenKind::Error(ErrorKind::UnexpectedToken),
                span: Span::new(start, self.position),
            };
        }

        if let Some(b'e' | b'E') = self.rest.as_bytes().first() {
            self.advance(1);
            if let Some(b'+' | b'-') = self.rest.as_bytes().first() {
                self.advance(1);
            }

            let exponent_digits = self
                .rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(self.rest.len());
            if exponent_digits == 0 {
                return Token {
                    kind: TokenKind::Error(ErrorKind::InvalidNumber),
                    span: Span::new(start, self.position),
                };
            }
            self.advance(exponent_digits);
        }

        let literal = &self.source[start..self.position];
        match literal.parse::<f64>() {
            Ok(value) => Token {
                kind: TokenKind::Number(value),
                span: Span::new(start, self.position),
            },
            Err(_) => Token {
                kind: TokenKind::Error(ErrorKind::InvalidNumber),
                span: Span::new(start, self.position),
            },
        }
    }
}

/// Yields every token up to, but not including, the end of input. Stops
/// after the first error token.
impl<'source> Iterator for Lexer<'source> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        match token.kind {
            TokenKind::End => {
                self.finished = true;
                None
            }
            TokenKind::Error(_) => {
                self.finished = true;
                Some(token)
            }
            _ => Some(token),
        }
    }
}
