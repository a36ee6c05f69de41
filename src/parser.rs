use crate::ast::{self, BinaryOperator, Expression, Function, TokenTree, UnaryOperator};
use crate::error::{CompileError, ErrorKind, Result};
use crate::lexer::Lexer;
use crate::options::DEFAULT_MAX_DEPTH;
use crate::symbols::{Resolved, SymbolTable};
use crate::token::{Span, Token, TokenKind};

pub struct Parser<'s, 'a, 'source> {
    lexer: Lexer<'source>,
    symbols: &'s SymbolTable<'a>,
    max_depth: usize,
    depth: usize,
}

impl<'s, 'a, 'source> Parser<'s, 'a, 'source> {
    pub fn new(source: &'source str, symbols: &'s SymbolTable<'a>) -> Self {
        Self {
            lexer: Lexer::new(source),
            symbols,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse the whole input as one expression.
    pub fn parse(&mut self) -> Result<TokenTree<Expression<'a>>> {
        let first = self.lexer.peek();
        if first.kind == TokenKind::End {
            return Err(CompileError::new(ErrorKind::EmptyExpression, first.span));
        }

        let expression = self.expect_expression_within(0)?;

        // Ensure we've consumed all tokens
        let token = self.lexer.next_token();
        match token.kind {
            TokenKind::End => {}
            TokenKind::CloseParen => {
                return Err(CompileError::new(ErrorKind::UnmatchedParen, token.span))
            }
            _ => return Err(unexpected(token, ErrorKind::TrailingInput)),
        }

        log::debug!(
            "scanned {} tokens from {} bytes",
            self.lexer.token_count(),
            self.lexer.source().len()
        );
        log::debug!("parsed {} nodes", expression.node.node_count());

        Ok(expression)
    }

    fn expect_expression_within(&mut self, min_bp: u8) -> Result<TokenTree<Expression<'a>>> {
        self.depth += 1;
        if self.depth > self.max_depth {
            let span = self.lexer.peek().span;
            return Err(CompileError::new(ErrorKind::NestingTooDeep, span));
        }

        let expression = self.parse_expression_within(min_bp);
        self.depth -= 1;
        expression
    }

    fn parse_expression_within(&mut self, min_bp: u8) -> Result<TokenTree<Expression<'a>>> {
        let token = self.lexer.next_token();
        log::trace!("atom {:?}", token.kind);

        let lhs = match token.kind {
            TokenKind::Number(value) => TokenTree::new(Expression::Literal(value), token.span),
            TokenKind::Identifier => self.parse_identifier(&token)?,
            TokenKind::OpenParen => {
                let inner = self.expect_expression_within(0)?;
                let close = self.lexer.next_token();
                if close.kind != TokenKind::CloseParen {
                    return Err(unexpected(close, ErrorKind::UnmatchedParen));
                }
                TokenTree::new(inner.node, token.span.to(close.span))
            }
            TokenKind::Minus => {
                let ((), r_bp) = prefix_binding_power(&token.kind);
                let operand = self.expect_expression_within(r_bp)?;
                let span = token.span.to(operand.span);
                TokenTree::new(
                    Expression::UnaryOp {
                        op: TokenTree::new(UnaryOperator::Neg, token.span),
                        operand: Box::new(operand),
                    },
                    span,
                )
            }
            TokenKind::Plus => {
                // Unary plus is the identity, no node for it
                let ((), r_bp) = prefix_binding_power(&token.kind);
                let operand = self.expect_expression_within(r_bp)?;
                TokenTree::new(operand.node, token.span.to(operand.span))
            }
            TokenKind::CloseParen => {
                return Err(CompileError::new(ErrorKind::UnmatchedParen, token.span))
            }
            _ => return Err(unexpected(token, ErrorKind::UnexpectedToken)),
        };

        // Operators consumed here all apply to the running result, so they are
        // collected side by side rather than nested.
        let mut rest = Vec::new();
        loop {
            let op = self.lexer.peek();
            if !op.kind.is_operator() {
                break;
            }

            let (l_bp, r_bp) = infix_binding_power(&op.kind);
            if l_bp < min_bp {
                break;
            }

            let op = self.lexer.next_token();
            let rhs = self.expect_expression_within(r_bp)?;
            rest.push((TokenTree::new(BinaryOperator::from(&op.kind), op.span), rhs));
        }

        let Some((_, last)) = rest.last() else {
            return Ok(lhs);
        };
        let span = lhs.span.to(last.span);
        Ok(TokenTree::new(
            Expression::BinaryOp {
                lhs: Box::new(lhs),
                rest,
            },
            span,
        ))
    }

    fn parse_identifier(&mut self, token: &Token) -> Result<TokenTree<Expression<'a>>> {
        let name = token.text(self.lexer.source());
        let expression = match self.symbols.resolve(name) {
            Some(Resolved::Variable(name, var)) => Expression::Variable { name, var },
            Some(Resolved::Constant(value)) => Expression::Literal(value),
            Some(Resolved::Function(function)) => return self.parse_call(function, token.span),
            None => return Err(CompileError::new(ErrorKind::UnknownVariable, token.span)),
        };

        Ok(TokenTree::new(expression, token.span))
    }

    fn parse_call(
        &mut self,
        function: Function<'a>,
        name_span: Span,
    ) -> Result<TokenTree<Expression<'a>>> {
        let open = self.lexer.next_token();
        if open.kind != TokenKind::OpenParen {
            return Err(unexpected(open, ErrorKind::UnexpectedToken));
        }

        let arity = function.arity();
        let mut args = Vec::new();
        let close = if self.lexer.peek().kind == TokenKind::CloseParen {
            self.lexer.next_token()
        } else {
            if arity.max() == Some(0) {
                let surplus = self.lexer.peek().span;
                return Err(CompileError::new(ErrorKind::ArityMismatch, surplus));
            }

            loop {
                args.push(self.expect_expression_within(0)?);

                let token = self.lexer.next_token();
                match token.kind {
                    TokenKind::Comma => {
                        if arity.max() == Some(args.len()) {
                            let surplus = self.lexer.peek().span;
                            return Err(CompileError::new(ErrorKind::ArityMismatch, surplus));
                        }
                    }
                    TokenKind::CloseParen => break token,
                    _ => return Err(unexpected(token, ErrorKind::UnmatchedParen)),
                }
            }
        };

        if !arity.accepts(args.len()) {
            return Err(CompileError::new(ErrorKind::ArityMismatch, close.span));
        }

        Ok(TokenTree::new(
            ast::Expression::Call { function, args },
            name_span.to(close.span),
        ))
    }
}

/// Error for a token that cannot appear where it was found. Tokens the lexer
/// already flagged keep the lexer's diagnosis.
fn unexpected(token: Token, kind: ErrorKind) -> CompileError {
    match token.kind {
        TokenKind::Error(lex_error) => CompileError::new(lex_error, token.span),
        _ => CompileError::new(kind, token.span),
    }
}

// Unary minus binds tighter than `*` but looser than the `^` to its right, so
// `-2^2` is `-(2^2)` while `2^-1` still parses.
fn prefix_binding_power(kind: &TokenKind) -> ((), u8) {
    match kind {
        TokenKind::Plus | TokenKind::Minus => ((), 5),
        _ => unreachable!("prefix_binding_power with {kind:?}"),
    }
}

fn infix_binding_power(kind: &TokenKind) -> (u8, u8) {
    match kind {
        TokenKind::Plus | TokenKind::Minus => (1, 2),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => (3, 4),
        TokenKind::Caret => (7, 6), // Right associative
        _ => unreachable!("infix_binding_power with {kind:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{Arity, Var};

    /// Render a tree as an s-expression, to check its shape.
    fn sexpr(expression: &Expression) -> String {
        match expression {
            Expression::Literal(value) => format!("{value}"),
            Expression::Variable { name, .. } => name.to_string(),
            Expression::UnaryOp { operand, .. } => format!("(neg {})", sexpr(&operand.node)),
            Expression::BinaryOp { lhs, rest } => {
                rest.iter().fold(sexpr(&lhs.node), |acc, (op, rhs)| {
                    format!("({} {acc} {})", op.node, sexpr(&rhs.node))
                })
            }
            Expression::Call { function, args } => {
                let args: Vec<_> = args.iter().map(|arg| sexpr(&arg.node)).collect();
                format!("({} {})", function.name(), args.join(" "))
            }
        }
    }

    fn parse(source: &str) -> Result<String> {
        let x = Var::new(0.0);
        let y = Var::new(0.0);
        let symbols = SymbolTable::new().variable("x", &x).variable("y", &y);
        let mut parser = Parser::new(source, &symbols);
        parser.parse().map(|tree| sexpr(&tree.node))
    }

    fn parse_err(source: &str) -> (ErrorKind, usize) {
        let error = parse(source).expect_err("parsing should fail");
        (error.kind, error.offset())
    }

    #[test]
    fn precedence() {
        assert_eq!(parse("2+3*4").unwrap(), "(+ 2 (* 3 4))");
        assert_eq!(parse("(2+3)*4").unwrap(), "(* (+ 2 3) 4)");
        assert_eq!(parse("1-2-3").unwrap(), "(- (- 1 2) 3)");
        assert_eq!(parse("8/4/2").unwrap(), "(/ (/ 8 4) 2)");
        assert_eq!(parse("7%4*2").unwrap(), "(* (% 7 4) 2)");
    }

    #[test]
    fn exponent_is_right_associative() {
        assert_eq!(parse("2^3^2").unwrap(), "(^ 2 (^ 3 2))");
    }

    #[test]
    fn unary_minus() {
        assert_eq!(parse("-2^2").unwrap(), "(neg (^ 2 2))");
        assert_eq!(parse("2^-1").unwrap(), "(^ 2 (neg 1))");
        assert_eq!(parse("-2*3").unwrap(), "(* (neg 2) 3)");
        assert_eq!(parse("--x").unwrap(), "(neg (neg x))");
        assert_eq!(parse("2^-3*4").unwrap(), "(* (^ 2 (neg 3)) 4)");
        assert_eq!(parse("+x").unwrap(), "x");
        assert_eq!(parse("x - -y").unwrap(), "(- x (neg y))");
    }

    #[test]
    fn calls_and_constants() {
        assert_eq!(parse("sin(x)").unwrap(), "(sin x)");
        assert_eq!(parse("pow(x, 2)").unwrap(), "(pow x 2)");
        assert_eq!(parse("max(1, x, y)").unwrap(), "(max 1 x y)");
        assert_eq!(
            parse("pi").unwrap(),
            format!("{}", std::f64::consts::PI)
        );
    }

    #[test]
    fn spans_cover_the_source() {
        let symbols = SymbolTable::new();
        let tree = Parser::new(" (1 + 2) * 3", &symbols).parse().unwrap();
        assert_eq!(tree.span, Span::new(1, 12));
        match tree.node {
            Expression::BinaryOp { lhs, rest } => {
                assert_eq!(lhs.span, Span::new(1, 8));
                assert_eq!(rest.len(), 1);
                assert_eq!(rest[0].0.span, Span::new(9, 10));
                assert_eq!(rest[0].1.span, Span::new(11, 12));
            }
            other => panic!("unexpected tree {other:?}"),
        }
    }

    #[test]
    fn left_associative_runs_stay_flat() {
        let symbols = SymbolTable::new();
        let tree = Parser::new("1 - 2 * 3 - 4 + 5", &symbols).parse().unwrap();
        match tree.node {
            Expression::BinaryOp { lhs, rest } => {
                assert_eq!(lhs.node.as_literal(), Some(1.0));
                let ops: Vec<_> = rest.iter().map(|(op, _)| op.node).collect();
                assert_eq!(
                    ops,
                    [BinaryOperator::Sub, BinaryOperator::Sub, BinaryOperator::Add]
                );
                // `2 * 3` binds tighter and is its own run
                assert!(matches!(rest[0].1.node, Expression::BinaryOp { .. }));
            }
            other => panic!("unexpected tree {other:?}"),
        }
    }

    #[test]
    fn errors() {
        assert_eq!(parse_err("x +"), (ErrorKind::UnexpectedToken, 3));
        assert_eq!(parse_err("sin(1,2)"), (ErrorKind::ArityMismatch, 6));
        assert_eq!(parse_err("pow(1)"), (ErrorKind::ArityMismatch, 5));
        assert_eq!(parse_err("sin()"), (ErrorKind::ArityMismatch, 4));
        assert_eq!(parse_err("min()"), (ErrorKind::ArityMismatch, 4));
        assert_eq!(parse_err("foo(1)"), (ErrorKind::UnknownVariable, 0));
        assert_eq!(parse_err("x + z"), (ErrorKind::UnknownVariable, 4));
        assert_eq!(parse_err("(1+2"), (ErrorKind::UnmatchedParen, 4));
        assert_eq!(parse_err("(1 2)"), (ErrorKind::UnmatchedParen, 3));
        assert_eq!(parse_err("1+2)"), (ErrorKind::UnmatchedParen, 3));
        assert_eq!(parse_err(")"), (ErrorKind::UnmatchedParen, 0));
        assert_eq!(parse_err("sin(1"), (ErrorKind::UnmatchedParen, 5));
        assert_eq!(parse_err("1 2"), (ErrorKind::TrailingInput, 2));
        assert_eq!(parse_err("2x"), (ErrorKind::TrailingInput, 1));
        assert_eq!(parse_err("2(3+4)"), (ErrorKind::TrailingInput, 1));
        assert_eq!(parse_err(""), (ErrorKind::EmptyExpression, 0));
        assert_eq!(parse_err("   "), (ErrorKind::EmptyExpression, 3));
        assert_eq!(parse_err("*2"), (ErrorKind::UnexpectedToken, 0));
        assert_eq!(parse_err("1 + $"), (ErrorKind::UnexpectedToken, 4));
        assert_eq!(parse_err("1 $"), (ErrorKind::UnexpectedToken, 2));
        assert_eq!(parse_err("1e+"), (ErrorKind::InvalidNumber, 0));
        assert_eq!(parse_err("sin + 1"), (ErrorKind::UnexpectedToken, 4));
        assert_eq!(parse_err("sin"), (ErrorKind::UnexpectedToken, 3));
        assert_eq!(parse_err("(,)"), (ErrorKind::UnexpectedToken, 1));
    }

    #[test]
    fn surplus_argument_to_a_nullary_function() {
        let symbols = SymbolTable::new().function_n("seed", Arity::Exact(0), |_| 42.0);
        let parse_err = |source: &str| Parser::new(source, &symbols).parse().unwrap_err();

        let error = parse_err("seed(1)");
        assert_eq!((error.kind, error.offset()), (ErrorKind::ArityMismatch, 5));
        let error = parse_err("seed( (1), 2)");
        assert_eq!((error.kind, error.offset()), (ErrorKind::ArityMismatch, 6));
        assert!(Parser::new("seed()", &symbols).parse().is_ok());
    }

    #[test]
    fn nesting_limit() {
        let symbols = SymbolTable::new();
        let deep = format!("{}1{}", "(".repeat(10), ")".repeat(10));

        let mut parser = Parser::new(&deep, &symbols).with_max_depth(11);
        assert!(parser.parse().is_ok());

        let mut parser = Parser::new(&deep, &symbols).with_max_depth(10);
        let error = parser.parse().unwrap_err();
        assert_eq!(error.kind, ErrorKind::NestingTooDeep);
        assert_eq!(error.offset(), 10);
    }

    #[test]
    fn long_flat_chains_do_not_count_as_nesting() {
        let symbols = SymbolTable::new();
        let flat = vec!["1"; 500].join("+");
        let mut parser = Parser::new(&flat, &symbols).with_max_depth(4);
        assert!(parser.parse().is_ok());
    }
}
