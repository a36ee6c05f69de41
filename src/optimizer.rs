use crate::ast::*;
use crate::token::Span;

/// Apply optimizations to the expression tree.
/// At the moment, we only do constant folding: every operator or call whose
/// operands are all literals is replaced by its result. The operation applied
/// is the same one the evaluator would apply, so results do not change.
pub fn optimize<'a>(expression: TokenTree<Expression<'a>>) -> TokenTree<Expression<'a>> {
    let span = expression.span;
    match expression.node {
        Expression::UnaryOp { op, operand } => optimize_unary_op(op, *operand),
        Expression::BinaryOp { lhs, rest } => optimize_binary_op(*lhs, rest),
        Expression::Call { function, args } => optimize_call(function, args, span),

        // No optimization to be done
        node @ (Expression::Literal(_) | Expression::Variable { .. }) => {
            TokenTree::new(node, span)
        }
    }
}

fn optimize_unary_op<'a>(
    op: TokenTree<UnaryOperator>,
    operand: TokenTree<Expression<'a>>,
) -> TokenTree<Expression<'a>> {
    let operand = optimize(operand);
    let span = op.span.to(operand.span);

    TokenTree::new(
        match operand.node {
            Expression::Literal(value) => Expression::Literal(op.node.apply(value)),
            _ => Expression::UnaryOp {
                op,
                operand: Box::new(operand),
            },
        },
        span,
    )
}

fn optimize_binary_op<'a>(
    lhs: TokenTree<Expression<'a>>,
    rest: Vec<(TokenTree<BinaryOperator>, TokenTree<Expression<'a>>)>,
) -> TokenTree<Expression<'a>> {
    let mut lhs = optimize(lhs);
    let mut rest = rest
        .into_iter()
        .map(|(op, rhs)| (op, optimize(rhs)))
        .peekable();

    // Only a constant prefix can be folded: `x + 2 + 3` is `(x + 2) + 3`, and
    // regrouping it would round differently.
    while let Some((_, rhs)) = rest.peek() {
        let (Some(l), Some(r)) = (lhs.node.as_literal(), rhs.node.as_literal()) else {
            break;
        };
        let Some((op, rhs)) = rest.next() else {
            break;
        };
        lhs = TokenTree::new(
            Expression::Literal(op.node.apply(l, r)),
            lhs.span.to(rhs.span),
        );
    }

    let rest: Vec<_> = rest.collect();
    let Some((_, last)) = rest.last() else {
        return lhs;
    };
    let span = lhs.span.to(last.span);

    TokenTree::new(
        Expression::BinaryOp {
            lhs: Box::new(lhs),
            rest,
        },
        span,
    )
}

fn optimize_call<'a>(
    function: Function<'a>,
    args: Vec<TokenTree<Expression<'a>>>,
    span: Span,
) -> TokenTree<Expression<'a>> {
    let args: Vec<_> = args.into_iter().map(optimize).collect();

    let constants: Option<Vec<f64>> = args.iter().map(|arg| arg.node.as_literal()).collect();
    let node = match constants {
        Some(values) => Expression::Literal(function.call(&values)),
        None => Expression::Call { function, args },
    };

    TokenTree::new(node, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::symbols::{SymbolTable, Var};

    fn fold(source: &str, symbols: &SymbolTable) -> f64 {
        let tree = Parser::new(source, symbols).parse().expect("parsing should succeed");
        match optimize(tree).node {
            Expression::Literal(value) => value,
            other => panic!("expected a literal, got {other:?}"),
        }
    }

    #[test]
    fn folds_constant_expressions() {
        let symbols = SymbolTable::new();
        for (source, expected) in [
            ("2+3*4", 14.0),
            ("2^3^2", 512.0),
            ("-2^2", -4.0),
            ("2^-1", 0.5),
            ("sqrt(16) + max(1, 7, 3)", 11.0),
            ("pow(2, 10) % 1000", 24.0),
        ] {
            assert_eq!(fold(source, &symbols), expected, "when folding '{source}'");
        }
    }

    #[test]
    fn keeps_ieee_anomalies() {
        let symbols = SymbolTable::new();
        assert_eq!(fold("1/0", &symbols), f64::INFINITY);
        assert!(fold("0/0", &symbols).is_nan());
        assert!(fold("sqrt(-1)", &symbols).is_nan());
    }

    #[test]
    fn folds_around_variables() {
        let x = Var::new(1.0);
        let symbols = SymbolTable::new().variable("x", &x);
        let tree = Parser::new("x * (2 + 3) + sin(0)", &symbols)
            .parse()
            .unwrap();
        assert_eq!(tree.node.node_count(), 7);

        let folded = optimize(tree);
        // x * 5 + 0
        assert_eq!(folded.node.node_count(), 4);
        match folded.node {
            Expression::BinaryOp { lhs, rest } => {
                assert!(matches!(lhs.node, Expression::Variable { name: "x", .. }));
                let operands: Vec<_> = rest.iter().map(|(_, rhs)| rhs.node.as_literal()).collect();
                assert_eq!(operands, [Some(5.0), Some(0.0)]);
            }
            other => panic!("unexpected tree {other:?}"),
        }
    }

    #[test]
    fn folds_only_the_constant_prefix_of_a_run() {
        let x = Var::new(1.0);
        let symbols = SymbolTable::new().variable("x", &x);
        let tree = Parser::new("1 + 2 - x + 3 + 4", &symbols).parse().unwrap();

        match optimize(tree).node {
            Expression::BinaryOp { lhs, rest } => {
                assert_eq!(lhs.node.as_literal(), Some(3.0));
                assert_eq!(lhs.span, Span::new(0, 5));
                assert_eq!(rest.len(), 3);
            }
            other => panic!("unexpected tree {other:?}"),
        }
    }

    #[test]
    fn long_runs_fold_without_recursing() {
        let symbols = SymbolTable::new();
        let source = vec!["1"; 20_000].join("+");
        assert_eq!(fold(&source, &symbols), 20_000.0);
    }

    #[test]
    fn does_not_fold_variables() {
        let x = Var::new(1.0);
        let symbols = SymbolTable::new().variable("x", &x);
        let tree = Parser::new("-x", &symbols).parse().unwrap();
        assert!(matches!(
            optimize(tree).node,
            Expression::UnaryOp { .. }
        ));
    }
}
