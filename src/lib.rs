//! Compile arithmetic expressions once, then evaluate them many times.
//!
//! ```
//! use expr_compiler::{compile, SymbolTable, Var};
//!
//! let x = Var::new(0.0);
//! let symbols = SymbolTable::new().variable("x", &x);
//! let expression = compile("sqrt(x^2 + 9)", &symbols).unwrap();
//!
//! x.set(4.0);
//! assert_eq!(expression.eval(), 5.0);
//! ```

pub mod ast;
mod builtins;
mod bytecode;
mod chunk;
pub mod compiler;
pub mod debug;
mod error;
mod helpers;
pub mod lexer;
pub mod math;
pub mod optimizer;
mod options;
pub mod parser;
mod symbols;
pub mod token;
mod vm;

pub use builtins::Builtin;
pub use chunk::CompiledExpression;
pub use error::{CompileError, ErrorKind, Result};
pub use options::{CompileOptions, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH};
pub use symbols::{Arity, Binding, SymbolTable, Var};
pub use token::Span;
pub use vm::MAX_STACK_SIZE;

use compiler::Compiler;
use parser::Parser;

/// Compile `source` with the default [`CompileOptions`].
pub fn compile<'a>(source: &str, symbols: &SymbolTable<'a>) -> Result<CompiledExpression<'a>> {
    compile_with(source, symbols, &CompileOptions::default())
}

pub fn compile_with<'a>(
    source: &str,
    symbols: &SymbolTable<'a>,
    options: &CompileOptions,
) -> Result<CompiledExpression<'a>> {
    log::debug!("compiling {source:?}");

    if source.len() > options.max_length {
        return Err(CompileError::new(
            ErrorKind::ExpressionTooLong,
            Span::at(options.max_length),
        ));
    }

    let mut expression = Parser::new(source, symbols)
        .with_max_depth(options.max_depth)
        .parse()?;
    if options.fold_constants {
        let before = log::log_enabled!(log::Level::Debug).then(|| expression.node.node_count());
        expression = optimizer::optimize(expression);
        if let Some(before) = before {
            log::debug!("folded {before} nodes into {}", expression.node.node_count());
        }
    }

    Compiler::new().compile(&expression)
}

/// Evaluate a compiled expression. Same as [`CompiledExpression::eval`].
#[inline]
pub fn evaluate(expression: &CompiledExpression) -> f64 {
    expression.eval()
}

/// Release a compiled expression. Taking it by value means it cannot be
/// evaluated or released again afterwards.
pub fn release(expression: CompiledExpression) {
    log::trace!("releasing {} instructions", expression.len());
    drop(expression);
}

/// Compile, evaluate once and release.
pub fn interpret(source: &str, symbols: &SymbolTable) -> Result<f64> {
    let expression = compile(source, symbols)?;
    let value = evaluate(&expression);
    release(expression);
    Ok(value)
}
