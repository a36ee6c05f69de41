use std::time::Instant;

use clap::Parser;
use expr_compiler::{
    compile_with, debug, lexer, parser, token::TokenKind, CompileOptions, CompiledExpression,
    SymbolTable, Var,
};
use log::LevelFilter;
use miette::{IntoDiagnostic, LabeledSpan, Report};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Input {
    /// The expression to evaluate
    expression: String,

    /// Bind a variable, e.g. `--var x=1.5`. May be repeated.
    #[clap(long = "var", value_parser = parse_variable)]
    variables: Vec<(String, f64)>,

    /// Evaluate the compiled expression this many times and report the time taken.
    #[clap(long, default_value = "1")]
    iterations: u64,

    /// Keep constant sub-expressions instead of folding them.
    #[clap(long, default_value = "false")]
    no_fold: bool,

    /// Debug the lexer, printing out each token. Does not parse or evaluate the expression.
    #[clap(long, default_value = "false")]
    debug_lexer: bool,

    /// Debug the parser, printing out the AST. Does not evaluate the expression.
    #[clap(long, default_value = "false")]
    debug_parser: bool,

    /// Print the compiled bytecode before evaluating.
    #[clap(long, default_value = "false")]
    debug_bytecode: bool,

    /// Log more. Repeat for even more.
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_variable(arg: &str) -> Result<(String, f64), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{arg}`"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for `{name}`: {e}"))?;

    Ok((name.trim().to_string(), value))
}

fn main() -> miette::Result<()> {
    let Input {
        expression,
        variables,
        iterations,
        no_fold,
        debug_lexer,
        debug_parser,
        debug_bytecode,
        verbose,
    } = Input::parse();

    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .env()
        .init()
        .into_diagnostic()?;

    let cells: Vec<(String, Var)> = variables
        .into_iter()
        .map(|(name, value)| (name, Var::new(value)))
        .collect();
    let symbols: SymbolTable = cells
        .iter()
        .map(|(name, var)| (name.as_str(), expr_compiler::Binding::Variable(var)))
        .collect();

    if debug_lexer {
        run_debug_lexer(&expression);
        return Ok(());
    }

    if debug_parser {
        return run_debug_parser(&expression, &symbols);
    }

    let options = CompileOptions {
        fold_constants: !no_fold,
        ..CompileOptions::default()
    };
    let compiled = compile_with(&expression, &symbols, &options)
        .map_err(|e| Report::new(e).with_source_code(expression.clone()))?;

    if debug_bytecode {
        debug::print_instructions(&compiled);
    }

    let start = Instant::now();
    let (result, iterations) = evaluate_repeatedly(&compiled, iterations);
    let elapsed = start.elapsed();

    log::info!(
        "{iterations} evaluations in {:.3}ms ({:.1}ns each)",
        elapsed.as_secs_f64() * 1000.0,
        elapsed.as_nanos() as f64 / iterations as f64
    );
    println!("{result}");

    expr_compiler::release(compiled);
    Ok(())
}

/// Evaluate at least once. Returns the last result and how many evaluations ran.
fn evaluate_repeatedly(compiled: &CompiledExpression, iterations: u64) -> (f64, u64) {
    let iterations = iterations.max(1);
    let mut result = compiled.eval();
    for _ in 1..iterations {
        result = compiled.eval();
    }
    (result, iterations)
}

fn run_debug_lexer(source: &str) {
    for token in lexer::Lexer::new(source) {
        let kind = match token.kind {
            TokenKind::Identifier => format!("Identifier({})", token.text(source)),
            _ => format!("{:?}", token.kind),
        };
        let diag = miette::miette!(
            labels = vec![LabeledSpan::at(token.span.start..token.span.end, kind)],
            severity = miette::Severity::Advice,
            "found a token",
        )
        .with_source_code(source.to_string());
        eprintln!("{:?}", diag);
    }
}

fn run_debug_parser(source: &str, symbols: &SymbolTable) -> miette::Result<()> {
    let ast = parser::Parser::new(source, symbols)
        .parse()
        .map_err(|e| Report::new(e).with_source_code(source.to_string()))?;

    dbg!(ast);
    Ok(())
}
