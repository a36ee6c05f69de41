use crate::bytecode::Bytecode;

/// A compiled expression, ready to be evaluated any number of times.
///
/// Variables are read through the cells bound at compile time, so the value
/// of [`eval`](CompiledExpression::eval) follows whatever the caller last
/// stored in them. The instruction sequence itself never changes after
/// compilation.
#[derive(Debug, Clone)]
pub struct CompiledExpression<'a> {
    pub(crate) code: Box<[Bytecode<'a>]>,
    pub(crate) max_stack: usize,
}

impl<'a> CompiledExpression<'a> {
    pub(crate) fn new(code: Vec<Bytecode<'a>>, max_stack: usize) -> Self {
        Self {
            code: code.into_boxed_slice(),
            max_stack,
        }
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Deepest the value stack gets while evaluating.
    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    /// Whether the expression folded down to a single constant.
    pub fn is_constant(&self) -> bool {
        matches!(*self.code, [Bytecode::LoadConst(_)])
    }

    /// Names of the variables the expression reads, in order of first use.
    pub fn variables(&self) -> Vec<&'a str> {
        let mut names: Vec<&'a str> = Vec::new();
        for instruction in self.code.iter() {
            if let Bytecode::LoadVar { name, .. } = instruction {
                if !names.contains(name) {
                    names.push(*name);
                }
            }
        }
        names
    }

    pub(crate) fn instructions(&self) -> &[Bytecode<'a>] {
        &self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile, compile_with, CompileOptions, SymbolTable, Var};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn shareable_between_threads() {
        assert_send_sync::<CompiledExpression<'static>>();
    }

    #[test]
    fn lists_variables_once() {
        let x = Var::new(1.0);
        let y = Var::new(2.0);
        let z = Var::new(3.0);
        let symbols = SymbolTable::new()
            .variable("x", &x)
            .variable("y", &y)
            .variable("z", &z);

        let compiled = compile("y * x + y / x", &symbols).unwrap();
        assert_eq!(compiled.variables(), ["y", "x"]);
    }

    #[test]
    fn folding_removes_constant_instructions() {
        let symbols = SymbolTable::new();
        let folded = compile("2 * (3 + 4)", &symbols).unwrap();
        let unfolded =
            compile_with("2 * (3 + 4)", &symbols, &CompileOptions::default().without_folding())
                .unwrap();

        assert!(folded.is_constant());
        assert_eq!(folded.len(), 1);
        assert!(!unfolded.is_constant());
        assert_eq!(unfolded.len(), 5);
        assert_eq!(unfolded.max_stack(), 3);
        assert!(folded.variables().is_empty());
    }
}
