use crate::symbols::Var;

/// One postfix instruction. Operands are taken from the top of the value
/// stack and the result is pushed back.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Bytecode<'a> {
    // Loading values
    /// Push a constant known at compile time.
    LoadConst(f64),
    /// Push the current contents of a caller-owned cell.
    LoadVar { name: &'a str, var: &'a Var },

    // Unary operations
    Neg,

    // Binary operations
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // Function calls
    Call1 {
        name: &'a str,
        func: fn(f64) -> f64,
    },
    Call2 {
        name: &'a str,
        func: fn(f64, f64) -> f64,
    },
    /// Pop `argc` arguments and pass them to `func` in source order.
    CallN {
        name: &'a str,
        argc: usize,
        func: fn(&[f64]) -> f64,
    },
}

impl<'a> Bytecode<'a> {
    /// How many values this instruction pops.
    pub(crate) fn pops(&self) -> usize {
        match self {
            Bytecode::LoadConst(_) | Bytecode::LoadVar { .. } => 0,
            Bytecode::Neg | Bytecode::Call1 { .. } => 1,
            Bytecode::Add
            | Bytecode::Sub
            | Bytecode::Mul
            | Bytecode::Div
            | Bytecode::Mod
            | Bytecode::Pow
            | Bytecode::Call2 { .. } => 2,
            Bytecode::CallN { argc, .. } => *argc,
        }
    }
}
