use std::fmt;

use crate::{bytecode::Bytecode, chunk::CompiledExpression};

pub fn print_instructions(expression: &CompiledExpression) {
    print!("{expression}");
}

impl fmt::Display for CompiledExpression<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, instruction) in self.instructions().iter().enumerate() {
            write!(f, "{index:04}   ")?;
            write_instruction(f, instruction)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

fn write_instruction(f: &mut fmt::Formatter<'_>, instruction: &Bytecode) -> fmt::Result {
    match instruction {
        // Loading values
        Bytecode::LoadConst(value) => write!(f, "LOAD_CONST    {value}"),
        Bytecode::LoadVar { name, .. } => write!(f, "LOAD_VAR      {name}"),

        Bytecode::Neg => write!(f, "NEG"),

        // Arithmetic
        Bytecode::Add => write!(f, "ADD"),
        Bytecode::Sub => write!(f, "SUB"),
        Bytecode::Mul => write!(f, "MUL"),
        Bytecode::Div => write!(f, "DIV"),
        Bytecode::Mod => write!(f, "MOD"),
        Bytecode::Pow => write!(f, "POW"),

        // Calls
        Bytecode::Call1 { name, .. } => write!(f, "CALL          {name} 1"),
        Bytecode::Call2 { name, .. } => write!(f, "CALL          {name} 2"),
        Bytecode::CallN { name, argc, .. } => write!(f, "CALL          {name} {argc}"),
    }
}
