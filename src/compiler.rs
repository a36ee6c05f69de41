use crate::{
    ast::{BinaryOperator, Expression, Function, TokenTree, UnaryOperator},
    bytecode::Bytecode,
    chunk::CompiledExpression,
    error::{CompileError, ErrorKind, Result},
    token::Span,
    vm::MAX_STACK_SIZE,
};

/// Lowers an expression tree into postfix bytecode, keeping track of how
/// deep the value stack will get at run time.
#[derive(Debug, Default)]
pub struct Compiler<'a> {
    code: Vec<Bytecode<'a>>,
    stack_depth: usize,
    max_stack: usize,
}

impl<'a> Compiler<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(
        mut self,
        expression: &TokenTree<Expression<'a>>,
    ) -> Result<CompiledExpression<'a>> {
        self.compile_expression(expression)?;
        debug_assert_eq!(self.stack_depth, 1);

        log::debug!(
            "compiled {} instructions, stack depth {}",
            self.code.len(),
            self.max_stack
        );

        Ok(CompiledExpression::new(self.code, self.max_stack))
    }

    fn compile_expression(&mut self, expression: &TokenTree<Expression<'a>>) -> Result<()> {
        match &expression.node {
            Expression::Literal(value) => self.emit(Bytecode::LoadConst(*value), expression.span),
            Expression::Variable { name, var } => {
                self.emit(Bytecode::LoadVar { name: *name, var: *var }, expression.span)
            }
            Expression::UnaryOp { op, operand } => {
                self.compile_expression(operand)?;
                let instruction = match op.node {
                    UnaryOperator::Neg => Bytecode::Neg,
                };
                self.emit(instruction, op.span)
            }
            Expression::BinaryOp { lhs, rest } => {
                self.compile_expression(lhs)?;
                for (op, rhs) in rest {
                    self.compile_expression(rhs)?;
                    let instruction = match op.node {
                        BinaryOperator::Add => Bytecode::Add,
                        BinaryOperator::Sub => Bytecode::Sub,
                        BinaryOperator::Mul => Bytecode::Mul,
                        BinaryOperator::Div => Bytecode::Div,
                        BinaryOperator::Mod => Bytecode::Mod,
                        BinaryOperator::Pow => Bytecode::Pow,
                    };
                    self.emit(instruction, op.span)?;
                }
                Ok(())
            }
            Expression::Call { function, args } => {
                for arg in args {
                    self.compile_expression(arg)?;
                }
                let instruction = match *function {
                    Function::Unary { name, func } => Bytecode::Call1 { name, func },
                    Function::Binary { name, func } => Bytecode::Call2 { name, func },
                    Function::Variadic { name, func, .. } => Bytecode::CallN {
                        name,
                        argc: args.len(),
                        func,
                    },
                };
                self.emit(instruction, expression.span)
            }
        }
    }

    fn emit(&mut self, instruction: Bytecode<'a>, span: Span) -> Result<()> {
        // Every instruction pushes exactly one result.
        self.stack_depth = self.stack_depth + 1 - instruction.pops();
        if self.stack_depth > MAX_STACK_SIZE {
            return Err(CompileError::new(ErrorKind::NestingTooDeep, span));
        }
        self.max_stack = self.max_stack.max(self.stack_depth);

        log::trace!("emit {instruction:?}");
        self.code.push(instruction);
        Ok(())
    }
}
