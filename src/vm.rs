use crate::{
    ast::{BinaryOperator, UnaryOperator},
    bytecode::Bytecode,
    chunk::CompiledExpression,
};

/// Deepest value stack an expression may need. The compiler rejects
/// anything deeper, so the evaluator never has to check.
pub const MAX_STACK_SIZE: usize = 256;

impl<'a> CompiledExpression<'a> {
    /// Evaluate the expression against the current contents of its variables.
    ///
    /// This never fails and never allocates: division by zero and friends
    /// produce infinities or NaN, as IEEE 754 prescribes.
    #[inline]
    pub fn eval(&self) -> f64 {
        if let [Bytecode::LoadConst(value)] = *self.code {
            return value;
        }

        // Stack size classes, so small expressions don't pay for zeroing
        // a full-size stack on every call.
        match self.max_stack {
            0..=8 => self.run::<8>(),
            9..=32 => self.run::<32>(),
            _ => self.run::<MAX_STACK_SIZE>(),
        }
    }

    fn run<const N: usize>(&self) -> f64 {
        let mut stack = [0.0f64; N];
        let mut top = 0;

        macro_rules! push {
            ($value:expr) => {{
                stack[top] = $value;
                top += 1;
            }};
        }

        macro_rules! binary_op {
            ($op:expr) => {{
                top -= 1;
                let rhs = stack[top];
                stack[top - 1] = $op.apply(stack[top - 1], rhs);
            }};
        }

        for instruction in self.code.iter() {
            match *instruction {
                Bytecode::LoadConst(value) => push!(value),
                Bytecode::LoadVar { var, .. } => push!(var.get()),

                Bytecode::Neg => stack[top - 1] = UnaryOperator::Neg.apply(stack[top - 1]),

                Bytecode::Add => binary_op!(BinaryOperator::Add),
                Bytecode::Sub => binary_op!(BinaryOperator::Sub),
                Bytecode::Mul => binary_op!(BinaryOperator::Mul),
                Bytecode::Div => binary_op!(BinaryOperator::Div),
                Bytecode::Mod => binary_op!(BinaryOperator::Mod),
                Bytecode::Pow => binary_op!(BinaryOperator::Pow),

                Bytecode::Call1 { func, .. } => stack[top - 1] = func(stack[top - 1]),
                Bytecode::Call2 { func, .. } => {
                    top -= 1;
                    stack[top - 1] = func(stack[top - 1], stack[top]);
                }
                Bytecode::CallN { argc, func, .. } => {
                    let result = func(&stack[top - argc..top]);
                    top -= argc;
                    push!(result);
                }
            }
        }

        debug_assert_eq!(top, 1);
        stack[0]
    }
}
