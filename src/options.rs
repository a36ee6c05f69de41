/// Longest accepted source text, in bytes.
pub const DEFAULT_MAX_LENGTH: usize = 4096;

/// Deepest accepted nesting of sub-expressions.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Knobs for [`compile_with`](crate::compile_with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Inputs longer than this fail with `ExpressionTooLong`.
    pub max_length: usize,
    /// Parentheses, unary operators, the right operand of `^` and function
    /// arguments each open one level.
    pub max_depth: usize,
    /// Collapse sub-expressions that only involve constants.
    pub fold_constants: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
            fold_constants: true,
        }
    }
}

impl CompileOptions {
    pub fn without_folding(mut self) -> Self {
        self.fold_constants = false;
        self
    }
}
