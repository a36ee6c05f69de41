use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ast::Function;
use crate::builtins::Builtin;

/// A caller-owned numeric storage cell that compiled expressions read from.
///
/// Compiled expressions only borrow the cell, so the value can be changed
/// between evaluations without recompiling. The cell is safe to share between
/// threads; keeping several cells mutually consistent is up to the caller.
#[derive(Default)]
pub struct Var(AtomicU64);

impl Var {
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed)
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Var").field(&self.get()).finish()
    }
}

impl From<f64> for Var {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// How many arguments a function accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }

    /// The largest argument count this arity allows, if any.
    pub fn max(&self) -> Option<usize> {
        match *self {
            Arity::Exact(n) => Some(n),
            Arity::AtLeast(_) => None,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "{n}+"),
        }
    }
}

/// What a name in expression text refers to.
///
/// Function primitives must be pure: the compiler may call them once at
/// compile time when all their arguments are constants.
#[derive(Debug, Copy, Clone)]
pub enum Binding<'a> {
    Variable(&'a Var),
    Constant(f64),
    Function1(fn(f64) -> f64),
    Function2(fn(f64, f64) -> f64),
    FunctionN(Arity, fn(&[f64]) -> f64),
}

/// What an identifier resolved to, with the name as the table spells it.
#[derive(Debug, Copy, Clone)]
pub(crate) enum Resolved<'a> {
    Variable(&'a str, &'a Var),
    Constant(f64),
    Function(Function<'a>),
}

/// Caller supplied bindings, consulted before the built-in table.
///
/// Built from an ordered sequence of `(name, binding)` pairs. When a name is
/// supplied more than once, the first binding wins.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable<'a> {
    bindings: HashMap<&'a str, Binding<'a>>,
}

impl<'a> SymbolTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: &'a str, binding: Binding<'a>) -> &mut Self {
        match self.bindings.entry(name) {
            Entry::Vacant(entry) => {
                entry.insert(binding);
            }
            Entry::Occupied(_) => {
                log::debug!("ignoring duplicate binding for `{name}`");
            }
        }
        self
    }

    pub fn variable(mut self, name: &'a str, var: &'a Var) -> Self {
        self.bind(name, Binding::Variable(var));
        self
    }

    pub fn constant(mut self, name: &'a str, value: f64) -> Self {
        self.bind(name, Binding::Constant(value));
        self
    }

    pub fn function1(mut self, name: &'a str, func: fn(f64) -> f64) -> Self {
        self.bind(name, Binding::Function1(func));
        self
    }

    pub fn function2(mut self, name: &'a str, func: fn(f64, f64) -> f64) -> Self {
        self.bind(name, Binding::Function2(func));
        self
    }

    pub fn function_n(mut self, name: &'a str, arity: Arity, func: fn(&[f64]) -> f64) -> Self {
        self.bind(name, Binding::FunctionN(arity, func));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Binding<'a>> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Look `name` up in the caller's bindings, then among the built-ins.
    pub(crate) fn resolve(&self, name: &str) -> Option<Resolved<'a>> {
        if let Some((&name, binding)) = self.bindings.get_key_value(name) {
            return Some(match *binding {
                Binding::Variable(var) => Resolved::Variable(name, var),
                Binding::Constant(value) => Resolved::Constant(value),
                Binding::Function1(func) => Resolved::Function(Function::Unary { name, func }),
                Binding::Function2(func) => Resolved::Function(Function::Binary { name, func }),
                Binding::FunctionN(arity, func) => {
                    Resolved::Function(Function::Variadic { name, arity, func })
                }
            });
        }

        Builtin::lookup(name).map(Builtin::resolve)
    }
}

impl<'a> FromIterator<(&'a str, Binding<'a>)> for SymbolTable<'a> {
    fn from_iter<T: IntoIterator<Item = (&'a str, Binding<'a>)>>(iter: T) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<'a> Extend<(&'a str, Binding<'a>)> for SymbolTable<'a> {
    fn extend<T: IntoIterator<Item = (&'a str, Binding<'a>)>>(&mut self, iter: T) {
        for (name, binding) in iter {
            self.bind(name, binding);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_round_trips_bits() {
        let var = Var::new(1.5);
        assert_eq!(var.get(), 1.5);
        var.set(-0.0);
        assert!(var.get().is_sign_negative());
        var.set(f64::NAN);
        assert!(var.get().is_nan());
    }

    #[test]
    fn first_binding_wins() {
        let table: SymbolTable = [
            ("g", Binding::Constant(9.81)),
            ("g", Binding::Constant(1.0)),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 1);
        assert!(matches!(table.resolve("g"), Some(Resolved::Constant(c)) if c == 9.81));
    }

    #[test]
    fn caller_bindings_shadow_builtins() {
        let pi = Var::new(3.0);
        let table = SymbolTable::new().variable("pi", &pi);
        assert!(matches!(
            table.resolve("pi"),
            Some(Resolved::Variable("pi", _))
        ));

        let table = SymbolTable::new();
        assert!(matches!(table.resolve("pi"), Some(Resolved::Constant(_))));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = SymbolTable::new();
        assert!(table.resolve("sin").is_some());
        assert!(table.resolve("SIN").is_none());
        assert!(table.resolve("Pi").is_none());
    }

    #[test]
    fn arity() {
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(3));
        assert!(Arity::AtLeast(1).accepts(7));
        assert!(!Arity::AtLeast(1).accepts(0));
        assert_eq!(Arity::AtLeast(1).to_string(), "1+");
    }
}
