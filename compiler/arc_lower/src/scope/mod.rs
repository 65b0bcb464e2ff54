//! Lexical scope chain for lowering.
//!
//! A stack of symbol tables, innermost last. [`define`](ScopeChain::define)
//! only ever writes the innermost table, which is what makes shadowing
//! work: an inner `var x` never touches an outer `x`.
//!
//! The chain is `Clone` so a deferred expression can be replayed later
//! against the bindings that were visible when it was registered.

use rustc_hash::FxHashMap;

use crate::ir::{Type, Value};

/// How a name is bound.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    /// Pointer to stack (or global) storage; reads load through it and
    /// assignments store into it.
    Slot(Value),
    /// A computed value used directly.
    Value(Value),
}

impl Binding {
    /// The type a read of this binding produces.
    pub fn value_type(&self) -> Option<&Type> {
        match self {
            Binding::Slot(slot) => slot.ty.pointee(),
            Binding::Value(value) => Some(&value.ty),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub binding: Binding,
    pub is_const: bool,
}

#[derive(Clone, Debug)]
pub struct ScopeChain {
    scopes: Vec<FxHashMap<String, Symbol>>,
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeChain {
    /// A chain holding only the root scope.
    pub fn new() -> Self {
        ScopeChain {
            scopes: vec![FxHashMap::default()],
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Drop the innermost scope. The root scope is never popped.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Number of scopes, counting the root.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Bind `name` in the innermost scope, replacing any binding there.
    pub fn define(&mut self, name: impl Into<String>, binding: Binding, is_const: bool) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), Symbol { binding, is_const });
        }
    }

    /// Innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}
