//! Name-keyed variable allocation.
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::lit::{Lit, Var};

/// Maps named Boolean variables to stable [`Var`] ids.
///
/// Spec invariant: the table is append-only for its entire lifetime — ids are allocated
/// sequentially starting at 1 (in DIMACS numbering) and are never reused or reassigned, so two
/// calls to [`SymbolTable::var`] with the same name always return the same `Var`
/// (`V("x").id() == V("x").id()`).
///
/// Unlike the original source this table is not process-global state: an equivalence-check
/// driver owns one per call, which is what lets the miter construction glue two independently
/// Tseitin-encoded circuits together by sharing a single table across both encodings.
#[derive(Default)]
pub struct SymbolTable {
    ids: FxHashMap<Arc<str>, Var>,
    names: Vec<Arc<str>>,
}

impl SymbolTable {
    /// Creates an empty symbol table.
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// Returns the `Var` bound to `name`, allocating a fresh one on first use.
    pub fn var(&mut self, name: &str) -> Var {
        if let Some(&var) = self.ids.get(name) {
            return var;
        }
        let var = Var::from_index(self.names.len());
        let name: Arc<str> = Arc::from(name);
        self.names.push(name.clone());
        self.ids.insert(name, var);
        var
    }

    /// Returns the positive-phase literal for `name`. Shortcut for `self.var(name).positive()`.
    pub fn lit(&mut self, name: &str) -> Lit {
        self.var(name).positive()
    }

    /// Looks up a variable without allocating one if it does not already exist.
    pub fn get(&self, name: &str) -> Option<Var> {
        self.ids.get(name).copied()
    }

    /// The name a variable was allocated under.
    ///
    /// Panics if `var` was not allocated by this table — mixing variables from different tables
    /// is a programming mistake, not a runtime-data error (see the type-violation error kind).
    pub fn name(&self, var: Var) -> &str {
        &self.names[var.index()]
    }

    /// Number of distinct variables allocated so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_id() {
        let mut table = SymbolTable::new();
        let a = table.var("x");
        let b = table.var("x");
        assert_eq!(a, b);
    }

    #[test]
    fn ids_are_monotone() {
        let mut table = SymbolTable::new();
        let a = table.var("a");
        let b = table.var("b");
        assert!(a.to_dimacs() < b.to_dimacs());
        // re-requesting `a` must not shift anything
        assert_eq!(table.var("a"), a);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn name_roundtrip() {
        let mut table = SymbolTable::new();
        let v = table.var("cout");
        assert_eq!(table.name(v), "cout");
        assert_eq!(table.get("cout"), Some(v));
        assert_eq!(table.get("missing"), None);
    }
}
