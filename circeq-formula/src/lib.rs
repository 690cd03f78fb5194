//! Variables, literals, clauses and CNF formulas used throughout circeq.
//!
//! This crate is the CNF algebra described in the equivalence checker's design: it owns variable
//! allocation (via a name-keyed [`SymbolTable`]), literal negation, clause and formula
//! construction, and the invariants that keep DIMACS output deterministic.

pub mod cnf;
pub mod lit;
pub mod symtab;

pub use cnf::{Clause, CnfFormula};
pub use lit::{Lit, Var};
pub use symtab::SymbolTable;
