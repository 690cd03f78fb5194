//! Tseitin transformation: turns a validated circuit into an equisatisfiable CNF formula.
pub mod gates;
pub mod transform;

pub use gates::{mk_and, mk_eq, mk_gate, mk_not, mk_or, mk_xor};
pub use transform::transform_circuit;
