//! The equivalence-check driver: glues parsing, simulation, Tseitin transform, and the SAT
//! solver binding together behind the four operations of the external driver API.
pub mod miter;

pub use miter::{check, Counterexample, MiterError, Verdict};

pub use circeq_circuit::{Circuit, CircuitError};
pub use circeq_parser::{parse, ParseError};
pub use circeq_solver::{SatSolver, Solution, SolverError, VarisatSolver};
pub use circeq_tseitin::transform_circuit as transform;
