//! Miter construction: combine two circuits into a CNF that is satisfiable iff they disagree.
use std::collections::HashMap;

use circeq_circuit::Circuit;
use circeq_formula::{CnfFormula, SymbolTable};
use circeq_solver::{SatSolver, Solution, SolverError};
use circeq_tseitin::{mk_eq, mk_or, mk_xor, transform_circuit};
use log::info;
use thiserror::Error;

const PREFIX_1: &str = "c1_";
const PREFIX_2: &str = "c2_";

#[derive(Debug, Error)]
pub enum MiterError {
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// A concrete input assignment on which two circuits disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample {
    pub inputs: HashMap<String, bool>,
}

/// The result of an equivalence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Equivalent,
    /// `None` when the circuits were rejected before a solver call (interface mismatch);
    /// `Some` when the solver produced a witnessing input assignment.
    Different(Option<Counterexample>),
}

impl Verdict {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, Verdict::Equivalent)
    }
}

/// Checks whether `c1` and `c2` compute the same Boolean function.
///
/// Rejects immediately, without a solver call, if the two circuits do not share an identical
/// input/output interface.
pub fn check(
    c1: &Circuit,
    c2: &Circuit,
    solver: &mut impl SatSolver,
) -> Result<Verdict, MiterError> {
    if c1.inputs() != c2.inputs() || c1.outputs() != c2.outputs() {
        return Ok(Verdict::Different(None));
    }

    let mut symtab = SymbolTable::new();
    let f1 = transform_circuit(c1, PREFIX_1, &mut symtab);
    let f2 = transform_circuit(c2, PREFIX_2, &mut symtab);

    let mut cnf = CnfFormula::new();
    cnf.conjoin(&f1);
    cnf.conjoin(&f2);

    for x in c1.inputs() {
        let shared = symtab.lit(x);
        let p1x = symtab.lit(&format!("{PREFIX_1}{x}"));
        let p2x = symtab.lit(&format!("{PREFIX_2}{x}"));
        cnf.conjoin(&mk_eq(shared, p1x));
        cnf.conjoin(&mk_eq(shared, p2x));
    }

    let mut disagreements = Vec::with_capacity(c1.outputs().len());
    for y in c1.outputs() {
        let p1y = symtab.lit(&format!("{PREFIX_1}{y}"));
        let p2y = symtab.lit(&format!("{PREFIX_2}{y}"));
        let d_y = symtab.lit(&format!("miter_xor_{y}"));
        cnf.conjoin(&mk_xor(d_y, p1y, p2y));
        disagreements.push(d_y);
    }

    let mut cascade = disagreements.into_iter();
    let mut disagree = cascade
        .next()
        .expect("a validated circuit always has at least one output");
    for (idx, next) in cascade.enumerate() {
        let combined = symtab.lit(&format!("miter_or_{idx}"));
        cnf.conjoin(&mk_or(combined, disagree, next));
        disagree = combined;
    }
    cnf.assert_lit(disagree);

    info!(
        "miter formula: {} variable(s), {} clause(s)",
        cnf.max_var_id(),
        cnf.len()
    );

    match solver.solve(&cnf)? {
        Solution::Unsat => Ok(Verdict::Equivalent),
        Solution::Sat(model) => {
            let mut inputs = HashMap::with_capacity(c1.inputs().len());
            for x in c1.inputs() {
                let var = symtab.var(x);
                let value = model.value(var).unwrap_or(false);
                inputs.insert(x.clone(), value);
            }
            Ok(Verdict::Different(Some(Counterexample { inputs })))
        }
    }
}
