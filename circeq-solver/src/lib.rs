//! SAT-solving abstraction. Concrete decision procedures live behind the [`SatSolver`] trait so
//! the equivalence checker does not depend on any particular backend's API.
use std::collections::HashMap;

use circeq_formula::{Clause, CnfFormula, Lit, Var};
use log::info;
use thiserror::Error;

/// A satisfying assignment for every variable the solver tracked.
#[derive(Clone, Debug, Default)]
pub struct Model {
    values: HashMap<Var, bool>,
}

impl Model {
    pub fn value(&self, var: Var) -> Option<bool> {
        self.values.get(&var).copied()
    }

    /// Looks up the value of `lit`, accounting for its phase.
    pub fn value_of_lit(&self, lit: Lit) -> Option<bool> {
        self.value(lit.var())
            .map(|v| if lit.is_negative() { !v } else { v })
    }

    /// A clause that this model falsifies and any other model for the same variables also must
    /// falsify to differ from it: the negation of every literal this model assigns true.
    ///
    /// Asserting the result onto a formula rules this exact assignment out without touching any
    /// variable the model didn't cover, so repeated solve/block calls enumerate distinct models.
    pub fn blocking_clause(&self) -> Clause {
        self.values
            .iter()
            .map(|(&var, &value)| var.lit(!value))
            .collect()
    }
}

impl FromIterator<Lit> for Model {
    fn from_iter<I: IntoIterator<Item = Lit>>(iter: I) -> Model {
        let values = iter.into_iter().map(|lit| (lit.var(), lit.is_positive())).collect();
        Model { values }
    }
}

/// The outcome of a satisfiability query.
#[derive(Clone, Debug)]
pub enum Solution {
    Sat(Model),
    Unsat,
}

impl Solution {
    pub fn is_sat(&self) -> bool {
        matches!(self, Solution::Sat(_))
    }

    /// A clause blocking the model this solution found, or `None` if it is `Unsat`.
    pub fn blocking_clause(&self) -> Option<Clause> {
        match self {
            Solution::Sat(model) => Some(model.blocking_clause()),
            Solution::Unsat => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("solver returned an indeterminate result")]
    Unknown,
}

/// A decision procedure for satisfiability of a CNF formula.
///
/// Kept abstract so a different backend can be swapped in without touching the equivalence
/// checker built on top of it.
pub trait SatSolver {
    fn solve(&mut self, cnf: &CnfFormula) -> Result<Solution, SolverError>;
}

/// [`SatSolver`] backed by the `varisat` CDCL solver.
#[derive(Default)]
pub struct VarisatSolver;

impl VarisatSolver {
    pub fn new() -> VarisatSolver {
        VarisatSolver
    }
}

impl SatSolver for VarisatSolver {
    fn solve(&mut self, cnf: &CnfFormula) -> Result<Solution, SolverError> {
        let mut solver = varisat::Solver::new();
        solver.add_formula(&to_varisat_cnf(cnf));

        info!(
            "solving formula with {} variable(s), {} clause(s)",
            cnf.max_var_id(),
            cnf.len()
        );

        match solver.solve() {
            Some(true) => {
                let model = solver
                    .model()
                    .expect("a solver reporting Sat always has a model")
                    .into_iter()
                    .map(from_varisat_lit)
                    .collect();
                Ok(Solution::Sat(model))
            }
            Some(false) => Ok(Solution::Unsat),
            None => Err(SolverError::Unknown),
        }
    }
}

fn to_varisat_cnf(cnf: &CnfFormula) -> varisat::CnfFormula {
    let mut vcnf = varisat::CnfFormula::new();
    for clause in cnf.iter() {
        let literals: Vec<varisat::Lit> = clause
            .iter()
            .map(|lit| varisat::Lit::from_dimacs(lit.to_dimacs()))
            .collect();
        vcnf.add_clause(&literals);
    }
    vcnf
}

fn from_varisat_lit(lit: varisat::Lit) -> Lit {
    Lit::from_dimacs(lit.to_dimacs())
}
