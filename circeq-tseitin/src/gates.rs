//! The per-gate Tseitin clause sets. Each `mk_*` function returns the CNF of `s <=> gate(...)`.
use circeq_circuit::BinOp;
use circeq_formula::{CnfFormula, Lit};

pub fn mk_and(s: Lit, a: Lit, b: Lit) -> CnfFormula {
    let mut cnf = CnfFormula::new();
    cnf.add_clause([!a, !b, s]);
    cnf.add_clause([!s, a]);
    cnf.add_clause([!s, b]);
    cnf
}

pub fn mk_or(s: Lit, a: Lit, b: Lit) -> CnfFormula {
    let mut cnf = CnfFormula::new();
    cnf.add_clause([a, b, !s]);
    cnf.add_clause([s, !a]);
    cnf.add_clause([s, !b]);
    cnf
}

pub fn mk_xor(s: Lit, a: Lit, b: Lit) -> CnfFormula {
    let mut cnf = CnfFormula::new();
    cnf.add_clause([!s, a, b]);
    cnf.add_clause([!s, !a, !b]);
    cnf.add_clause([s, !a, b]);
    cnf.add_clause([s, a, !b]);
    cnf
}

pub fn mk_not(s: Lit, a: Lit) -> CnfFormula {
    let mut cnf = CnfFormula::new();
    cnf.add_clause([s, a]);
    cnf.add_clause([!s, !a]);
    cnf
}

pub fn mk_eq(s: Lit, a: Lit) -> CnfFormula {
    let mut cnf = CnfFormula::new();
    cnf.add_clause([s, !a]);
    cnf.add_clause([!s, a]);
    cnf
}

pub fn mk_gate(op: BinOp, s: Lit, a: Lit, b: Lit) -> CnfFormula {
    match op {
        BinOp::And => mk_and(s, a, b),
        BinOp::Or => mk_or(s, a, b),
        BinOp::Xor => mk_xor(s, a, b),
    }
}
