//! Tseitin transformation of a [`Circuit`] into a [`CnfFormula`].
use std::collections::HashMap;

use circeq_circuit::{Arena, Circuit, Node, NodeId};
use circeq_formula::{CnfFormula, Lit, SymbolTable};

use crate::gates::{mk_eq, mk_gate, mk_not};

/// Encodes every named signal of `circuit` into `cnf`, allocating CNF variables through `symtab`.
///
/// Every input, output, and named internal signal gets a CNF variable named `{prefix}{signal}`,
/// so a satisfying assignment can be read back by indexing the solution with the circuit's own
/// signal names. Unnamed subexpression nodes get a variable named `{prefix}s{node_id}`. Traversal
/// is an explicit work-stack, not native recursion, since a single equation's expression tree can
/// be arbitrarily deep.
pub fn transform_circuit(circuit: &Circuit, prefix: &str, symtab: &mut SymbolTable) -> CnfFormula {
    let mut cnf = CnfFormula::new();
    let arena = circuit.arena();
    let mut node_lits: HashMap<NodeId, Lit> = HashMap::new();

    for name in circuit.signals() {
        let root = circuit
            .equation(name)
            .expect("circuit.signals() only yields names with an equation");
        let signal_lit = symtab.lit(&format!("{prefix}{name}"));

        match arena.get(root) {
            Node::Variable(ref_name) => {
                let a = symtab.lit(&format!("{prefix}{ref_name}"));
                cnf.conjoin(&mk_eq(signal_lit, a));
            }
            Node::Literal(true) => cnf.assert_lit(signal_lit),
            Node::Literal(false) => cnf.assert_lit(!signal_lit),
            Node::Not(child) => {
                let a = transform_node(arena, *child, prefix, symtab, &mut node_lits, &mut cnf);
                cnf.conjoin(&mk_not(signal_lit, a));
            }
            Node::Bin(op, lhs, rhs) => {
                let a = transform_node(arena, *lhs, prefix, symtab, &mut node_lits, &mut cnf);
                let b = transform_node(arena, *rhs, prefix, symtab, &mut node_lits, &mut cnf);
                cnf.conjoin(&mk_gate(*op, signal_lit, a, b));
            }
        }
    }

    cnf
}

/// Encodes the subexpression rooted at `root` and returns the literal representing its value.
/// Named signal references reuse the existing `{prefix}{name}` variable rather than allocating a
/// fresh one, since that variable is already tied to its own equation by `transform_circuit`.
fn transform_node(
    arena: &Arena,
    root: NodeId,
    prefix: &str,
    symtab: &mut SymbolTable,
    node_lits: &mut HashMap<NodeId, Lit>,
    cnf: &mut CnfFormula,
) -> Lit {
    let mut stack = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        if node_lits.contains_key(&id) {
            continue;
        }
        match arena.get(id) {
            Node::Variable(name) => {
                let lit = symtab.lit(&format!("{prefix}{name}"));
                node_lits.insert(id, lit);
            }
            Node::Literal(value) => {
                let lit = symtab.lit(&format!("{prefix}s{}", id.index()));
                if *value {
                    cnf.assert_lit(lit);
                } else {
                    cnf.assert_lit(!lit);
                }
                node_lits.insert(id, lit);
            }
            Node::Not(child) => {
                if !expanded {
                    stack.push((id, true));
                    stack.push((*child, false));
                } else {
                    let a = node_lits[child];
                    let lit = symtab.lit(&format!("{prefix}s{}", id.index()));
                    cnf.conjoin(&mk_not(lit, a));
                    node_lits.insert(id, lit);
                }
            }
            Node::Bin(op, lhs, rhs) => {
                if !expanded {
                    stack.push((id, true));
                    stack.push((*rhs, false));
                    stack.push((*lhs, false));
                } else {
                    let a = node_lits[lhs];
                    let b = node_lits[rhs];
                    let lit = symtab.lit(&format!("{prefix}s{}", id.index()));
                    cnf.conjoin(&mk_gate(*op, lit, a, b));
                    node_lits.insert(id, lit);
                }
            }
        }
    }
    node_lits[&root]
}
