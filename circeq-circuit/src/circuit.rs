//! The `Circuit` type: validated gate-level Boolean circuits and their simulator.
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::error::{CircuitError, UnassignedInput};
use crate::node::{Arena, BinOp, Node, NodeId};

/// The free variable names referenced in the subtree rooted at `root`.
///
/// A [`Node::Variable`] is a leaf for this purpose even when its name is itself an equation key —
/// support does not recurse across equation boundaries, it only reports what an expression
/// directly mentions. This is what makes `deps(name) = support(equations[name])` a well-formed,
/// one-level dependency edge set for the acyclicity check below.
pub fn support(arena: &Arena, root: NodeId) -> BTreeSet<String> {
    let mut cache: Vec<Option<BTreeSet<String>>> = vec![None; arena.len()];
    let mut stack = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        if cache[id.index() as usize].is_some() {
            continue;
        }
        match arena.get(id) {
            Node::Literal(_) => cache[id.index() as usize] = Some(BTreeSet::new()),
            Node::Variable(name) => {
                let mut set = BTreeSet::new();
                set.insert(name.clone());
                cache[id.index() as usize] = Some(set);
            }
            Node::Not(child) => {
                if !expanded {
                    stack.push((id, true));
                    stack.push((*child, false));
                } else {
                    let set = cache[child.index() as usize].clone().unwrap();
                    cache[id.index() as usize] = Some(set);
                }
            }
            Node::Bin(_, lhs, rhs) => {
                if !expanded {
                    stack.push((id, true));
                    stack.push((*rhs, false));
                    stack.push((*lhs, false));
                } else {
                    let mut set = cache[lhs.index() as usize].clone().unwrap();
                    set.extend(cache[rhs.index() as usize].clone().unwrap());
                    cache[id.index() as usize] = Some(set);
                }
            }
        }
    }
    cache[root.index() as usize].clone().unwrap()
}

/// A validated gate-level Boolean circuit.
///
/// A `Circuit` can only be built through [`Circuit::new`], which runs every check in §4.3 of the
/// design before returning — a `Circuit` value is always simulable, by construction.
#[derive(Clone, Debug)]
pub struct Circuit {
    name: String,
    inputs: BTreeSet<String>,
    outputs: BTreeSet<String>,
    /// Equations in definition order, for deterministic Tseitin clause emission.
    eq_order: Vec<(String, NodeId)>,
    eq_index: HashMap<String, usize>,
    arena: Arena,
}

impl Circuit {
    /// Builds and validates a circuit.
    ///
    /// `equations` may list a signal more than once; later definitions simply replace earlier
    /// ones in the index while keeping their original position, matching Python dict-literal
    /// semantics in the system this was distilled from.
    pub fn new(
        name: impl Into<String>,
        inputs: impl IntoIterator<Item = impl Into<String>>,
        outputs: impl IntoIterator<Item = impl Into<String>>,
        equations: Vec<(String, NodeId)>,
        arena: Arena,
    ) -> Result<Circuit, CircuitError> {
        let inputs: BTreeSet<String> = inputs.into_iter().map(Into::into).collect();
        let outputs: BTreeSet<String> = outputs.into_iter().map(Into::into).collect();

        let mut eq_order: Vec<(String, NodeId)> = Vec::with_capacity(equations.len());
        let mut eq_index: HashMap<String, usize> = HashMap::with_capacity(equations.len());
        for (name, node) in equations {
            if let Some(&pos) = eq_index.get(&name) {
                eq_order[pos].1 = node;
            } else {
                eq_index.insert(name.clone(), eq_order.len());
                eq_order.push((name, node));
            }
        }

        let circuit = Circuit {
            name: name.into(),
            inputs,
            outputs,
            eq_order,
            eq_index,
            arena,
        };
        circuit.check()?;
        Ok(circuit)
    }

    fn check(&self) -> Result<(), CircuitError> {
        if self.outputs.is_empty() {
            return Err(CircuitError::NoOutputs);
        }

        for output in &self.outputs {
            if !self.eq_index.contains_key(output) {
                return Err(CircuitError::UndefinedOutput(output.clone()));
            }
        }

        for input in &self.inputs {
            if self.eq_index.contains_key(input) {
                return Err(CircuitError::OverConstrainedInput(input.clone()));
            }
        }

        let deps: HashMap<String, BTreeSet<String>> = self
            .eq_order
            .iter()
            .map(|(name, node)| (name.clone(), support(&self.arena, *node)))
            .collect();

        for deps_of_name in deps.values() {
            for y in deps_of_name {
                if !self.inputs.contains(y) && !self.eq_index.contains_key(y) {
                    return Err(CircuitError::UndefinedSignal(y.clone()));
                }
            }
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut on_stack: HashSet<String> = HashSet::new();
        let mut path: Vec<String> = Vec::new();
        for name in deps.keys() {
            if !visited.contains(name) {
                visit(name, &deps, &mut visited, &mut on_stack, &mut path)?;
            }
        }

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &BTreeSet<String> {
        &self.inputs
    }

    pub fn outputs(&self) -> &BTreeSet<String> {
        &self.outputs
    }

    /// Signal names with a defining equation, in definition order. Includes outputs and any
    /// named internal signal.
    pub fn signals(&self) -> impl Iterator<Item = &str> {
        self.eq_order.iter().map(|(name, _)| name.as_str())
    }

    /// The root node of the equation defining `name`, if any.
    pub fn equation(&self, name: &str) -> Option<NodeId> {
        self.eq_index.get(name).map(|&idx| self.eq_order[idx].1)
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The free variable names referenced by the equation rooted at `node`.
    pub fn support(&self, node: NodeId) -> BTreeSet<String> {
        support(&self.arena, node)
    }

    /// Simulates the circuit under `inputs`, failing if an input the circuit references is
    /// missing from the assignment.
    pub fn simulate(
        &self,
        inputs: &HashMap<String, bool>,
    ) -> Result<HashMap<String, bool>, UnassignedInput> {
        self.simulate_impl(inputs, false)
    }

    /// Simulates the circuit under `inputs`, treating any input missing from the assignment as
    /// `false`. This is the contract the equivalence-check driver relies on.
    pub fn simulate_total(&self, inputs: &HashMap<String, bool>) -> HashMap<String, bool> {
        self.simulate_impl(inputs, true)
            .expect("missing inputs default to false, so this can never fail")
    }

    fn simulate_impl(
        &self,
        inputs: &HashMap<String, bool>,
        default_missing_to_false: bool,
    ) -> Result<HashMap<String, bool>, UnassignedInput> {
        let mut signals: HashMap<String, bool> = HashMap::new();
        let mut nodes: HashMap<NodeId, bool> = HashMap::new();

        enum Item {
            Signal(String),
            Node(NodeId),
        }

        for key in self.eq_order.iter().map(|(name, _)| name.clone()) {
            if signals.contains_key(&key) {
                continue;
            }

            // Explicit work-stack post-order traversal: large circuits (e.g. ripple-carry
            // adders with thousands of gates) can chain deeply through named signals, and this
            // avoids growing the native call stack with it.
            let mut stack = vec![(Item::Signal(key), false)];
            while let Some((item, expanded)) = stack.pop() {
                match item {
                    Item::Signal(name) => {
                        if signals.contains_key(&name) {
                            continue;
                        }
                        if let Some(&value) = inputs.get(&name) {
                            signals.insert(name, value);
                            continue;
                        }
                        if let Some(&idx) = self.eq_index.get(&name) {
                            let root = self.eq_order[idx].1;
                            if !expanded {
                                stack.push((Item::Signal(name), true));
                                stack.push((Item::Node(root), false));
                            } else {
                                let value = nodes[&root];
                                signals.insert(name, value);
                            }
                        } else if default_missing_to_false {
                            signals.insert(name, false);
                        } else {
                            return Err(UnassignedInput(name));
                        }
                    }
                    Item::Node(id) => {
                        if nodes.contains_key(&id) {
                            continue;
                        }
                        match self.arena.get(id) {
                            Node::Literal(value) => {
                                nodes.insert(id, *value);
                            }
                            Node::Variable(name) => {
                                if let Some(&value) = signals.get(name) {
                                    nodes.insert(id, value);
                                } else if !expanded {
                                    stack.push((Item::Node(id), true));
                                    stack.push((Item::Signal(name.clone()), false));
                                } else {
                                    let value = signals[name];
                                    nodes.insert(id, value);
                                }
                            }
                            Node::Not(child) => {
                                if !expanded {
                                    stack.push((Item::Node(id), true));
                                    stack.push((Item::Node(*child), false));
                                } else {
                                    let value = nodes[child];
                                    nodes.insert(id, !value);
                                }
                            }
                            Node::Bin(op, lhs, rhs) => {
                                if !expanded {
                                    stack.push((Item::Node(id), true));
                                    stack.push((Item::Node(*rhs), false));
                                    stack.push((Item::Node(*lhs), false));
                                } else {
                                    let value = op.eval(nodes[lhs], nodes[rhs]);
                                    nodes.insert(id, value);
                                }
                            }
                        }
                    }
                }
            }
        }

        let mut result = HashMap::with_capacity(self.outputs.len() + self.eq_order.len());
        for (name, _) in &self.eq_order {
            if let Some(&value) = signals.get(name) {
                result.insert(name.clone(), value);
            }
        }
        Ok(result)
    }

    /// Structural simplification: inlines any named signal with exactly one consumer into its
    /// sole consumer, then deletes every signal no longer reachable from an output. Re-validates
    /// the result, since inlining does not itself preserve the invariants by construction.
    ///
    /// Outputs are never inlined away even if some other equation happens to reference them,
    /// since doing so would violate the "every output has an equation" invariant.
    pub fn clean(&self) -> Result<Circuit, CircuitError> {
        let deps: HashMap<String, BTreeSet<String>> = self
            .eq_order
            .iter()
            .map(|(name, node)| (name.clone(), self.support(*node)))
            .collect();

        let mut fanout: HashMap<String, usize> = HashMap::new();
        for referenced in deps.values() {
            for y in referenced {
                *fanout.entry(y.clone()).or_insert(0) += 1;
            }
        }

        let collapse: HashSet<String> = fanout
            .into_iter()
            .filter(|(name, count)| {
                *count == 1 && !self.inputs.contains(name) && !self.outputs.contains(name)
            })
            .map(|(name, _)| name)
            .collect();

        let mut new_arena = Arena::new();
        let mut rebuilt_collapsed: HashMap<String, NodeId> = HashMap::new();

        let mut new_equations = Vec::with_capacity(self.eq_order.len());
        for (name, root) in &self.eq_order {
            if collapse.contains(name) {
                continue;
            }
            let new_root = rebuild_inlining(self, *root, &collapse, &mut rebuilt_collapsed, &mut new_arena);
            new_equations.push((name.clone(), new_root));
        }

        let new_deps: HashMap<String, BTreeSet<String>> = new_equations
            .iter()
            .map(|(name, node)| (name.clone(), support(&new_arena, *node)))
            .collect();

        let mut reachable: HashSet<String> = self.outputs.clone();
        let mut frontier: Vec<String> = self.outputs.iter().cloned().collect();
        while let Some(name) = frontier.pop() {
            if let Some(referenced) = new_deps.get(&name) {
                for y in referenced {
                    if new_deps.contains_key(y) && reachable.insert(y.clone()) {
                        frontier.push(y.clone());
                    }
                }
            }
        }

        let final_equations: Vec<(String, NodeId)> = new_equations
            .into_iter()
            .filter(|(name, _)| self.outputs.contains(name) || reachable.contains(name))
            .collect();

        Circuit::new(
            self.name.clone(),
            self.inputs.iter().cloned(),
            self.outputs.iter().cloned(),
            final_equations,
            new_arena,
        )
    }
}

fn rebuild_inlining(
    old: &Circuit,
    id: NodeId,
    collapse: &HashSet<String>,
    rebuilt_collapsed: &mut HashMap<String, NodeId>,
    new_arena: &mut Arena,
) -> NodeId {
    match old.arena.get(id) {
        Node::Literal(value) => new_arena.literal(*value),
        Node::Variable(name) => {
            if collapse.contains(name) {
                if let Some(&cached) = rebuilt_collapsed.get(name) {
                    return cached;
                }
                let root = old
                    .equation(name)
                    .expect("collapse candidates are always equation keys");
                let rebuilt = rebuild_inlining(old, root, collapse, rebuilt_collapsed, new_arena);
                rebuilt_collapsed.insert(name.clone(), rebuilt);
                rebuilt
            } else {
                new_arena.variable(name.clone())
            }
        }
        Node::Not(child) => {
            let child = rebuild_inlining(old, *child, collapse, rebuilt_collapsed, new_arena);
            new_arena.not(child)
        }
        Node::Bin(op, lhs, rhs) => {
            let lhs = rebuild_inlining(old, *lhs, collapse, rebuilt_collapsed, new_arena);
            let rhs = rebuild_inlining(old, *rhs, collapse, rebuilt_collapsed, new_arena);
            new_arena.bin(*op, lhs, rhs)
        }
    }
}

fn visit(
    name: &str,
    deps: &HashMap<String, BTreeSet<String>>,
    visited: &mut HashSet<String>,
    on_stack: &mut HashSet<String>,
    path: &mut Vec<String>,
) -> Result<(), CircuitError> {
    if on_stack.contains(name) {
        let start = path.iter().position(|n| n == name).unwrap_or(0);
        let mut cycle = path[start..].to_vec();
        cycle.push(name.to_string());
        return Err(CircuitError::CombinationalLoop { path: cycle });
    }
    if visited.contains(name) {
        return Ok(());
    }

    let Some(referenced) = deps.get(name) else {
        // Input names (and anything else with no equation) terminate the walk.
        visited.insert(name.to_string());
        return Ok(());
    };

    on_stack.insert(name.to_string());
    path.push(name.to_string());
    for y in referenced {
        visit(y, deps, visited, on_stack, path)?;
    }
    path.pop();
    on_stack.remove(name);
    visited.insert(name.to_string());
    Ok(())
}

fn write_node(f: &mut fmt::Formatter, arena: &Arena, id: NodeId) -> fmt::Result {
    match arena.get(id) {
        Node::Literal(true) => write!(f, "1"),
        Node::Literal(false) => write!(f, "0"),
        Node::Variable(name) => write!(f, "{}", name),
        Node::Not(child) => {
            write!(f, "(~ ")?;
            write_node(f, arena, *child)?;
            write!(f, ")")
        }
        Node::Bin(op, lhs, rhs) => {
            write!(f, "(")?;
            write_node(f, arena, *lhs)?;
            write!(f, " {} ", op.symbol())?;
            write_node(f, arena, *rhs)?;
            write!(f, ")")
        }
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "circ {} {{", self.name)?;
        writeln!(
            f,
            "    inputs: {}",
            self.inputs.iter().cloned().collect::<Vec<_>>().join(", ")
        )?;
        writeln!(
            f,
            "    outputs: {}",
            self.outputs.iter().cloned().collect::<Vec<_>>().join(", ")
        )?;
        for (name, root) in &self.eq_order {
            write!(f, "    {} = ", name)?;
            write_node(f, &self.arena, *root)?;
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}
