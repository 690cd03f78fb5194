//! The `broken-circuit` and `unassigned-input` error taxonomies.
use thiserror::Error;

/// Raised by [`Circuit::new`](crate::circuit::Circuit::new) when validation fails.
///
/// This is fatal at the call site: a `Circuit` that fails to construct simply does not exist,
/// matching the "fail fast, surface with context" policy — there is no partially-valid circuit to
/// recover into.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CircuitError {
    #[error("circuit has no outputs: at least one is required")]
    NoOutputs,

    #[error("undefined output '{0}': no equation defines this signal")]
    UndefinedOutput(String),

    #[error("over-constrained input '{0}': inputs may not have an equation")]
    OverConstrainedInput(String),

    #[error("undefined signal '{0}': referenced but neither an input nor an equation")]
    UndefinedSignal(String),

    #[error("combinational loop detected: {}", path.join(" -> "))]
    CombinationalLoop { path: Vec<String> },
}

/// Raised by [`Circuit::simulate`](crate::circuit::Circuit::simulate) when an input is missing
/// from the caller-supplied assignment.
///
/// The equivalence-check driver never triggers this: it treats a missing input as `false`
/// instead (see [`Circuit::simulate_total`](crate::circuit::Circuit::simulate_total)). This error
/// exists for library callers that want strict behavior.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unassigned input '{0}'")]
pub struct UnassignedInput(pub String);
