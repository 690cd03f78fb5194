//! Gate-level Boolean circuit intermediate representation: expression nodes, a validated
//! `Circuit` container, and its reference simulator.
pub mod circuit;
pub mod error;
pub mod node;

pub use circuit::{support, Circuit};
pub use error::{CircuitError, UnassignedInput};
pub use node::{Arena, BinOp, Node, NodeId};
