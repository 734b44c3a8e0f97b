//! Skoll Circuit Intermediate Representation
//!
//! This crate provides the core data structures for representing boolean
//! circuits in Skoll. It forms the foundation of the synthesis and
//! minimization stack.
//!
//! # Overview
//!
//! A [`Circuit`] is a mutable DAG of [`Gate`]s addressed by string labels.
//! Besides the operand links, the circuit maintains the reverse `users`
//! index, ordered inputs and outputs (output ports may repeat), and named
//! [`Block`] views for compositional construction. All mutators preserve the
//! structural invariants — operand existence, user/operand coherence,
//! acyclicity — and fail without partial effects.
//!
//! # Core components
//!
//! - **Logic**: [`TriValue`] three-valued evaluation domain
//! - **Gates**: the closed [`GateType`] catalog with four-bit tables and
//!   three-valued evaluators
//! - **Truth tables**: concrete [`TruthTable`] and [`TruthTableModel`] with
//!   don't-care cells
//! - **Traversal**: lazy [`TopSort`], [`Dfs`] (with enter/exit/discover
//!   hooks) and [`Bfs`] iterators
//! - **Analysis**: the [`BooleanFunction`] trait with structural queries,
//!   implemented for circuits and truth tables
//!
//! # Example: building and evaluating a half adder
//!
//! ```rust
//! use skoll_ir::{BooleanFunction, Circuit, GateType};
//!
//! let mut circuit = Circuit::new();
//! circuit.add_input("a").unwrap();
//! circuit.add_input("b").unwrap();
//! circuit.emplace_gate("sum", GateType::Xor, &["a", "b"]).unwrap();
//! circuit.emplace_gate("carry", GateType::And, &["a", "b"]).unwrap();
//! circuit.mark_as_output("sum").unwrap();
//! circuit.mark_as_output("carry").unwrap();
//!
//! let tt = circuit.get_truth_table();
//! assert_eq!(tt.to_strings(), vec!["0110", "0001"]);
//! ```

pub mod analysis;
pub mod block;
pub mod circuit;
pub mod error;
pub mod gate;
pub mod logic;
pub mod traversal;
pub mod truth_table;
pub mod validation;

pub use analysis::BooleanFunction;
pub use block::Block;
pub use circuit::Circuit;
pub use error::{CircuitError, CircuitResult};
pub use gate::{Gate, GateType, Label};
pub use logic::TriValue;
pub use traversal::{Bfs, Dfs, DfsHooks, TopSort, TraverseDirection, TraverseState};
pub use truth_table::{TruthTable, TruthTableModel, canonical_input};
pub use validation::{check_acyclic, verify_integrity};
