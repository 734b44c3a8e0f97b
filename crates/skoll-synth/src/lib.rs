//! SAT-based exact synthesis for Skoll circuits.
//!
//! The central entry point is [`CircuitFinder`], which encodes "does a
//! circuit of `r` gates over basis `B` realize a (partial) truth-table
//! model?" as CNF, hands it to a SAT solver, and decodes satisfying
//! assignments back into [`skoll_ir::Circuit`]s.
//!
//! # Example: two XOR gates realize parity of three
//!
//! ```no_run
//! use skoll_ir::TruthTableModel;
//! use skoll_synth::{Basis, CircuitFinder};
//!
//! let parity = TruthTableModel::from_strings(&["10010110"]).unwrap();
//! let mut finder = CircuitFinder::new(parity, 2, Basis::xaig());
//! let circuit = finder.find_circuit(None).unwrap();
//! assert_eq!(circuit.num_internal_gates(), 2);
//! ```
//!
//! The crate also carries the CNF plumbing shared by SAT consumers: the
//! [`VarPool`]/[`Cnf`] builders, the [`TseytinTransform`] of a circuit, and
//! miter-based equivalence checking.

pub mod basis;
pub mod cnf;
pub mod error;
pub mod finder;
pub mod miter;
pub mod solver;
pub mod tseytin;

pub use basis::{Basis, Operation};
pub use cnf::{Clause, Cnf, VarPool};
pub use error::{SynthError, SynthResult};
pub use finder::CircuitFinder;
pub use miter::{are_equivalent, build_miter, is_satisfiable};
pub use solver::{KissatSolver, SatModel, SatSolver, SolverOutcome};
pub use tseytin::TseytinTransform;
