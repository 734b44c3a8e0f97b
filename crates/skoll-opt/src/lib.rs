//! Cut-based SAT minimization of Skoll circuits.
//!
//! [`minimize_subcircuits`] drives the simplification loop described by the
//! crate stack: enumerate bounded cuts of the host
//! ([`cuts::enumerate_cuts`]), canonicalize them and compute local truth
//! tables with reachability don't-cares ([`subcircuit`]), ask the
//! synthesizer for a strictly smaller realization of each region, and
//! splice successful replacements back while preserving the host's global
//! semantics.
//!
//! ```no_run
//! use skoll_opt::{MinimizeOptions, minimize_subcircuits};
//! # let circuit = skoll_ir::Circuit::new();
//!
//! let options = MinimizeOptions::default();
//! let smaller = minimize_subcircuits(&circuit, &options).unwrap();
//! ```

pub mod cleanup;
pub mod cuts;
pub mod error;
pub mod minimize;
pub mod subcircuit;

pub use cleanup::{collapse_unary_operators, merge_duplicate_gates, remove_redundant_gates};
pub use cuts::{Cut, CutEnumeration, enumerate_cuts};
pub use error::{MinimizeError, MinimizeResult};
pub use minimize::{MinimizeOptions, cost, minimize_subcircuits};
pub use subcircuit::Subcircuit;
