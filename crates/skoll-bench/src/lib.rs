//! `.bench` format support for Skoll circuits.
//!
//! The `.bench` format (CircuitSAT / ISCAS benchmarks) is line-oriented:
//!
//! ```text
//! # comment
//! INPUT(a)
//! INPUT(b)
//! OUTPUT(s)
//! s = XOR(a, b)
//! ```
//!
//! [`parse_bench`] reads such text into a [`skoll_ir::Circuit`];
//! [`write_bench`] serializes a circuit back. Operator names are
//! case-insensitive; whitespace around tokens is insignificant; definitions
//! may reference gates declared later in the file.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod writer;

pub use error::{BenchError, BenchResult};
pub use parser::parse_bench;
pub use writer::write_bench;
