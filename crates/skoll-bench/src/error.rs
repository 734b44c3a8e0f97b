//! Error types for the `.bench` reader and writer.

use skoll_ir::CircuitError;
use thiserror::Error;

/// Errors that can occur while reading or writing `.bench` text.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BenchError {
    /// A line does not match any `.bench` production.
    #[error("Line {line}: cannot parse '{text}'")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },

    /// Unknown operator name.
    #[error("Line {line}: unknown operator '{name}'")]
    UnknownOperator {
        /// 1-based line number.
        line: usize,
        /// The operator as written.
        name: String,
    },

    /// Operator applied to the wrong number of arguments.
    #[error("Line {line}: operator '{name}' cannot take {got} arguments")]
    WrongArity {
        /// 1-based line number.
        line: usize,
        /// The operator as written.
        name: String,
        /// Number of arguments provided.
        got: usize,
    },

    /// The same gate is defined twice.
    #[error("Line {line}: gate '{label}' is defined twice")]
    DuplicateDefinition {
        /// 1-based line number.
        line: usize,
        /// The redefined label.
        label: String,
    },

    /// A referenced gate is never defined.
    #[error("Gate '{label}' is referenced but never defined")]
    UndefinedGate {
        /// The dangling label.
        label: String,
    },

    /// Definitions form a cycle.
    #[error("Gate definitions form a cycle involving '{label}'")]
    CyclicDefinition {
        /// A gate on the cycle.
        label: String,
    },

    /// The format cannot express a constant gate without an input to
    /// rewrite it over.
    #[error("Cannot write constant gate '{label}': circuit has no inputs")]
    ConstantWithoutInputs {
        /// The constant gate.
        label: String,
    },

    /// A structural error from the circuit layer.
    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

/// Result type for `.bench` operations.
pub type BenchResult<T> = Result<T, BenchError>;
