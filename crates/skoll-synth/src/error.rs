//! Error types for SAT-based synthesis.

use skoll_ir::CircuitError;
use thiserror::Error;

/// Errors raised by the synthesizer and its solver boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SynthError {
    /// The encoding is unsatisfiable: no circuit of the requested size
    /// realizes the model over the given basis.
    #[error("No circuit of the requested size realizes the model")]
    NoSolution,

    /// The solver hit the time limit before deciding.
    #[error("SAT solver timed out")]
    SolverTimedOut,

    /// A gate index is outside the encoding's gate range.
    #[error("Gate index {index} is absent from the encoding")]
    GateAbsent {
        /// The out-of-range index.
        index: usize,
    },

    /// Malformed `fix_gate` request: a second predecessor without a first,
    /// or predecessors not in strictly increasing order below the gate.
    #[error("fix_gate predecessors must be ordered and precede gate {gate}")]
    FixGateOrder {
        /// The constrained gate.
        gate: usize,
    },

    /// Malformed `forbid_wire` request: the source must precede the sink.
    #[error("forbid_wire requires from < to, got {from} >= {to}")]
    ForbidWireOrder {
        /// Source gate index.
        from: usize,
        /// Sink gate index.
        to: usize,
    },

    /// A basis member has no two-operand truth table.
    #[error("Operator {name} cannot participate in a synthesis basis")]
    BadBasis {
        /// Name of the rejected operator.
        name: &'static str,
    },

    /// The two sides of a miter disagree in arity.
    #[error("Miter operands differ in shape: {left_inputs}x{left_outputs} vs {right_inputs}x{right_outputs}")]
    MiterShapeMismatch {
        /// Inputs of the left circuit.
        left_inputs: usize,
        /// Outputs of the left circuit.
        left_outputs: usize,
        /// Inputs of the right circuit.
        right_inputs: usize,
        /// Outputs of the right circuit.
        right_outputs: usize,
    },

    /// The backend solver failed outright.
    #[error("SAT solver failure: {0}")]
    Solver(String),

    /// A structural error from the circuit layer.
    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;
