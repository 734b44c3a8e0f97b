//! Error types for circuit minimization.

use skoll_ir::{CircuitError, Label};
use skoll_synth::SynthError;
use thiserror::Error;

/// Errors raised by the minimization driver.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MinimizeError {
    /// A gate in the host circuit has no local truth-table evaluator.
    #[error("Gate '{label}' has no local truth-table evaluator")]
    UnsupportedOperation {
        /// The offending gate.
        label: Label,
    },

    /// The minimized circuit disagrees with the original.
    #[error("Minimized circuit is not equivalent to the original")]
    FailedValidation,

    /// A synthesis error that is not part of the normal skip flow.
    #[error(transparent)]
    Synth(#[from] SynthError),

    /// A structural error from the circuit layer.
    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

/// Result type for minimization operations.
pub type MinimizeResult<T> = Result<T, MinimizeError>;
