//! Error types for the circuit IR.

use crate::gate::Label;
use thiserror::Error;

/// Errors raised by circuit construction and mutation.
///
/// Every failing operation leaves the circuit in its pre-call state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CircuitError {
    /// A referenced gate is not present in the circuit.
    #[error("Gate '{label}' is absent from the circuit")]
    GateAbsent {
        /// The missing label.
        label: Label,
    },

    /// A gate with this label already exists.
    #[error("Gate '{label}' already exists in the circuit")]
    GateExists {
        /// The duplicate label.
        label: Label,
    },

    /// The gate still has users (or is an output) and cannot be removed.
    #[error("Gate '{label}' has users and cannot be removed")]
    GateHasUsers {
        /// The label of the gate in use.
        label: Label,
    },

    /// A block with this name already exists.
    #[error("Block '{name}' already exists in the circuit")]
    BlockExists {
        /// The duplicate block name.
        name: String,
    },

    /// No block with this name exists.
    #[error("Block '{name}' is absent from the circuit")]
    BlockAbsent {
        /// The missing block name.
        name: String,
    },

    /// A non-output gate of the block is used outside of the block.
    #[error("Block '{name}': gate '{label}' is used outside the block")]
    BlockHasUsers {
        /// The block name.
        name: String,
        /// The leaking gate.
        label: Label,
    },

    /// The mutation would create a directed cycle.
    #[error("Operation would introduce a cycle into the circuit")]
    CycleIntroduced,

    /// A truth-table row set has the wrong shape for this circuit.
    #[error("Bad truth table shape: expected {expected} values, got {got}")]
    BadTruthTableShape {
        /// Expected number of values.
        expected: usize,
        /// Provided number of values.
        got: usize,
    },

    /// A character does not denote a boolean (or don't-care) value.
    #[error("Bad boolean value '{value}'")]
    BadBooleanValue {
        /// The offending character.
        value: char,
    },
}

/// Result type for circuit operations.
pub type CircuitResult<T> = Result<T, CircuitError>;
