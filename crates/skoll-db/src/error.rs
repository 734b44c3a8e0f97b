//! Error types for the circuit database.

use skoll_ir::CircuitError;
use thiserror::Error;

/// Errors raised by the database and its codecs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DbError {
    /// Malformed binary dictionary: truncation or stray trailing bytes.
    #[error("Binary dictionary IO error: {0}")]
    BinaryDictIo(String),

    /// Bit-level read past the end, or a value exceeding its bit width.
    #[error("Bit IO error: {0}")]
    BitIo(String),

    /// Malformed or unencodable circuit payload.
    #[error("Circuit coding error: {0}")]
    CircuitCoding(String),

    /// A key is already present in the database.
    #[error("Label '{0}' is already in the database")]
    DuplicateLabel(String),

    /// A structural error from the circuit layer.
    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
