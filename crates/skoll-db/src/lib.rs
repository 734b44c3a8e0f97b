//! Binary pattern database of small Skoll circuits.
//!
//! A [`CircuitDatabase`] caches small (typically optimal) circuits keyed by
//! label or truth table, persisted as a flat binary dictionary
//! ([`dict_io`]) whose values are bit-packed circuit payloads
//! ([`coding`]). The bit stream is little-endian at both byte and bit
//! level, so files are portable across platforms.

pub mod bit_io;
pub mod coding;
pub mod db;
pub mod dict_io;
pub mod error;

pub use bit_io::{BitReader, BitWriter};
pub use coding::{decode_circuit, encode_circuit};
pub use db::CircuitDatabase;
pub use dict_io::{BinaryDict, read_binary_dict, write_binary_dict};
pub use error::{DbError, DbResult};
