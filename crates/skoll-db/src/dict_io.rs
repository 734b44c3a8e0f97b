//! The flat key→value dictionary layout backing the database.
//!
//! ```text
//! u64 LE: entry count N
//! repeat N times:
//!   u16 LE: key length K;   K bytes UTF-8 key
//!   u16 LE: value length V; V bytes opaque value
//! ```
//!
//! Reading fails on truncation and on stray trailing bytes.

use std::io::{Read, Write};

use crate::error::{DbError, DbResult};

/// An ordered key→value dictionary (insertion order is preserved so that
/// writing is deterministic).
pub type BinaryDict = Vec<(String, Vec<u8>)>;

/// Read a dictionary from a stream, expecting EOF right after the last
/// entry.
pub fn read_binary_dict(stream: &mut impl Read) -> DbResult<BinaryDict> {
    let count = read_u64(stream)?;
    let mut dict = Vec::new();
    for _ in 0..count {
        let key_len = read_u16(stream)? as usize;
        let key_bytes = read_exact(stream, key_len)?;
        let key = String::from_utf8(key_bytes)
            .map_err(|e| DbError::BinaryDictIo(format!("key is not UTF-8: {e}")))?;
        let value_len = read_u16(stream)? as usize;
        let value = read_exact(stream, value_len)?;
        dict.push((key, value));
    }
    expect_eof(stream)?;
    Ok(dict)
}

/// Write a dictionary to a stream.
pub fn write_binary_dict(dict: &BinaryDict, stream: &mut impl Write) -> DbResult<()> {
    write_all(stream, &(dict.len() as u64).to_le_bytes())?;
    for (key, value) in dict {
        let key_bytes = key.as_bytes();
        if key_bytes.len() > usize::from(u16::MAX) {
            return Err(DbError::BinaryDictIo(format!(
                "key of {} bytes exceeds the u16 length field",
                key_bytes.len()
            )));
        }
        if value.len() > usize::from(u16::MAX) {
            return Err(DbError::BinaryDictIo(format!(
                "value of {} bytes exceeds the u16 length field",
                value.len()
            )));
        }
        write_all(stream, &(key_bytes.len() as u16).to_le_bytes())?;
        write_all(stream, key_bytes)?;
        write_all(stream, &(value.len() as u16).to_le_bytes())?;
        write_all(stream, value)?;
    }
    Ok(())
}

fn read_exact(stream: &mut impl Read, length: usize) -> DbResult<Vec<u8>> {
    let mut buffer = vec![0u8; length];
    stream
        .read_exact(&mut buffer)
        .map_err(|_| DbError::BinaryDictIo("unexpected EOF".into()))?;
    Ok(buffer)
}

fn read_u64(stream: &mut impl Read) -> DbResult<u64> {
    let bytes = read_exact(stream, 8)?;
    Ok(u64::from_le_bytes(bytes.try_into().expect("eight bytes")))
}

fn read_u16(stream: &mut impl Read) -> DbResult<u16> {
    let bytes = read_exact(stream, 2)?;
    Ok(u16::from_le_bytes(bytes.try_into().expect("two bytes")))
}

fn expect_eof(stream: &mut impl Read) -> DbResult<()> {
    let mut probe = [0u8; 1];
    match stream.read(&mut probe) {
        Ok(0) => Ok(()),
        Ok(_) => Err(DbError::BinaryDictIo(
            "expected end of file, but more data was found".into(),
        )),
        Err(e) => Err(DbError::BinaryDictIo(e.to_string())),
    }
}

fn write_all(stream: &mut impl Write, bytes: &[u8]) -> DbResult<()> {
    stream
        .write_all(bytes)
        .map_err(|e| DbError::BinaryDictIo(e.to_string()))
}
