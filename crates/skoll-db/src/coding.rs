//! The encoded-circuit payload stored as dictionary values.
//!
//! ```text
//! byte 0        : word size W
//! W bits        : input count I
//! W bits        : output count O
//! W bits        : intermediate gate count G
//! G gates (topologically):
//!   4 bits      : gate type code
//!   arity × W bits : 0-based operand references (inputs first)
//! O outputs:
//!   W bits      : referenced gate index
//! ```
//!
//! `W` is the bit length of the largest field: `max(I, O, total − 1)`,
//! minimum 1.

use rustc_hash::FxHashMap;

use skoll_ir::{Circuit, Gate, GateType, Label};

use crate::bit_io::{BitReader, BitWriter};
use crate::error::{DbError, DbResult};

const GATE_TYPE_BITS: u8 = 4;

fn gate_type_code(gate_type: GateType) -> DbResult<u64> {
    let code = match gate_type {
        GateType::Not => 0,
        GateType::And => 1,
        GateType::Or => 2,
        GateType::Nor => 3,
        GateType::Nand => 4,
        GateType::Xor => 5,
        GateType::Nxor => 6,
        GateType::Iff => 7,
        GateType::Geq => 8,
        GateType::Gt => 9,
        GateType::Leq => 10,
        GateType::Lt => 11,
        GateType::AlwaysTrue => 12,
        GateType::AlwaysFalse => 13,
        GateType::Input | GateType::LNot | GateType::RNot | GateType::LIff | GateType::RIff => {
            return Err(DbError::CircuitCoding(format!(
                "gate type {} is not encodable",
                gate_type.name()
            )));
        }
    };
    Ok(code)
}

fn gate_type_from_code(code: u64) -> DbResult<GateType> {
    let gate_type = match code {
        0 => GateType::Not,
        1 => GateType::And,
        2 => GateType::Or,
        3 => GateType::Nor,
        4 => GateType::Nand,
        5 => GateType::Xor,
        6 => GateType::Nxor,
        7 => GateType::Iff,
        8 => GateType::Geq,
        9 => GateType::Gt,
        10 => GateType::Leq,
        11 => GateType::Lt,
        12 => GateType::AlwaysTrue,
        13 => GateType::AlwaysFalse,
        other => {
            return Err(DbError::CircuitCoding(format!(
                "undefined gate type code {other}"
            )));
        }
    };
    Ok(gate_type)
}

fn bit_length(value: usize) -> u8 {
    (usize::BITS - value.leading_zeros()) as u8
}

fn word_size(circuit: &Circuit) -> u8 {
    if circuit.num_gates() == 0 {
        return 1;
    }
    let widest = circuit
        .input_size()
        .max(circuit.output_size())
        .max(circuit.num_gates() - 1);
    bit_length(widest).max(1)
}

/// Encode a circuit into payload bytes.
///
/// Gates are numbered inputs-first, internals in topological order; the
/// argument-position gate types are not representable and fail with
/// [`DbError::CircuitCoding`].
pub fn encode_circuit(circuit: &Circuit) -> DbResult<Vec<u8>> {
    let word = word_size(circuit);
    let mut writer = BitWriter::new();
    writer.write_byte(word);
    writer.write_number(circuit.input_size() as u64, word)?;
    writer.write_number(circuit.output_size() as u64, word)?;
    writer.write_number(circuit.num_internal_gates() as u64, word)?;

    let mut index_of: FxHashMap<&Label, u64> = FxHashMap::default();
    for input in circuit.inputs() {
        let index = index_of.len() as u64;
        index_of.insert(input, index);
    }
    for gate in circuit.top_sort() {
        if gate.is_input() {
            continue;
        }
        writer.write_number(gate_type_code(gate.gate_type())?, GATE_TYPE_BITS)?;
        for operand in gate.operands() {
            writer.write_number(index_of[operand], word)?;
        }
        let index = index_of.len() as u64;
        index_of.insert(gate.label(), index);
    }
    for output in circuit.outputs() {
        writer.write_number(index_of[output], word)?;
    }
    Ok(writer.into_bytes())
}

/// Decode payload bytes into a circuit with `gate_{i}` labels.
pub fn decode_circuit(bytes: &[u8]) -> DbResult<Circuit> {
    let mut reader = BitReader::new(bytes);
    let word = reader.read_byte()?;
    if word == 0 || word > 63 {
        return Err(DbError::CircuitCoding(format!("bad word size {word}")));
    }
    let inputs = reader.read_number(word)? as usize;
    let outputs = reader.read_number(word)? as usize;
    let intermediates = reader.read_number(word)? as usize;

    let mut circuit = Circuit::new();
    let mut labels: Vec<Label> = Vec::with_capacity(inputs + intermediates);
    for i in 0..inputs {
        let label = format!("gate_{i}");
        circuit.add_input(label.clone())?;
        labels.push(label);
    }
    for i in 0..intermediates {
        let gate_type = gate_type_from_code(reader.read_number(GATE_TYPE_BITS)?)?;
        let mut operands = Vec::with_capacity(gate_type.arity());
        for _ in 0..gate_type.arity() {
            let reference = reader.read_number(word)? as usize;
            let Some(label) = labels.get(reference) else {
                return Err(DbError::CircuitCoding(format!(
                    "invalid operand reference {reference}"
                )));
            };
            operands.push(label.clone());
        }
        let label = format!("gate_{}", inputs + i);
        circuit.add_gate(Gate::new(label.clone(), gate_type, operands))?;
        labels.push(label);
    }
    for _ in 0..outputs {
        let reference = reader.read_number(word)? as usize;
        let Some(label) = labels.get(reference) else {
            return Err(DbError::CircuitCoding(format!(
                "invalid output reference {reference}"
            )));
        };
        circuit.mark_as_output(label.clone())?;
    }
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skoll_ir::BooleanFunction;

    fn half_adder() -> Circuit {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.add_input("b").unwrap();
        circuit.emplace_gate("s", GateType::Xor, &["a", "b"]).unwrap();
        circuit.emplace_gate("c", GateType::And, &["a", "b"]).unwrap();
        circuit.mark_as_output("s").unwrap();
        circuit.mark_as_output("c").unwrap();
        circuit
    }

    #[test]
    fn test_round_trip_preserves_function() {
        let circuit = half_adder();
        let bytes = encode_circuit(&circuit).unwrap();
        let back = decode_circuit(&bytes).unwrap();
        assert_eq!(back.input_size(), circuit.input_size());
        assert_eq!(back.output_size(), circuit.output_size());
        assert_eq!(back.get_truth_table(), circuit.get_truth_table());
    }

    #[test]
    fn test_round_trip_with_unary_and_constants() {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.emplace_gate("n", GateType::Not, &["a"]).unwrap();
        circuit.emplace_gate("t", GateType::AlwaysTrue, &[]).unwrap();
        circuit.emplace_gate("x", GateType::Xor, &["n", "t"]).unwrap();
        circuit.mark_as_output("x").unwrap();
        circuit.mark_as_output("n").unwrap();

        let bytes = encode_circuit(&circuit).unwrap();
        let back = decode_circuit(&bytes).unwrap();
        assert_eq!(back.get_truth_table(), circuit.get_truth_table());
    }

    #[test]
    fn test_duplicate_outputs_survive() {
        let mut circuit = half_adder();
        circuit.mark_as_output("s").unwrap();
        let back = decode_circuit(&encode_circuit(&circuit).unwrap()).unwrap();
        assert_eq!(back.output_size(), 3);
        assert_eq!(back.get_truth_table(), circuit.get_truth_table());
    }

    #[test]
    fn test_positional_variants_rejected() {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.add_input("b").unwrap();
        circuit
            .add_gate(Gate::new("l", GateType::LNot, ["a", "b"]))
            .unwrap();
        circuit.mark_as_output("l").unwrap();
        assert!(matches!(
            encode_circuit(&circuit),
            Err(DbError::CircuitCoding(_))
        ));
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let circuit = half_adder();
        let mut bytes = encode_circuit(&circuit).unwrap();
        bytes.pop();
        // Depending on where the cut lands this is a bit-IO or a reference
        // error, never a silent success.
        assert!(decode_circuit(&bytes).is_err());
    }

    #[test]
    fn test_undefined_code_rejected() {
        // Word size 1, one input, one output, one gate with code 15.
        let mut writer = BitWriter::new();
        writer.write_byte(1);
        writer.write_number(1, 1).unwrap();
        writer.write_number(1, 1).unwrap();
        writer.write_number(1, 1).unwrap();
        writer.write_number(15, 4).unwrap();
        let bytes = writer.into_bytes();
        assert!(matches!(
            decode_circuit(&bytes),
            Err(DbError::CircuitCoding(_))
        ));
    }
}
