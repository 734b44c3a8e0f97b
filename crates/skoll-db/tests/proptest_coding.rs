//! Property-based tests for the circuit payload codec.

use proptest::prelude::*;
use skoll_db::{decode_circuit, encode_circuit};
use skoll_ir::{BooleanFunction, Circuit, GateType};

const OPS: [GateType; 12] = [
    GateType::And,
    GateType::Or,
    GateType::Nand,
    GateType::Nor,
    GateType::Xor,
    GateType::Nxor,
    GateType::Geq,
    GateType::Gt,
    GateType::Leq,
    GateType::Lt,
    GateType::Not,
    GateType::Iff,
];

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1usize..=4, 1usize..=10).prop_flat_map(|(num_inputs, num_gates)| {
        (
            Just(num_inputs),
            prop::collection::vec((0usize..OPS.len(), 0usize..64, 0usize..64), num_gates),
            prop::collection::vec(0usize..64, 1..=3),
        )
            .prop_map(|(num_inputs, specs, output_picks)| {
                let mut circuit = Circuit::new();
                for i in 0..num_inputs {
                    circuit.add_input(format!("x{i}")).unwrap();
                }
                for (g, (op, left, right)) in specs.into_iter().enumerate() {
                    let available = num_inputs + g;
                    let name = |i: usize| -> String {
                        if i < num_inputs {
                            format!("x{i}")
                        } else {
                            format!("g{}", i - num_inputs)
                        }
                    };
                    let op = OPS[op];
                    let a = name(left % available);
                    if op.arity() == 1 {
                        circuit
                            .emplace_gate(format!("g{g}"), op, &[a.as_str()])
                            .unwrap();
                    } else {
                        let b = name(right % available);
                        circuit
                            .emplace_gate(format!("g{g}"), op, &[a.as_str(), b.as_str()])
                            .unwrap();
                    }
                }
                for pick in output_picks {
                    let g = pick % circuit.num_internal_gates();
                    circuit.mark_as_output(format!("g{g}")).unwrap();
                }
                circuit
            })
    })
}

proptest! {
    #[test]
    fn prop_round_trip_preserves_function(circuit in arb_circuit()) {
        let bytes = encode_circuit(&circuit).unwrap();
        let back = decode_circuit(&bytes).unwrap();
        prop_assert_eq!(back.input_size(), circuit.input_size());
        prop_assert_eq!(back.output_size(), circuit.output_size());
        prop_assert_eq!(back.get_truth_table(), circuit.get_truth_table());
    }

    #[test]
    fn prop_truncation_never_decodes(circuit in arb_circuit()) {
        let bytes = encode_circuit(&circuit).unwrap();
        // Cutting off at least one full byte always breaks the payload:
        // header, gate list or output references go missing.
        if bytes.len() > 1 {
            let truncated = &bytes[..bytes.len() / 2];
            prop_assert!(decode_circuit(truncated).is_err());
        }
    }
}
