//! Property-based tests for circuit structural invariants.
//!
//! Random DAGs are built bottom-up (operands always reference earlier
//! gates), then the denormalized bookkeeping and the evaluation engine are
//! checked against each other.

use proptest::prelude::*;
use skoll_ir::{
    BooleanFunction, Circuit, GateType, canonical_input, verify_integrity,
};

const BINARY_OPS: [GateType; 10] = [
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
];

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1usize..=4, 1usize..=12).prop_flat_map(|(num_inputs, num_gates)| {
        (
            Just(num_inputs),
            prop::collection::vec(
                (0usize..BINARY_OPS.len() + 2, 0usize..64, 0usize..64),
                num_gates,
            ),
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
                    let a = name(left % available);
                    let label = format!("g{g}");
                    if op < BINARY_OPS.len() {
                        let b = name(right % available);
                        circuit
                            .emplace_gate(label, BINARY_OPS[op], &[a.as_str(), b.as_str()])
                            .unwrap();
                    } else if op == BINARY_OPS.len() {
                        circuit.emplace_gate(label, GateType::Not, &[a.as_str()]).unwrap();
                    } else {
                        circuit.emplace_gate(label, GateType::Iff, &[a.as_str()]).unwrap();
                    }
                }
                for pick in output_picks {
                    let g = pick % circuit.num_internal_gates().max(1);
                    circuit.mark_as_output(format!("g{g}")).unwrap();
                }
                circuit
            })
    })
}

proptest! {
    #[test]
    fn prop_invariants_hold(circuit in arb_circuit()) {
        verify_integrity(&circuit).unwrap();
    }

    #[test]
    fn prop_users_match_operands(circuit in arb_circuit()) {
        for gate in circuit.gates() {
            for operand in gate.operands() {
                let in_operands =
                    gate.operands().iter().filter(|o| *o == operand).count();
                let users = circuit.get_gate_users(operand).unwrap();
                let in_users = users.iter().filter(|u| *u == gate.label()).count();
                prop_assert_eq!(in_operands, in_users);
            }
        }
    }

    #[test]
    fn prop_truth_table_matches_pointwise_evaluation(circuit in arb_circuit()) {
        let tt = circuit.get_truth_table();
        let n = circuit.input_size();
        for index in 0..1usize << n {
            let outputs = circuit.evaluate(&canonical_input(index, n));
            for (row, value) in outputs.iter().enumerate() {
                prop_assert_eq!(tt.value(row, index), *value);
            }
        }
    }

    #[test]
    fn prop_top_sort_respects_dependencies(circuit in arb_circuit()) {
        let mut seen = std::collections::HashSet::new();
        for gate in circuit.top_sort() {
            for operand in gate.operands() {
                prop_assert!(seen.contains(operand.as_str()));
            }
            seen.insert(gate.label().as_str());
        }
        prop_assert_eq!(seen.len(), circuit.num_gates());
    }

    #[test]
    fn prop_rename_is_semantics_preserving(circuit in arb_circuit()) {
        let before = circuit.get_truth_table();
        let mut renamed = circuit.clone();
        let labels: Vec<String> = renamed.labels().to_vec();
        for (i, label) in labels.iter().enumerate() {
            renamed.rename_gate(label, format!("renamed_{i}")).unwrap();
        }
        verify_integrity(&renamed).unwrap();
        prop_assert_eq!(renamed.get_truth_table(), before);
    }
}
