//! End-to-end synthesis scenarios against the real solver.

use skoll_ir::{BooleanFunction, GateType, TruthTableModel};
use skoll_synth::{Basis, CircuitFinder, SynthError};

fn model(rows: &[&str]) -> TruthTableModel {
    // RUST_LOG=debug surfaces the encoder and solver traces when a scenario
    // misbehaves.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    TruthTableModel::from_strings(rows).unwrap()
}

/// Synthesize at `size`, check soundness, and confirm `size - 1` is UNSAT.
fn check_exact_size(rows: &[&str], size: usize, basis: Basis) {
    let target = model(rows);
    let circuit = CircuitFinder::new(target.clone(), size, basis.clone())
        .find_circuit(None)
        .unwrap();
    assert_eq!(circuit.num_internal_gates(), size);
    assert!(target.is_consistent_with(&circuit.get_truth_table()));

    let smaller = CircuitFinder::new(target, size - 1, basis).find_circuit(None);
    assert!(matches!(smaller, Err(SynthError::NoSolution)));
}

#[test]
fn test_parity_of_three_needs_two_gates() {
    check_exact_size(&["10010110"], 2, Basis::xaig());
}

#[test]
fn test_parity_chain_sizes() {
    // Parity of n inputs takes exactly n - 1 XAIG gates.
    for n in 2..=4usize {
        let row: String = (0..1usize << n)
            .map(|t| if t.count_ones() % 2 == 1 { '1' } else { '0' })
            .collect();
        check_exact_size(&[row.as_str()], n - 1, Basis::xaig());
    }
}

#[test]
fn test_three_bit_adder_needs_five_gates() {
    // sum = a ⊕ b ⊕ c, carry = maj(a, b, c).
    check_exact_size(&["10010110", "00010111"], 5, Basis::xaig());
}

#[test]
fn test_dont_care_allows_single_or() {
    let circuit = CircuitFinder::new(
        model(&["011*"]),
        1,
        Basis::custom(&[GateType::Or]).unwrap(),
    )
    .find_circuit(None)
    .unwrap();

    assert_eq!(circuit.num_internal_gates(), 1);
    let gate = circuit.get_gate(circuit.outputs()[0].as_str()).unwrap();
    assert_eq!(gate.gate_type(), GateType::Or);
    let tt = circuit.get_truth_table();
    assert_eq!(tt.to_strings(), vec!["0111"]);
}

#[test]
fn test_and_without_dont_care_is_unsat_for_or_basis() {
    let result = CircuitFinder::new(
        model(&["0110"]),
        1,
        Basis::custom(&[GateType::Or]).unwrap(),
    )
    .find_circuit(None);
    assert!(matches!(result, Err(SynthError::NoSolution)));
}

#[test]
fn test_no_solution_is_replayable() {
    // The optimality-at-size contract: r fails, r again fails, r + 1 works.
    let rows = ["10010110"];
    for _ in 0..2 {
        let result = CircuitFinder::new(model(&rows), 1, Basis::xaig()).find_circuit(None);
        assert!(matches!(result, Err(SynthError::NoSolution)));
    }
    CircuitFinder::new(model(&rows), 3, Basis::xaig())
        .find_circuit(None)
        .unwrap();
}

#[test]
fn test_multi_output_shares_gates() {
    // Two outputs reading the same XOR: one gate suffices for both.
    let circuit = CircuitFinder::new(model(&["0110", "0110"]), 1, Basis::xaig())
        .find_circuit(None)
        .unwrap();
    assert_eq!(circuit.num_internal_gates(), 1);
    assert_eq!(circuit.output_size(), 2);
    assert_eq!(circuit.outputs()[0], circuit.outputs()[1]);
}

#[test]
fn test_full_basis_finds_constant_gate() {
    let circuit = CircuitFinder::new(model(&["1111"]), 1, Basis::full())
        .find_circuit(None)
        .unwrap();
    let gate = circuit.get_gate(circuit.outputs()[0].as_str()).unwrap();
    assert_eq!(gate.gate_type(), GateType::AlwaysTrue);
    assert!(circuit.is_constant_at(0));
}

#[test]
fn test_aig_basis_excludes_xor_sizes() {
    // Over AIG, a single gate cannot compute XOR; three can
    // (AND(NAND(a, b), OR(a, b))).
    let result = CircuitFinder::new(model(&["0110"]), 1, Basis::aig()).find_circuit(None);
    assert!(matches!(result, Err(SynthError::NoSolution)));
    let circuit = CircuitFinder::new(model(&["0110"]), 3, Basis::aig())
        .find_circuit(None)
        .unwrap();
    assert_eq!(circuit.get_truth_table().to_strings(), vec!["0110"]);
}

#[test]
fn test_fix_gate_pins_structure() {
    let mut finder = CircuitFinder::new(model(&["0110"]), 1, Basis::xaig());
    finder
        .fix_gate(2, Some(0), Some(1), Some(skoll_synth::Operation::Xor))
        .unwrap();
    let circuit = finder.find_circuit(None).unwrap();
    let gate = circuit.get_gate("s0").unwrap();
    assert_eq!(gate.gate_type(), GateType::Xor);
    assert_eq!(gate.operands(), ["x0".to_string(), "x1".to_string()]);
}

#[test]
fn test_forbid_wire_excludes_input() {
    // Output must equal input 0; forbidding the wire from input 0 to the
    // only gate makes the instance unsatisfiable.
    let mut finder = CircuitFinder::new(model(&["0011"]), 1, Basis::full());
    finder.forbid_wire(0, 2).unwrap();
    assert!(matches!(
        finder.find_circuit(None),
        Err(SynthError::NoSolution)
    ));
}

#[test]
fn test_decoded_labels_are_canonical() {
    let circuit = CircuitFinder::new(model(&["0110"]), 1, Basis::xaig())
        .find_circuit(None)
        .unwrap();
    assert_eq!(circuit.inputs(), ["x0".to_string(), "x1".to_string()]);
    assert_eq!(circuit.outputs(), ["s0".to_string()]);
}
