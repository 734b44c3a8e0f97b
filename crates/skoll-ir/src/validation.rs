//! Structural validation of circuits.

use petgraph::graph::DiGraph;
use rustc_hash::FxHashMap;

use crate::circuit::Circuit;
use crate::error::{CircuitError, CircuitResult};

/// Check that the operand relation is acyclic.
///
/// The circuit is lowered to a `petgraph` digraph with one edge per operand
/// reference; parallel edges from duplicate operands are harmless here.
pub fn check_acyclic(circuit: &Circuit) -> CircuitResult<()> {
    let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(circuit.num_gates(), 0);
    let mut nodes = FxHashMap::default();
    for gate in circuit.gates() {
        nodes.insert(gate.label().clone(), graph.add_node(()));
    }
    for gate in circuit.gates() {
        let target = nodes[gate.label()];
        for operand in gate.operands() {
            graph.add_edge(nodes[operand], target, ());
        }
    }
    if petgraph::algo::is_cyclic_directed(&graph) {
        return Err(CircuitError::CycleIntroduced);
    }
    Ok(())
}

/// Verify the denormalized bookkeeping of a circuit.
///
/// Checks that every operand exists, that the user index matches the operand
/// lists with multiplicity, that inputs are exactly the `INPUT`-typed gates,
/// that outputs exist, and that the graph is acyclic.
pub fn verify_integrity(circuit: &Circuit) -> CircuitResult<()> {
    for gate in circuit.gates() {
        for operand in gate.operands() {
            if !circuit.has_gate(operand) {
                return Err(CircuitError::GateAbsent {
                    label: operand.clone(),
                });
            }
        }
    }
    for gate in circuit.gates() {
        for operand in gate.operands() {
            let in_operands = gate.operands().iter().filter(|o| *o == operand).count();
            let in_users = circuit
                .get_gate_users(operand)
                .map_or(0, |users| users.iter().filter(|u| *u == gate.label()).count());
            if in_operands != in_users {
                return Err(CircuitError::GateAbsent {
                    label: operand.clone(),
                });
            }
        }
    }
    for gate in circuit.gates() {
        let declared = circuit.inputs().iter().any(|i| i == gate.label());
        if gate.is_input() != declared {
            return Err(CircuitError::GateAbsent {
                label: gate.label().clone(),
            });
        }
    }
    for output in circuit.outputs() {
        if !circuit.has_gate(output) {
            return Err(CircuitError::GateAbsent {
                label: output.clone(),
            });
        }
    }
    check_acyclic(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateType;

    #[test]
    fn test_acyclic_ok() {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.emplace_gate("b", GateType::Not, &["a"]).unwrap();
        circuit.emplace_gate("c", GateType::And, &["a", "b"]).unwrap();
        check_acyclic(&circuit).unwrap();
        verify_integrity(&circuit).unwrap();
    }

    #[test]
    fn test_integrity_after_mutations() {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.add_input("b").unwrap();
        circuit.emplace_gate("c", GateType::Xor, &["a", "b"]).unwrap();
        circuit.mark_as_output("c").unwrap();
        circuit.rename_gate("c", "sum").unwrap();
        circuit
            .replace_gate("sum", crate::gate::Gate::new("sum", GateType::Nxor, ["b", "a"]))
            .unwrap();
        verify_integrity(&circuit).unwrap();
    }
}
