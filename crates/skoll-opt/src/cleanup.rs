//! Redundancy cleanup passes applied after splicing.

use rustc_hash::FxHashMap;
use tracing::debug;

use skoll_ir::{Circuit, Gate, GateType, Label};

use crate::error::MinimizeResult;

/// Remove every gate unreachable from the outputs. Inputs are kept even
/// when dangling (the circuit's arity is part of its interface).
pub fn remove_redundant_gates(circuit: &mut Circuit) {
    let mut removed = 0usize;
    loop {
        let dead: Vec<Label> = circuit
            .gates()
            .filter(|gate| !gate.is_input())
            .filter(|gate| {
                circuit
                    .get_gate_users(gate.label())
                    .is_some_and(<[Label]>::is_empty)
                    && !circuit.outputs().contains(gate.label())
            })
            .map(|gate| gate.label().clone())
            .collect();
        if dead.is_empty() {
            break;
        }
        for label in dead {
            circuit.remove_gate(&label).expect("dead gate is removable");
            removed += 1;
        }
    }
    if removed > 0 {
        debug!(removed, "removed redundant gates");
    }
}

/// Contract buffer chains and double negations: operands pointing at an
/// `IFF` follow through to its source, and `NOT(NOT(x))` collapses to `x`.
/// The bypassed gates are left for [`remove_redundant_gates`].
pub fn collapse_unary_operators(circuit: &mut Circuit) -> MinimizeResult<()> {
    // Resolve each label to the earliest gate computing the same function.
    let mut resolved: FxHashMap<Label, Label> = FxHashMap::default();
    for gate in circuit.top_sort() {
        let label = gate.label().clone();
        let target = match gate.gate_type() {
            GateType::Iff => resolved[&gate.operands()[0]].clone(),
            GateType::Not => {
                let inner = resolved[&gate.operands()[0]].clone();
                let inner_gate = circuit.get_gate(&inner).expect("resolved target exists");
                if inner_gate.gate_type() == GateType::Not {
                    resolved[&inner_gate.operands()[0]].clone()
                } else {
                    label.clone()
                }
            }
            _ => label.clone(),
        };
        resolved.insert(label, target);
    }

    let labels: Vec<Label> = circuit.labels().to_vec();
    let mut rewired = 0usize;
    for label in labels {
        let gate = circuit.get_gate(&label).expect("label listed").clone();
        if gate.is_input() {
            continue;
        }
        let operands: Vec<Label> = gate
            .operands()
            .iter()
            .map(|op| resolved[op].clone())
            .collect();
        if operands != gate.operands() {
            circuit.replace_gate(&label, Gate::new(label.clone(), gate.gate_type(), operands))?;
            rewired += 1;
        }
    }

    let outputs: Vec<Label> = circuit
        .outputs()
        .iter()
        .map(|o| resolved[o].clone())
        .collect();
    circuit.set_outputs(outputs)?;
    if rewired > 0 {
        debug!(rewired, "collapsed unary operator chains");
    }
    Ok(())
}

/// Merge gates that are syntactically identical: same operator, same
/// operand list. Users and outputs of a duplicate are rewired onto the
/// first occurrence; the duplicate itself is left for
/// [`remove_redundant_gates`].
///
/// Merges cascade: once two gates are merged, gates reading them become
/// identical in turn and merge on the same pass.
pub fn merge_duplicate_gates(circuit: &mut Circuit) -> MinimizeResult<()> {
    let mut canonical: FxHashMap<(GateType, Vec<Label>), Label> = FxHashMap::default();
    let order: Vec<Label> = circuit.top_sort().map(|g| g.label().clone()).collect();
    let mut merged = 0usize;

    for label in order {
        let gate = circuit.get_gate(&label).expect("label listed").clone();
        if gate.is_input() {
            continue;
        }
        let key = (gate.gate_type(), gate.operands().to_vec());
        let Some(keeper) = canonical.get(&key).cloned() else {
            canonical.insert(key, label.clone());
            continue;
        };

        let users: Vec<Label> = circuit
            .get_gate_users(&label)
            .expect("label listed")
            .to_vec();
        let mut distinct = users;
        distinct.sort();
        distinct.dedup();
        for user in distinct {
            let user_gate = circuit.get_gate(&user).expect("user exists").clone();
            let operands: Vec<Label> = user_gate
                .operands()
                .iter()
                .map(|op| if *op == label { keeper.clone() } else { op.clone() })
                .collect();
            circuit.replace_gate(
                &user,
                Gate::new(user.clone(), user_gate.gate_type(), operands),
            )?;
        }
        let outputs: Vec<Label> = circuit
            .outputs()
            .iter()
            .map(|o| if *o == label { keeper.clone() } else { o.clone() })
            .collect();
        circuit.set_outputs(outputs)?;
        merged += 1;
    }
    if merged > 0 {
        debug!(merged, "merged duplicate gates");
    }
    Ok(())
}
