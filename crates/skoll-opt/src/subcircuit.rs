//! Subcircuit extraction: from cuts to local truth tables with don't-cares.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use skoll_ir::{Circuit, GateType, Label, TruthTableModel};

use crate::cuts::{Cut, CutEnumeration, subcuts};
use crate::error::{MinimizeError, MinimizeResult};

/// A candidate region for resynthesis.
///
/// `inputs` are the cut elements; `nodes` the gates the cut dominates, in
/// host topological order (cut elements included); `outputs` the dominated
/// gates visible outside the region. `patterns` holds each node's local
/// truth table as a bit row over the `2^inputs.len()` cut-input
/// assignments, and `reachable_rows` marks the assignments that actually
/// occur for some host input.
#[derive(Debug)]
pub struct Subcircuit {
    pub inputs: Vec<Label>,
    pub nodes: Vec<Label>,
    pub outputs: Vec<Label>,
    /// Number of internal nodes that are neither NOT nor IFF (inverters and
    /// buffers are free in the cost model).
    pub size: usize,
    pub patterns: FxHashMap<Label, u64>,
    pub reachable_rows: u64,
}

impl Subcircuit {
    /// Bitmask selecting the valid local rows.
    pub fn row_mask(&self) -> u64 {
        let rows = 1usize << self.inputs.len();
        if rows == 64 { u64::MAX } else { (1u64 << rows) - 1 }
    }

    /// The local truth-table model of `outputs_subset`, with unreachable
    /// rows as don't-cares.
    pub fn local_model(&self, outputs_subset: &[Label]) -> MinimizeResult<TruthTableModel> {
        let rows = 1usize << self.inputs.len();
        let mut table = Vec::with_capacity(outputs_subset.len());
        for output in outputs_subset {
            let pattern = self.patterns[output];
            let row: Vec<Option<bool>> = (0..rows)
                .map(|t| {
                    if self.reachable_rows >> t & 1 == 1 {
                        Some(pattern >> t & 1 == 1)
                    } else {
                        None
                    }
                })
                .collect();
            table.push(row);
        }
        Ok(TruthTableModel::new(table)?)
    }
}

/// Drop nested and undersized cuts, and complete each survivor's dominated
/// node set with the nodes of all its subcuts.
///
/// A cut is nested in another if each of its elements is dominated by some
/// subcut of the other; nested cuts describe a region a larger (already
/// kept) cut covers.
pub fn select_cuts(enumeration: &mut CutEnumeration, cut_size: usize) -> Vec<Cut> {
    let mut cuts: Vec<Cut> = enumeration.cut_nodes.keys().cloned().collect();
    cuts.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    let is_nested = |cut: &Cut, other: &Cut, nodes: &FxHashMap<Cut, FxHashSet<Label>>| -> bool {
        cut.iter().all(|gate| {
            subcuts(other)
                .iter()
                .any(|sub| nodes.get(sub).is_some_and(|n| n.contains(gate)))
        })
    };

    let mut removed: FxHashSet<Cut> = FxHashSet::default();
    let mut kept: Vec<Cut> = Vec::new();
    for (i, cut) in cuts.iter().enumerate() {
        if subcuts(cut)
            .iter()
            .any(|sub| sub.len() < cut.len() && removed.contains(sub))
        {
            removed.insert(cut.clone());
            continue;
        }
        if kept
            .iter()
            .any(|prev| is_nested(cut, prev, &enumeration.cut_nodes))
        {
            removed.insert(cut.clone());
            continue;
        }
        // A same-size later cut can also subsume this one.
        if cuts[i + 1..]
            .iter()
            .take_while(|next| next.len() <= cut.len())
            .any(|next| is_nested(cut, next, &enumeration.cut_nodes))
        {
            removed.insert(cut.clone());
            continue;
        }
        kept.push(cut.clone());
    }
    debug!(
        total = cuts.len(),
        kept = kept.len(),
        "filtered nested cuts"
    );

    // Complete each kept cut's node set from its subcuts.
    for cut in &kept {
        let mut union: FxHashSet<Label> = FxHashSet::default();
        for sub in subcuts(cut) {
            if let Some(nodes) = enumeration.cut_nodes.get(&sub) {
                union.extend(nodes.iter().cloned());
            }
        }
        enumeration
            .cut_nodes
            .entry(cut.clone())
            .or_default()
            .extend(union);
    }

    kept.into_iter()
        .filter(|cut| cut.len() > 1 && cut.len() <= cut_size)
        .filter(|cut| enumeration.cut_nodes[cut].len() > 2)
        .collect()
}

/// Evaluate the whole host once: one boolean row per gate over all
/// `2^n` host inputs (canonical big-endian order).
pub fn host_truth_tables(circuit: &Circuit) -> FxHashMap<Label, Vec<bool>> {
    let n = circuit.input_size();
    let mut tables: FxHashMap<Label, Vec<bool>> =
        circuit.labels().iter().map(|l| (l.clone(), Vec::new())).collect();
    for index in 0..1usize << n {
        let inputs = skoll_ir::canonical_input(index, n);
        let assignment = circuit
            .inputs()
            .iter()
            .cloned()
            .zip(inputs.iter().map(|&b| skoll_ir::TriValue::from(b)))
            .collect();
        for (label, value) in circuit.evaluate_full_circuit(&assignment) {
            tables
                .get_mut(&label)
                .expect("every gate present")
                .push(value.to_bool().expect("full assignment"));
        }
    }
    tables
}

/// Build the subcircuit for one cut, or `None` when the cut's node set is
/// not operand-closed (an artifact of the per-gate cut limit).
pub fn extract_subcircuit(
    circuit: &Circuit,
    cut: &Cut,
    cut_nodes: &FxHashSet<Label>,
    topo_position: &FxHashMap<Label, usize>,
) -> MinimizeResult<Option<Subcircuit>> {
    let k = cut.len();
    let inputs: Vec<Label> = cut.clone();
    let input_set: FxHashSet<&str> = inputs.iter().map(Label::as_str).collect();

    let mut nodes: Vec<Label> = cut_nodes.iter().cloned().collect();
    nodes.sort_by_key(|label| topo_position[label]);

    // Seed the cut inputs with the projection patterns (input i carries bit
    // k-1-i of the row index), then fold the internal nodes bottom-up.
    let mut patterns: FxHashMap<Label, u64> = FxHashMap::default();
    let rows = 1usize << k;
    for (i, input) in inputs.iter().enumerate() {
        let mut pattern = 0u64;
        for t in 0..rows {
            if t >> (k - 1 - i) & 1 == 1 {
                pattern |= 1 << t;
            }
        }
        patterns.insert(input.clone(), pattern);
    }
    let mask = if rows == 64 { u64::MAX } else { (1u64 << rows) - 1 };

    let mut size = 0usize;
    let outputs_set: FxHashSet<&str> = circuit.outputs().iter().map(Label::as_str).collect();
    let mut outputs: Vec<Label> = Vec::new();

    for node in &nodes {
        if input_set.contains(node.as_str()) {
            continue;
        }
        let gate = circuit.get_gate(node).expect("node exists");
        let operand_patterns: Option<Vec<u64>> = gate
            .operands()
            .iter()
            .map(|op| patterns.get(op).copied())
            .collect();
        let Some(operand_patterns) = operand_patterns else {
            // An operand escapes the node set: the cut limit hid an
            // intermediate gate's cut. Not a valid region.
            return Ok(None);
        };
        let pattern = match gate.gate_type() {
            GateType::Input => {
                return Err(MinimizeError::UnsupportedOperation {
                    label: node.clone(),
                });
            }
            GateType::Not => !operand_patterns[0] & mask,
            GateType::Iff => operand_patterns[0],
            GateType::AlwaysTrue => mask,
            GateType::AlwaysFalse => 0,
            binary => {
                let tt = binary.tt4().expect("binary operators carry a table");
                let a = operand_patterns[0];
                let b = operand_patterns[1];
                let mut out = 0u64;
                if tt[0] {
                    out |= !a & !b;
                }
                if tt[1] {
                    out |= !a & b;
                }
                if tt[2] {
                    out |= a & !b;
                }
                if tt[3] {
                    out |= a & b;
                }
                out & mask
            }
        };
        patterns.insert(node.clone(), pattern);

        if !matches!(gate.gate_type(), GateType::Not | GateType::Iff) {
            size += 1;
        }
        let is_output = outputs_set.contains(node.as_str())
            || circuit
                .get_gate_users(node)
                .expect("node exists")
                .iter()
                .any(|user| !cut_nodes.contains(user));
        if is_output {
            outputs.push(node.clone());
        }
    }
    outputs.sort_by_key(|label| patterns[label]);

    Ok(Some(Subcircuit {
        inputs,
        nodes,
        outputs,
        size,
        patterns,
        reachable_rows: 0,
    }))
}

/// Mark the locally reachable rows of each subcircuit from one cached
/// host-wide evaluation.
pub fn mark_reachable_rows(
    subcircuits: &mut [Subcircuit],
    host_tables: &FxHashMap<Label, Vec<bool>>,
    host_inputs: usize,
) {
    for sub in subcircuits.iter_mut() {
        let k = sub.inputs.len();
        let mut reachable = 0u64;
        for index in 0..1usize << host_inputs {
            let mut row = 0usize;
            for (i, input) in sub.inputs.iter().enumerate() {
                if host_tables[input][index] {
                    row |= 1 << (k - 1 - i);
                }
            }
            reachable |= 1 << row;
        }
        sub.reachable_rows = reachable;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cuts::enumerate_cuts;

    fn two_and_chain() -> Circuit {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.add_input("b").unwrap();
        circuit.add_input("c").unwrap();
        circuit.emplace_gate("d", GateType::And, &["a", "b"]).unwrap();
        circuit.emplace_gate("e", GateType::And, &["d", "c"]).unwrap();
        circuit.mark_as_output("e").unwrap();
        circuit
    }

    fn topo_positions(circuit: &Circuit) -> FxHashMap<Label, usize> {
        circuit
            .top_sort()
            .enumerate()
            .map(|(i, g)| (g.label().clone(), i))
            .collect()
    }

    #[test]
    fn test_extract_patterns_and_outputs() {
        let circuit = two_and_chain();
        let cut: Cut = vec!["a".into(), "b".into(), "c".into()];
        let nodes: FxHashSet<Label> =
            ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        let sub = extract_subcircuit(&circuit, &cut, &nodes, &topo_positions(&circuit))
            .unwrap()
            .unwrap();

        // Input projections are big-endian over the row index.
        assert_eq!(sub.patterns["a"], 0b11110000);
        assert_eq!(sub.patterns["b"], 0b11001100);
        assert_eq!(sub.patterns["c"], 0b10101010);
        // d = a AND b, e = d AND c.
        assert_eq!(sub.patterns["d"], 0b11000000);
        assert_eq!(sub.patterns["e"], 0b10000000);
        assert_eq!(sub.outputs, vec!["e".to_string()]);
        assert_eq!(sub.size, 2);
    }

    #[test]
    fn test_local_model_with_reachability() {
        let circuit = two_and_chain();
        let cut: Cut = vec!["d".into(), "c".into()];
        let nodes: FxHashSet<Label> = ["d", "c", "e"].iter().map(|s| s.to_string()).collect();
        let mut sub = extract_subcircuit(&circuit, &cut, &nodes, &topo_positions(&circuit))
            .unwrap()
            .unwrap();
        let tables = host_truth_tables(&circuit);
        let mut subs = vec![sub];
        mark_reachable_rows(&mut subs, &tables, circuit.input_size());
        sub = subs.pop().unwrap();

        // Both cut gates take both values somewhere, all four rows occur.
        assert_eq!(sub.reachable_rows, 0b1111);
        let model = sub.local_model(&["e".to_string()]).unwrap();
        // e = AND of the two cut inputs, in row order.
        assert_eq!(model.rows()[0], vec![Some(false), Some(false), Some(false), Some(true)]);
    }

    #[test]
    fn test_select_cuts_drops_trivial_regions() {
        let circuit = two_and_chain();
        let mut enumeration = enumerate_cuts(&circuit, 4, 25);
        let selected = select_cuts(&mut enumeration, 4);
        // Every selected cut dominates more than two gates.
        for cut in &selected {
            assert!(enumeration.cut_nodes[cut].len() > 2, "{cut:?}");
            assert!(cut.len() > 1);
        }
        // The full-input cut of e survives.
        assert!(selected.iter().any(|c| c.len() == 3));
    }
}
