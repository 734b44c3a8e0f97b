//! Bounded-size cut enumeration.
//!
//! A cut of gate `v` is a set of gates such that every path from an input
//! to `v` crosses the set. Cuts are enumerated bottom-up the standard way:
//! the cuts of a gate are the pairwise unions of its operands' cuts (capped
//! at `cut_size` leaves and `cut_limit` cuts per gate), plus the trivial
//! cut `{v}`.

use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use skoll_ir::{Circuit, Label};

/// A cut: a sorted list of gate labels.
pub type Cut = Vec<Label>;

/// All bounded cuts of every gate, plus the map from each cut to the gates
/// it dominates (the gates that listed it).
#[derive(Debug)]
pub struct CutEnumeration {
    /// Per-gate cut lists, smallest cuts first.
    pub gate_cuts: FxHashMap<Label, Vec<Cut>>,
    /// For each cut, the gates having it among their cuts.
    pub cut_nodes: FxHashMap<Cut, FxHashSet<Label>>,
}

/// Enumerate cuts of at most `cut_size` leaves, keeping at most `cut_limit`
/// cuts per gate.
pub fn enumerate_cuts(circuit: &Circuit, cut_size: usize, cut_limit: usize) -> CutEnumeration {
    let mut gate_cuts: FxHashMap<Label, Vec<Cut>> = FxHashMap::default();

    for gate in circuit.top_sort() {
        let label = gate.label().clone();
        let mut cuts: Vec<Cut> = vec![vec![label.clone()]];
        let mut seen: FxHashSet<Cut> = cuts.iter().cloned().collect();

        match gate.operands() {
            [] => {}
            [only] => {
                for cut in &gate_cuts[only] {
                    if seen.insert(cut.clone()) {
                        cuts.push(cut.clone());
                    }
                }
            }
            [left, right] => {
                for (lc, rc) in gate_cuts[left]
                    .iter()
                    .cartesian_product(gate_cuts[right].iter())
                {
                    let mut merged: Cut = lc.iter().chain(rc.iter()).cloned().collect();
                    merged.sort();
                    merged.dedup();
                    if merged.len() > cut_size {
                        continue;
                    }
                    if seen.insert(merged.clone()) {
                        cuts.push(merged);
                    }
                }
            }
            more => unreachable!("operators take at most two operands, got {}", more.len()),
        }

        cuts.sort_by_key(Vec::len);
        cuts.truncate(cut_limit);
        gate_cuts.insert(label, cuts);
    }

    let mut cut_nodes: FxHashMap<Cut, FxHashSet<Label>> = FxHashMap::default();
    for (gate, cuts) in &gate_cuts {
        for cut in cuts {
            cut_nodes.entry(cut.clone()).or_default().insert(gate.clone());
        }
    }
    debug!(
        gates = gate_cuts.len(),
        cuts = cut_nodes.len(),
        "enumerated cuts"
    );
    CutEnumeration {
        gate_cuts,
        cut_nodes,
    }
}

/// Every non-empty subset of a cut (cuts are at most 6 wide, so the
/// powerset is small).
pub fn subcuts(cut: &[Label]) -> Vec<Cut> {
    let mut result = Vec::with_capacity((1usize << cut.len()) - 1);
    for mask in 1..1usize << cut.len() {
        let subset: Cut = cut
            .iter()
            .enumerate()
            .filter(|&(i, _)| mask >> i & 1 == 1)
            .map(|(_, l)| l.clone())
            .collect();
        result.push(subset);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use skoll_ir::GateType;

    fn chain() -> Circuit {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.add_input("b").unwrap();
        circuit.add_input("c").unwrap();
        circuit.emplace_gate("d", GateType::And, &["a", "b"]).unwrap();
        circuit.emplace_gate("e", GateType::And, &["d", "c"]).unwrap();
        circuit.mark_as_output("e").unwrap();
        circuit
    }

    #[test]
    fn test_input_has_trivial_cut() {
        let enumeration = enumerate_cuts(&chain(), 4, 25);
        assert_eq!(
            enumeration.gate_cuts["a"],
            vec![vec!["a".to_string()]]
        );
    }

    #[test]
    fn test_chain_cuts() {
        let enumeration = enumerate_cuts(&chain(), 4, 25);
        let e_cuts = &enumeration.gate_cuts["e"];
        // Trivial cut first (smallest), then the structural ones.
        assert_eq!(e_cuts[0], vec!["e".to_string()]);
        assert!(e_cuts.contains(&vec!["c".to_string(), "d".to_string()]));
        assert!(e_cuts.contains(&vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string()
        ]));
    }

    #[test]
    fn test_cut_size_bound() {
        let enumeration = enumerate_cuts(&chain(), 2, 25);
        for cuts in enumeration.gate_cuts.values() {
            for cut in cuts {
                assert!(cut.len() <= 2);
            }
        }
        // The 3-leaf cut is gone.
        assert!(!enumeration.gate_cuts["e"].contains(&vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string()
        ]));
    }

    #[test]
    fn test_cut_limit_bound() {
        let enumeration = enumerate_cuts(&chain(), 4, 2);
        for cuts in enumeration.gate_cuts.values() {
            assert!(cuts.len() <= 2);
        }
    }

    #[test]
    fn test_cut_nodes_records_owners() {
        let enumeration = enumerate_cuts(&chain(), 4, 25);
        let owners = &enumeration.cut_nodes[&vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]];
        assert!(owners.contains("e"));
    }

    #[test]
    fn test_subcuts() {
        let cut: Cut = vec!["a".into(), "b".into()];
        let mut subs = subcuts(&cut);
        subs.sort();
        assert_eq!(
            subs,
            vec![
                vec!["a".to_string()],
                vec!["a".to_string(), "b".to_string()],
                vec!["b".to_string()],
            ]
        );
    }
}
