//! The cut-based minimization driver.

use std::time::Duration;

use rustc_hash::FxHashMap;
use tracing::debug;

use skoll_ir::{BooleanFunction, Circuit, GateType, Label};
use skoll_synth::{Basis, CircuitFinder, SynthError};

use crate::cleanup::{collapse_unary_operators, merge_duplicate_gates, remove_redundant_gates};
use crate::cuts::enumerate_cuts;
use crate::error::{MinimizeError, MinimizeResult};
use crate::subcircuit::{
    Subcircuit, extract_subcircuit, host_truth_tables, mark_reachable_rows, select_cuts,
};

/// Tuning knobs for [`minimize_subcircuits`].
#[derive(Debug, Clone)]
pub struct MinimizeOptions {
    /// Synthesis basis for replacements.
    pub basis: Basis,
    /// Largest subcircuit (counted without inverters and buffers) handed to
    /// the synthesizer. SAT synthesis degrades quickly past ~12.
    pub max_subcircuit_size: usize,
    /// Per-cut solver time limit.
    pub solver_time_limit: Option<Duration>,
    /// Maximum number of leaves for a cut (capped at 6: local tables are
    /// 64-bit rows).
    pub cut_size: usize,
    /// Maximum number of cuts kept per gate.
    pub cut_limit: usize,
    /// Re-check the full truth table against the original at the end.
    pub validate: bool,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            basis: Basis::xaig(),
            max_subcircuit_size: 9,
            solver_time_limit: Some(Duration::from_secs(15)),
            cut_size: 5,
            cut_limit: 25,
            validate: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Unchanged,
    Modified,
    Removed,
}

/// Shrink a circuit by replacing bounded subcircuits with smaller
/// SAT-synthesized equivalents.
///
/// One pass over the canonicalized cuts of the host: each surviving cut's
/// local function (with reachability don't-cares) is handed to the
/// synthesizer at one gate less than the region's size; successful
/// replacements are spliced back in, failed cuts are skipped. Global
/// semantics over the host inputs are preserved.
pub fn minimize_subcircuits(
    circuit: &Circuit,
    options: &MinimizeOptions,
) -> MinimizeResult<Circuit> {
    let cut_size = options.cut_size.min(6);
    let initial = circuit.clone();
    let mut host = circuit.clone();

    let mut enumeration = enumerate_cuts(&host, cut_size, options.cut_limit);
    let cuts = select_cuts(&mut enumeration, cut_size);
    debug!(cuts = cuts.len(), "processing cuts");

    let topo_position: FxHashMap<Label, usize> = host
        .top_sort()
        .enumerate()
        .map(|(i, g)| (g.label().clone(), i))
        .collect();

    let mut subcircuits: Vec<Subcircuit> = Vec::with_capacity(cuts.len());
    for cut in &cuts {
        if let Some(sub) =
            extract_subcircuit(&host, cut, &enumeration.cut_nodes[cut], &topo_position)?
        {
            subcircuits.push(sub);
        }
    }
    let tables = host_truth_tables(&host);
    mark_reachable_rows(&mut subcircuits, &tables, host.input_size());

    let mut states: FxHashMap<Label, NodeState> = host
        .labels()
        .iter()
        .map(|l| (l.clone(), NodeState::Unchanged))
        .collect();

    for sub in &subcircuits {
        if sub.size > options.max_subcircuit_size || sub.size < 2 {
            continue;
        }
        let touches_stale = sub.nodes.iter().any(|node| {
            match states.get(node).copied().unwrap_or(NodeState::Unchanged) {
                NodeState::Removed => true,
                NodeState::Modified => !sub.inputs.contains(node),
                NodeState::Unchanged => false,
            }
        });
        if touches_stale {
            continue;
        }

        match attempt_replacement(&host, sub, options) {
            Ok(Some(next)) => {
                // Book-keep before moving on: spliced outputs are Modified,
                // the rest of the region is gone.
                for output in &sub.outputs {
                    states.insert(output.clone(), NodeState::Modified);
                }
                for node in &sub.nodes {
                    if !sub.inputs.contains(node) && !sub.outputs.contains(node) {
                        states.insert(node.clone(), NodeState::Removed);
                    }
                }
                host = next;
                debug!(size = host.num_internal_gates(), "improved circuit");
            }
            Ok(None) => {}
            Err(e) => return Err(e),
        }
    }

    collapse_unary_operators(&mut host)?;
    merge_duplicate_gates(&mut host)?;
    remove_redundant_gates(&mut host);

    if options.validate {
        if host.get_truth_table() == initial.get_truth_table() {
            debug!("validation passed");
        } else {
            return Err(MinimizeError::FailedValidation);
        }
    }
    Ok(host)
}

/// Try to replace one subcircuit. `Ok(Some)` carries the improved host;
/// `Ok(None)` means the cut was skipped (no smaller circuit, solver
/// timeout, or a cycle-producing splice).
fn attempt_replacement(
    host: &Circuit,
    sub: &Subcircuit,
    options: &MinimizeOptions,
) -> MinimizeResult<Option<Circuit>> {
    let mask = sub.row_mask();
    let reach = sub.reachable_rows;

    // Fold outputs that repeat a known pattern (an input's or an earlier
    // output's), directly or negated, on the reachable rows.
    let mut found: FxHashMap<u64, Label> = FxHashMap::default();
    for input in &sub.inputs {
        found.entry(sub.patterns[input] & reach).or_insert_with(|| input.clone());
    }
    let mut filtered: Vec<Label> = Vec::new();
    let mut equal_to: Vec<(Label, Label)> = Vec::new();
    let mut negation_of: Vec<(Label, Label)> = Vec::new();
    for output in &sub.outputs {
        let pattern = sub.patterns[output] & reach;
        if let Some(original) = found.get(&pattern) {
            equal_to.push((output.clone(), original.clone()));
        } else if let Some(original) = found.get(&(!sub.patterns[output] & mask & reach)) {
            negation_of.push((output.clone(), original.clone()));
        } else {
            filtered.push(output.clone());
            found.insert(pattern, output.clone());
        }
    }

    if filtered.is_empty() {
        // Nothing left to synthesize: all outputs are wires or inverters of
        // existing gates. Still worth splicing if the region had real gates.
        debug!("cut outputs collapse to aliases");
    }

    let target_size = sub.size - 1;
    let mut replacement = if filtered.is_empty() {
        let mut passthrough = Circuit::new();
        for (i, _) in sub.inputs.iter().enumerate() {
            passthrough.add_input(format!("x{i}"))?;
        }
        passthrough
    } else {
        let model = sub.local_model(&filtered)?;
        let mut finder = CircuitFinder::new(model, target_size, options.basis.clone());
        match finder.find_circuit(options.solver_time_limit) {
            Ok(circuit) => circuit,
            Err(SynthError::NoSolution) => {
                debug!("smaller subcircuit not found");
                return Ok(None);
            }
            Err(SynthError::SolverTimedOut) => {
                debug!("subcircuit search timed out");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }
    };

    // Host-to-replacement label maps for the splice.
    let mut input_map: FxHashMap<Label, Label> = FxHashMap::default();
    for (i, host_input) in sub.inputs.iter().enumerate() {
        input_map.insert(host_input.clone(), format!("x{i}"));
    }
    let replacement_of = |label: &Label,
                          input_map: &FxHashMap<Label, Label>,
                          output_map: &FxHashMap<Label, Label>|
     -> Label {
        if let Some(mapped) = input_map.get(label) {
            mapped.clone()
        } else {
            output_map[label].clone()
        }
    };

    let mut output_map: FxHashMap<Label, Label> = FxHashMap::default();
    let replacement_outputs: Vec<Label> = replacement.outputs().to_vec();
    for (host_output, repl_output) in filtered.iter().zip(&replacement_outputs) {
        output_map.insert(host_output.clone(), repl_output.clone());
    }
    for (host_output, original) in &equal_to {
        let target = replacement_of(original, &input_map, &output_map);
        output_map.insert(host_output.clone(), target);
    }
    let mut fresh = 0usize;
    for (host_output, original) in &negation_of {
        let target = replacement_of(original, &input_map, &output_map);
        let not_label = loop {
            let candidate = format!("n{fresh}");
            fresh += 1;
            if !replacement.has_gate(&candidate) {
                break candidate;
            }
        };
        replacement.emplace_gate(not_label.clone(), GateType::Not, &[target.as_str()])?;
        output_map.insert(host_output.clone(), not_label);
    }

    let mut next = host.clone();
    let spliced = next
        .replace_subcircuit(&replacement, &input_map, &output_map)
        .map(|_| ());
    match spliced {
        Ok(()) => Ok(Some(next)),
        Err(skoll_ir::CircuitError::CycleIntroduced) => {
            debug!("splice would create a cycle, cut skipped");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Count the gates the minimizer pays for: everything except inputs,
/// inverters and buffers.
pub fn cost(circuit: &Circuit) -> usize {
    circuit
        .gates()
        .filter(|g| {
            !matches!(
                g.gate_type(),
                GateType::Input | GateType::Not | GateType::Iff
            )
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = MinimizeOptions::default();
        assert_eq!(options.max_subcircuit_size, 9);
        assert_eq!(options.cut_size, 5);
        assert!(!options.validate);
    }

    #[test]
    fn test_cost_ignores_free_gates() {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.emplace_gate("n", GateType::Not, &["a"]).unwrap();
        circuit.emplace_gate("b", GateType::Iff, &["n"]).unwrap();
        circuit.emplace_gate("x", GateType::And, &["a", "b"]).unwrap();
        circuit.mark_as_output("x").unwrap();
        assert_eq!(cost(&circuit), 1);
    }
}
