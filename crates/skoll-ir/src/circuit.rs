//! The mutable circuit DAG.

use rustc_hash::FxHashMap;

use crate::block::Block;
use crate::error::{CircuitError, CircuitResult};
use crate::gate::{Gate, GateType, Label};
use crate::validation::check_acyclic;

/// A boolean circuit: a DAG of [`Gate`]s addressed by label.
///
/// The circuit maintains, for every gate, the ordered list of gates that
/// reference it as an operand (`users`). This back-link index is denormalized
/// state — recomputable from the gates alone — and every mutator keeps it
/// coherent, multiplicity included: a gate using the same operand twice
/// appears twice in that operand's user list.
///
/// Iteration order over gates is insertion order, which makes traversals and
/// serialization deterministic.
///
/// A failing mutation never leaves the circuit half-changed: single-gate
/// operations validate before touching anything, and multi-step splices work
/// on a copy that is swapped in only on success.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    pub(crate) gates: FxHashMap<Label, Gate>,
    pub(crate) order: Vec<Label>,
    pub(crate) inputs: Vec<Label>,
    pub(crate) outputs: Vec<Label>,
    pub(crate) users: FxHashMap<Label, Vec<Label>>,
    pub(crate) blocks: FxHashMap<Label, Block>,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Whether a gate with this label exists.
    #[inline]
    pub fn has_gate(&self, label: &str) -> bool {
        self.gates.contains_key(label)
    }

    /// Get a gate by label.
    #[inline]
    pub fn get_gate(&self, label: &str) -> Option<&Gate> {
        self.gates.get(label)
    }

    /// Get the users of a gate: the gates that take it as an operand,
    /// in order of appearance, multiplicity preserved.
    #[inline]
    pub fn get_gate_users(&self, label: &str) -> Option<&[Label]> {
        self.users.get(label).map(Vec::as_slice)
    }

    /// Iterate over gates in insertion order.
    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.order.iter().map(|label| &self.gates[label])
    }

    /// Gate labels in insertion order.
    #[inline]
    pub fn labels(&self) -> &[Label] {
        &self.order
    }

    /// Input labels, in declaration order.
    #[inline]
    pub fn inputs(&self) -> &[Label] {
        &self.inputs
    }

    /// Output labels, in declaration order. May contain duplicates; each
    /// occurrence is a distinct output port.
    #[inline]
    pub fn outputs(&self) -> &[Label] {
        &self.outputs
    }

    /// Number of inputs.
    #[inline]
    pub fn input_size(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output ports.
    #[inline]
    pub fn output_size(&self) -> usize {
        self.outputs.len()
    }

    /// Total number of gates, inputs included.
    #[inline]
    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Number of non-input gates.
    #[inline]
    pub fn num_internal_gates(&self) -> usize {
        self.gates.len() - self.inputs.len()
    }

    pub(crate) fn gate(&self, label: &str) -> CircuitResult<&Gate> {
        self.gates.get(label).ok_or_else(|| CircuitError::GateAbsent {
            label: label.to_string(),
        })
    }

    fn check_absent(&self, label: &str) -> CircuitResult<()> {
        if self.has_gate(label) {
            return Err(CircuitError::GateExists {
                label: label.to_string(),
            });
        }
        Ok(())
    }

    fn check_exist<'a>(&self, labels: impl IntoIterator<Item = &'a Label>) -> CircuitResult<()> {
        for label in labels {
            self.gate(label)?;
        }
        Ok(())
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Add a gate.
    ///
    /// Fails with [`CircuitError::GateExists`] if the label is taken and
    /// [`CircuitError::GateAbsent`] if an operand is missing.
    pub fn add_gate(&mut self, gate: Gate) -> CircuitResult<&mut Self> {
        self.check_absent(gate.label())?;
        self.check_exist(gate.operands())?;
        self.insert_unchecked(gate);
        Ok(self)
    }

    /// Construct and add a gate in place.
    ///
    /// # Panics
    ///
    /// Panics if the number of operands does not match the operator arity
    /// (the [`Gate`] constructor contract).
    pub fn emplace_gate(
        &mut self,
        label: impl Into<Label>,
        gate_type: GateType,
        operands: &[&str],
    ) -> CircuitResult<&mut Self> {
        let label = label.into();
        self.check_absent(&label)?;
        for operand in operands {
            self.gate(operand)?;
        }
        self.insert_unchecked(Gate::new(label, gate_type, operands.iter().copied()));
        Ok(self)
    }

    /// Add an input gate.
    pub fn add_input(&mut self, label: impl Into<Label>) -> CircuitResult<&mut Self> {
        self.add_gate(Gate::input(label))
    }

    pub(crate) fn insert_unchecked(&mut self, gate: Gate) {
        let label = gate.label().clone();
        for operand in gate.operands() {
            self.users.get_mut(operand).expect("operand exists").push(label.clone());
        }
        if gate.is_input() {
            self.inputs.push(label.clone());
        }
        self.users.entry(label.clone()).or_default();
        self.order.push(label.clone());
        self.gates.insert(label, gate);
    }

    // =========================================================================
    // Outputs
    // =========================================================================

    /// Append a label to the outputs. Duplicates are allowed.
    pub fn mark_as_output(&mut self, label: impl AsRef<str>) -> CircuitResult<&mut Self> {
        let label = label.as_ref();
        self.gate(label)?;
        self.outputs.push(label.to_string());
        Ok(self)
    }

    /// Replace the output list wholesale.
    pub fn set_outputs(&mut self, labels: Vec<Label>) -> CircuitResult<&mut Self> {
        self.check_exist(labels.iter())?;
        self.outputs = labels;
        Ok(self)
    }

    /// Reorder the outputs.
    ///
    /// `labels` must be drawn from the current outputs (with at most the
    /// current multiplicity); outputs not listed keep their relative order
    /// and are appended after the listed ones.
    pub fn order_outputs(&mut self, labels: &[Label]) -> CircuitResult<&mut Self> {
        let mut remaining: FxHashMap<&Label, usize> = FxHashMap::default();
        for output in &self.outputs {
            *remaining.entry(output).or_default() += 1;
        }
        for label in labels {
            match remaining.get_mut(label) {
                Some(count) if *count > 0 => *count -= 1,
                _ => {
                    return Err(CircuitError::GateAbsent {
                        label: label.clone(),
                    });
                }
            }
        }
        let mut reordered: Vec<Label> = labels.to_vec();
        for output in &self.outputs {
            let count = remaining.get_mut(output).expect("counted above");
            if *count > 0 {
                *count -= 1;
                reordered.push(output.clone());
            }
        }
        self.outputs = reordered;
        Ok(self)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Rename a gate, rewriting the label everywhere it occurs: the gate map,
    /// operand lists of its users, the user index, inputs, outputs and every
    /// block.
    pub fn rename_gate(&mut self, old: &str, new: impl Into<Label>) -> CircuitResult<&mut Self> {
        let new: Label = new.into();
        self.gate(old)?;
        if new == old {
            return Ok(self);
        }
        self.check_absent(&new)?;

        let gate = self.gates.remove(old).expect("checked above");
        let old: Label = gate.label().clone();

        // The renamed gate itself.
        self.gates.insert(new.clone(), gate.with_label(new.clone()));

        // Operand lists of every user.
        let user_labels: Vec<Label> = self.users[&old].clone();
        for user in &user_labels {
            let user_gate = self.gates.get_mut(user).expect("user exists");
            let operands = user_gate
                .operands()
                .iter()
                .map(|op| if *op == old { new.clone() } else { op.clone() })
                .collect();
            *user_gate = user_gate.with_operands(operands);
        }

        // User index: re-key the entry and rewrite entries under operands.
        let entry = self.users.remove(&old).expect("entry exists");
        self.users.insert(new.clone(), entry);
        let operand_labels: Vec<Label> =
            self.gates[&new].operands().to_vec();
        for operand in operand_labels {
            for user in self.users.get_mut(&operand).expect("operand exists") {
                if *user == old {
                    *user = new.clone();
                }
            }
        }

        let rewrite = |list: &mut Vec<Label>| {
            for item in list.iter_mut() {
                if *item == old {
                    *item = new.clone();
                }
            }
        };
        rewrite(&mut self.order);
        rewrite(&mut self.inputs);
        rewrite(&mut self.outputs);
        for block in self.blocks.values_mut() {
            block.rename_label(&old, &new);
        }
        Ok(self)
    }

    /// Remove a gate that no other gate uses and that is not an output.
    ///
    /// Fails with [`CircuitError::GateHasUsers`] otherwise (an output port
    /// counts as a user).
    pub fn remove_gate(&mut self, label: &str) -> CircuitResult<&mut Self> {
        self.gate(label)?;
        if !self.users[label].is_empty() || self.outputs.iter().any(|o| o == label) {
            return Err(CircuitError::GateHasUsers {
                label: label.to_string(),
            });
        }
        self.purge_gate(label);
        Ok(self)
    }

    /// Unconditionally delete a gate and all bookkeeping that mentions it.
    /// Callers must have established that nothing reachable still uses it.
    pub(crate) fn purge_gate(&mut self, label: &str) {
        let gate = self.gates.remove(label).expect("gate exists");
        for operand in gate.operands() {
            if let Some(users) = self.users.get_mut(operand) {
                users.retain(|u| u != label);
            }
        }
        self.users.remove(label);
        self.order.retain(|l| l != label);
        self.inputs.retain(|l| l != label);
        for block in self.blocks.values_mut() {
            block.forget_label(label);
        }
    }

    /// Replace the gate behind `label` with a new definition under the same
    /// label. Users of the gate are unaffected; the user index is updated
    /// along the difference of the operand lists.
    ///
    /// Fails with [`CircuitError::CycleIntroduced`] (leaving the circuit
    /// unchanged) if the new operands depend on `label`.
    ///
    /// # Panics
    ///
    /// Panics if `gate.label() != label`.
    pub fn replace_gate(&mut self, label: &str, gate: Gate) -> CircuitResult<&mut Self> {
        assert_eq!(gate.label(), label, "replacement must keep the label");
        self.gate(label)?;
        self.check_exist(gate.operands())?;
        for operand in gate.operands() {
            if operand == label || self.depends_on(operand, label) {
                return Err(CircuitError::CycleIntroduced);
            }
        }

        let old = self.gates.get(label).expect("checked above").clone();
        for operand in old.operands() {
            let users = self.users.get_mut(operand).expect("operand exists");
            let position = users.iter().position(|u| u == label).expect("user recorded");
            users.remove(position);
        }
        for operand in gate.operands() {
            self.users.get_mut(operand).expect("operand exists").push(label.to_string());
        }
        if old.is_input() && !gate.is_input() {
            self.inputs.retain(|l| l != label);
        } else if !old.is_input() && gate.is_input() {
            self.inputs.push(label.to_string());
        }
        self.gates.insert(label.to_string(), gate);
        Ok(self)
    }

    /// Whether `target` is reachable from `from` along operand links.
    pub fn depends_on(&self, from: &str, target: &str) -> bool {
        let mut stack: Vec<&Label> = match self.gates.get(from) {
            Some(gate) => gate.operands().iter().collect(),
            None => return false,
        };
        if from == target {
            return true;
        }
        let mut seen = rustc_hash::FxHashSet::default();
        while let Some(label) = stack.pop() {
            if label == target {
                return true;
            }
            if seen.insert(label) {
                stack.extend(self.gates[label].operands().iter());
            }
        }
        false
    }

    // =========================================================================
    // Splicing
    // =========================================================================

    /// Swap a bounded region of this circuit for `replacement`.
    ///
    /// `input_map` maps host labels to inputs of `replacement`; `output_map`
    /// maps host labels to gates of `replacement` that compute them. The
    /// replacement's internal labels are renamed to be disjoint from the
    /// host, mapped host gates are redefined in place (so their users are
    /// rerouted), the remaining internal gates are absorbed, and host gates
    /// that became unreachable are garbage-collected.
    ///
    /// Fails with [`CircuitError::CycleIntroduced`] — leaving the host
    /// untouched — if the splice would close a cycle.
    pub fn replace_subcircuit(
        &mut self,
        replacement: &Circuit,
        input_map: &FxHashMap<Label, Label>,
        output_map: &FxHashMap<Label, Label>,
    ) -> CircuitResult<&mut Self> {
        self.check_exist(input_map.keys())?;
        self.check_exist(output_map.keys())?;
        for target in input_map.values() {
            if !replacement.inputs.iter().any(|i| i == target) {
                return Err(CircuitError::GateAbsent {
                    label: target.clone(),
                });
            }
        }
        for target in output_map.values() {
            replacement.gate(target)?;
        }

        let mut next = self.clone();

        // Rename plan for the replacement's labels.
        let mut rename: FxHashMap<Label, Label> = FxHashMap::default();
        for (host, repl_input) in input_map {
            rename.insert(repl_input.clone(), host.clone());
        }
        // Aliased host outputs: several host labels served by one replacement
        // gate. The first one claims the label, the rest become IFF aliases.
        let mut aliases: Vec<(Label, Label)> = Vec::new();
        for (host, repl_output) in output_map {
            match rename.get(repl_output) {
                None => {
                    rename.insert(repl_output.clone(), host.clone());
                }
                Some(canonical) => aliases.push((host.clone(), canonical.clone())),
            }
        }
        let mut counter = 0usize;
        for label in &replacement.order {
            if rename.contains_key(label) {
                continue;
            }
            rename.insert(label.clone(), next.fresh_label("ns", &mut counter));
        }

        // Absorb the replacement's non-input gates in dependency order.
        for gate in replacement.top_sort() {
            if gate.is_input() {
                continue;
            }
            let new_label = rename[gate.label()].clone();
            let operands: Vec<Label> = gate
                .operands()
                .iter()
                .map(|op| rename[op].clone())
                .collect();
            let new_gate = Gate::new(new_label.clone(), gate.gate_type(), operands);
            if next.has_gate(&new_label) {
                next.replace_gate_for_splice(&new_label, new_gate)?;
            } else {
                next.add_gate(new_gate)?;
            }
        }
        for (host, canonical) in aliases {
            let alias = Gate::new(host.clone(), GateType::Iff, [canonical]);
            next.replace_gate_for_splice(&host, alias)?;
        }

        check_acyclic(&next).map_err(|_| CircuitError::CycleIntroduced)?;
        next.remove_unreachable();
        *self = next;
        Ok(self)
    }

    /// `replace_gate` without the per-gate cycle probe; splices validate
    /// acyclicity once, globally, before committing.
    fn replace_gate_for_splice(&mut self, label: &str, gate: Gate) -> CircuitResult<()> {
        self.check_exist(gate.operands())?;
        let old = self.gates.get(label).expect("host gate exists").clone();
        for operand in old.operands() {
            let users = self.users.get_mut(operand).expect("operand exists");
            if let Some(position) = users.iter().position(|u| u == label) {
                users.remove(position);
            }
        }
        for operand in gate.operands() {
            self.users.get_mut(operand).expect("operand exists").push(label.to_string());
        }
        if old.is_input() && !gate.is_input() {
            self.inputs.retain(|l| l != label);
        }
        self.gates.insert(label.to_string(), gate);
        Ok(())
    }

    /// Graft `other` onto this circuit, substituting its inputs by existing
    /// host gates, and record the graft as a block named `name`.
    ///
    /// `host_labels[i]` feeds `other_inputs[i]`. Internal gates of `other`
    /// are renamed to `{name}.{label}`.
    ///
    /// # Panics
    ///
    /// Panics if `host_labels` and `other_inputs` differ in length.
    pub fn connect_circuit(
        &mut self,
        other: &Circuit,
        host_labels: &[Label],
        other_inputs: &[Label],
        name: &str,
    ) -> CircuitResult<&mut Self> {
        assert_eq!(
            host_labels.len(),
            other_inputs.len(),
            "one host gate per substituted input"
        );
        if self.blocks.contains_key(name) {
            return Err(CircuitError::BlockExists {
                name: name.to_string(),
            });
        }
        self.check_exist(host_labels.iter())?;
        for input in other_inputs {
            if !other.inputs.iter().any(|i| i == input) {
                return Err(CircuitError::GateAbsent {
                    label: input.clone(),
                });
            }
        }

        let mut next = self.clone();
        let mut rename: FxHashMap<Label, Label> = FxHashMap::default();
        for (host, input) in host_labels.iter().zip(other_inputs) {
            rename.insert(input.clone(), host.clone());
        }
        let mut absorbed: Vec<Label> = Vec::new();
        for label in &other.order {
            if rename.contains_key(label) {
                continue;
            }
            let new_label = format!("{name}.{label}");
            next.check_absent(&new_label)?;
            rename.insert(label.clone(), new_label);
        }
        for gate in other.top_sort() {
            if gate.is_input() {
                continue;
            }
            let new_label = rename[gate.label()].clone();
            let operands: Vec<Label> = gate
                .operands()
                .iter()
                .map(|op| rename[op].clone())
                .collect();
            next.add_gate(Gate::new(new_label.clone(), gate.gate_type(), operands))?;
            absorbed.push(new_label);
        }
        let block_outputs: Vec<Label> = other
            .outputs
            .iter()
            .map(|o| rename[o].clone())
            .collect();
        next.blocks.insert(
            name.to_string(),
            Block::new(name, host_labels.to_vec(), absorbed, block_outputs),
        );
        *self = next;
        Ok(self)
    }

    /// Absorb a whole circuit, inputs included, as a block named `name`.
    /// All labels of `other` are prefixed with `{name}.`; its inputs become
    /// inputs of the host.
    pub fn add_circuit(&mut self, other: &Circuit, name: &str) -> CircuitResult<&mut Self> {
        if self.blocks.contains_key(name) {
            return Err(CircuitError::BlockExists {
                name: name.to_string(),
            });
        }
        let mut next = self.clone();
        let mut rename: FxHashMap<Label, Label> = FxHashMap::default();
        for label in &other.order {
            let new_label = format!("{name}.{label}");
            next.check_absent(&new_label)?;
            rename.insert(label.clone(), new_label);
        }
        let mut absorbed: Vec<Label> = Vec::new();
        for gate in other.top_sort() {
            let new_label = rename[gate.label()].clone();
            let operands: Vec<Label> = gate
                .operands()
                .iter()
                .map(|op| rename[op].clone())
                .collect();
            next.add_gate(Gate::new(new_label.clone(), gate.gate_type(), operands))?;
            if !gate.is_input() {
                absorbed.push(new_label);
            }
        }
        let block_inputs: Vec<Label> = other.inputs.iter().map(|i| rename[i].clone()).collect();
        let block_outputs: Vec<Label> = other.outputs.iter().map(|o| rename[o].clone()).collect();
        next.blocks.insert(
            name.to_string(),
            Block::new(name, block_inputs, absorbed, block_outputs),
        );
        *self = next;
        Ok(self)
    }

    /// Drop every gate unreachable from the outputs. Inputs are kept even
    /// when dangling.
    pub(crate) fn remove_unreachable(&mut self) {
        let mut reachable = rustc_hash::FxHashSet::default();
        let mut stack: Vec<Label> = self.outputs.clone();
        while let Some(label) = stack.pop() {
            if reachable.insert(label.clone()) {
                stack.extend(self.gates[&label].operands().iter().cloned());
            }
        }
        let doomed: Vec<Label> = self
            .order
            .iter()
            .filter(|label| !reachable.contains(*label) && !self.gates[*label].is_input())
            .cloned()
            .collect();
        for label in doomed {
            self.purge_gate(&label);
        }
    }

    /// A label of the form `{prefix}_{i}` not present in the circuit.
    /// `counter` carries the search position across calls.
    pub(crate) fn fresh_label(&self, prefix: &str, counter: &mut usize) -> Label {
        loop {
            let candidate = format!("{prefix}_{counter}");
            *counter += 1;
            if !self.has_gate(&candidate) {
                return candidate;
            }
        }
    }
}

impl std::fmt::Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for input in &self.inputs {
            writeln!(f, "INPUT({input})")?;
        }
        for gate in self.gates() {
            if !gate.is_input() {
                writeln!(f, "{gate}")?;
            }
        }
        for output in &self.outputs {
            writeln!(f, "OUTPUT({output})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_and_chain() -> Circuit {
        // a, b, c inputs; d = a AND b; e = d AND c.
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
    fn test_add_and_users() {
        let circuit = two_and_chain();
        assert_eq!(circuit.num_gates(), 5);
        assert_eq!(circuit.get_gate_users("a").unwrap(), ["d".to_string()]);
        assert_eq!(circuit.get_gate_users("d").unwrap(), ["e".to_string()]);
        assert!(circuit.get_gate_users("e").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_operand_multiplicity() {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.emplace_gate("x", GateType::Xor, &["a", "a"]).unwrap();
        assert_eq!(
            circuit.get_gate_users("a").unwrap(),
            ["x".to_string(), "x".to_string()]
        );
    }

    #[test]
    fn test_add_gate_errors() {
        let mut circuit = two_and_chain();
        assert!(matches!(
            circuit.emplace_gate("d", GateType::And, &["a", "b"]),
            Err(CircuitError::GateExists { .. })
        ));
        assert!(matches!(
            circuit.emplace_gate("f", GateType::And, &["a", "zz"]),
            Err(CircuitError::GateAbsent { .. })
        ));
        // Failed calls left nothing behind.
        assert_eq!(circuit.num_gates(), 5);
        assert_eq!(circuit.get_gate_users("a").unwrap().len(), 1);
    }

    #[test]
    fn test_outputs_allow_duplicates() {
        let mut circuit = two_and_chain();
        circuit.mark_as_output("e").unwrap();
        circuit.mark_as_output("d").unwrap();
        assert_eq!(circuit.output_size(), 3);
        circuit.order_outputs(&["d".into(), "e".into()]).unwrap();
        assert_eq!(
            circuit.outputs(),
            ["d".to_string(), "e".to_string(), "e".to_string()]
        );
    }

    #[test]
    fn test_order_outputs_rejects_foreign_label() {
        let mut circuit = two_and_chain();
        assert!(matches!(
            circuit.order_outputs(&["d".into()]),
            Err(CircuitError::GateAbsent { .. })
        ));
    }

    #[test]
    fn test_rename_rewrites_everywhere() {
        let mut circuit = two_and_chain();
        circuit.rename_gate("d", "mid").unwrap();
        assert!(!circuit.has_gate("d"));
        assert_eq!(
            circuit.get_gate("e").unwrap().operands(),
            ["mid".to_string(), "c".to_string()]
        );
        assert_eq!(circuit.get_gate_users("mid").unwrap(), ["e".to_string()]);
        assert_eq!(circuit.get_gate_users("a").unwrap(), ["mid".to_string()]);

        circuit.rename_gate("e", "out").unwrap();
        assert_eq!(circuit.outputs(), ["out".to_string()]);
    }

    #[test]
    fn test_rename_input() {
        let mut circuit = two_and_chain();
        circuit.rename_gate("a", "a0").unwrap();
        assert_eq!(circuit.inputs()[0], "a0");
        assert!(circuit.get_gate("a0").unwrap().is_input());
    }

    #[test]
    fn test_remove_gate() {
        let mut circuit = two_and_chain();
        assert!(matches!(
            circuit.remove_gate("d"),
            Err(CircuitError::GateHasUsers { .. })
        ));
        assert!(matches!(
            circuit.remove_gate("e"),
            Err(CircuitError::GateHasUsers { .. })
        ));
        circuit.set_outputs(vec!["d".into()]).unwrap();
        circuit.remove_gate("e").unwrap();
        assert!(!circuit.has_gate("e"));
        assert_eq!(circuit.get_gate_users("d").unwrap().len(), 0);
        assert_eq!(circuit.get_gate_users("c").unwrap().len(), 0);
    }

    #[test]
    fn test_replace_gate_updates_users() {
        let mut circuit = two_and_chain();
        circuit
            .replace_gate("d", Gate::new("d", GateType::Or, ["a", "c"]))
            .unwrap();
        assert_eq!(circuit.get_gate_users("b").unwrap().len(), 0);
        assert_eq!(
            circuit.get_gate_users("c").unwrap(),
            ["e".to_string(), "d".to_string()]
        );
        assert_eq!(circuit.get_gate("d").unwrap().gate_type(), GateType::Or);
    }

    #[test]
    fn test_replace_gate_cycle_rejected() {
        // a input; b = NOT(a); c = AND(a, b); then b := IFF(c) closes a cycle.
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.emplace_gate("b", GateType::Not, &["a"]).unwrap();
        circuit.emplace_gate("c", GateType::And, &["a", "b"]).unwrap();
        let before_users: Vec<_> = circuit.get_gate_users("a").unwrap().to_vec();

        let result = circuit.replace_gate("b", Gate::new("b", GateType::Iff, ["c"]));
        assert!(matches!(result, Err(CircuitError::CycleIntroduced)));
        // Untouched on failure.
        assert_eq!(circuit.get_gate("b").unwrap().gate_type(), GateType::Not);
        assert_eq!(circuit.get_gate_users("a").unwrap(), before_users.as_slice());
        assert_eq!(circuit.get_gate_users("c").unwrap().len(), 0);
    }

    #[test]
    fn test_depends_on() {
        let circuit = two_and_chain();
        assert!(circuit.depends_on("e", "a"));
        assert!(circuit.depends_on("e", "d"));
        assert!(!circuit.depends_on("d", "e"));
        assert!(!circuit.depends_on("a", "b"));
    }

    #[test]
    fn test_fresh_label_skips_taken() {
        let mut circuit = Circuit::new();
        circuit.add_input("ns_0").unwrap();
        let mut counter = 0;
        assert_eq!(circuit.fresh_label("ns", &mut counter), "ns_1");
        assert_eq!(circuit.fresh_label("ns", &mut counter), "ns_2");
    }

    #[test]
    fn test_display_lists_sections() {
        let circuit = two_and_chain();
        let text = circuit.to_string();
        assert!(text.contains("INPUT(a)"));
        assert!(text.contains("d = AND(a, b)"));
        assert!(text.contains("OUTPUT(e)"));
    }
}
