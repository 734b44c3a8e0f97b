//! Evaluation and boolean-function analysis.

use rustc_hash::FxHashMap;

use crate::circuit::Circuit;
use crate::error::{CircuitError, CircuitResult};
use crate::gate::Label;
use crate::logic::TriValue;
use crate::truth_table::{TruthTable, canonical_input};

impl Circuit {
    /// Evaluate every gate under a (possibly partial) input assignment.
    ///
    /// Inputs missing from `assignment` are `Undefined`; undefinedness
    /// propagates through the gates except where a dominating operand fixes
    /// the result.
    pub fn evaluate_full_circuit(
        &self,
        assignment: &FxHashMap<Label, TriValue>,
    ) -> FxHashMap<Label, TriValue> {
        let mut values: FxHashMap<Label, TriValue> = FxHashMap::default();
        let mut operands: Vec<TriValue> = Vec::with_capacity(2);
        for gate in self.top_sort() {
            let value = if gate.is_input() {
                assignment
                    .get(gate.label())
                    .copied()
                    .unwrap_or(TriValue::Undefined)
            } else {
                operands.clear();
                operands.extend(gate.operands().iter().map(|op| values[op]));
                gate.gate_type().eval(&operands)
            };
            values.insert(gate.label().clone(), value);
        }
        values
    }

    /// Evaluate the output ports under a (possibly partial) assignment.
    /// Duplicate output labels produce one value per port.
    pub fn evaluate_circuit_outputs(
        &self,
        assignment: &FxHashMap<Label, TriValue>,
    ) -> Vec<TriValue> {
        let values = self.evaluate_full_circuit(assignment);
        self.outputs().iter().map(|o| values[o]).collect()
    }

    /// Evaluate with positional three-valued input values, in declared input
    /// order.
    pub fn evaluate_tri(&self, inputs: &[TriValue]) -> CircuitResult<Vec<TriValue>> {
        if inputs.len() != self.input_size() {
            return Err(CircuitError::BadTruthTableShape {
                expected: self.input_size(),
                got: inputs.len(),
            });
        }
        let assignment = self
            .inputs()
            .iter()
            .cloned()
            .zip(inputs.iter().copied())
            .collect();
        Ok(self.evaluate_circuit_outputs(&assignment))
    }
}

/// Anything that behaves as a boolean function: a [`Circuit`], a
/// [`TruthTable`], or any other realization.
///
/// The structural queries either enumerate all `2^n` input patterns
/// (acceptable for `n ≲ 20`) or short-circuit on the first counterexample.
pub trait BooleanFunction {
    /// Number of inputs.
    fn input_size(&self) -> usize;

    /// Number of outputs.
    fn output_size(&self) -> usize;

    /// Evaluate on concrete inputs, one value per output port.
    ///
    /// # Panics
    ///
    /// Panics if `inputs.len() != self.input_size()`.
    fn evaluate(&self, inputs: &[bool]) -> Vec<bool>;

    /// Evaluate a single output.
    fn evaluate_at(&self, inputs: &[bool], output_index: usize) -> bool {
        self.evaluate(inputs)[output_index]
    }

    /// The full truth table, columns in canonical big-endian order.
    fn get_truth_table(&self) -> TruthTable {
        let n = self.input_size();
        let mut rows = vec![Vec::with_capacity(1usize << n); self.output_size()];
        for index in 0..1usize << n {
            let values = self.evaluate(&canonical_input(index, n));
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
        }
        TruthTable::new(rows).expect("rows share the 2^n width")
    }

    /// Whether output `output_index` takes the same value on every input.
    fn is_constant_at(&self, output_index: usize) -> bool {
        let n = self.input_size();
        let first = self.evaluate_at(&canonical_input(0, n), output_index);
        (1..1usize << n)
            .all(|index| self.evaluate_at(&canonical_input(index, n), output_index) == first)
    }

    /// Whether every output is constant.
    fn is_constant(&self) -> bool {
        (0..self.output_size()).all(|i| self.is_constant_at(i))
    }

    /// Whether output `output_index` never decreases (never increases, when
    /// `inverse`) along the canonical enumeration of inputs.
    fn is_monotone_at(&self, output_index: usize, inverse: bool) -> bool {
        let n = self.input_size();
        let mut flipped = false;
        for index in 0..1usize << n {
            let value = self.evaluate_at(&canonical_input(index, n), output_index);
            if !flipped && value != inverse {
                flipped = true;
            } else if flipped && value == inverse {
                return false;
            }
        }
        true
    }

    /// Whether every output is monotone in the sense of
    /// [`BooleanFunction::is_monotone_at`].
    fn is_monotone(&self, inverse: bool) -> bool {
        (0..self.output_size()).all(|i| self.is_monotone_at(i, inverse))
    }

    /// Whether output `output_index` depends only on the number of true
    /// inputs.
    fn is_symmetric_at(&self, output_index: usize) -> bool {
        let n = self.input_size();
        let mut per_weight: Vec<Option<bool>> = vec![None; n + 1];
        for index in 0..1usize << n {
            let weight = index.count_ones() as usize;
            let value = self.evaluate_at(&canonical_input(index, n), output_index);
            match per_weight[weight] {
                None => per_weight[weight] = Some(value),
                Some(seen) if seen != value => return false,
                Some(_) => {}
            }
        }
        true
    }

    /// Whether every output is symmetric.
    fn is_symmetric(&self) -> bool {
        (0..self.output_size()).all(|i| self.is_symmetric_at(i))
    }

    /// Whether flipping input `input_index` can change output `output_index`.
    fn is_dependent_on_input_at(&self, output_index: usize, input_index: usize) -> bool {
        let n = self.input_size();
        for index in 0..1usize << n {
            let mut inputs = canonical_input(index, n);
            if inputs[input_index] {
                continue;
            }
            let low = self.evaluate_at(&inputs, output_index);
            inputs[input_index] = true;
            if self.evaluate_at(&inputs, output_index) != low {
                return true;
            }
        }
        false
    }

    /// Whether output `output_index` equals input `input_index` everywhere.
    fn is_output_equal_to_input(&self, output_index: usize, input_index: usize) -> bool {
        let n = self.input_size();
        (0..1usize << n).all(|index| {
            let inputs = canonical_input(index, n);
            self.evaluate_at(&inputs, output_index) == inputs[input_index]
        })
    }

    /// Whether output `output_index` equals the negation of input
    /// `input_index` everywhere.
    fn is_output_equal_to_input_negation(
        &self,
        output_index: usize,
        input_index: usize,
    ) -> bool {
        let n = self.input_size();
        (0..1usize << n).all(|index| {
            let inputs = canonical_input(index, n);
            self.evaluate_at(&inputs, output_index) != inputs[input_index]
        })
    }

    /// Indices of the inputs output `output_index` depends on.
    fn get_significant_inputs_of(&self, output_index: usize) -> Vec<usize> {
        (0..self.input_size())
            .filter(|&i| self.is_dependent_on_input_at(output_index, i))
            .collect()
    }

    /// Search for input negations making the selected outputs symmetric.
    ///
    /// Returns the first negation vector (in canonical enumeration order)
    /// under which every listed output depends only on the weight of the
    /// un-negated assignment, or `None` if no such vector exists.
    fn find_negations_to_make_symmetric(&self, output_indices: &[usize]) -> Option<Vec<bool>> {
        let n = self.input_size();
        'masks: for mask in 0..1usize << n {
            let negations = canonical_input(mask, n);
            let mut per_weight: Vec<Option<Vec<bool>>> = vec![None; n + 1];
            for index in 0..1usize << n {
                let base = canonical_input(index, n);
                let weight = base.iter().filter(|&&b| b).count();
                let actual: Vec<bool> = base
                    .iter()
                    .zip(&negations)
                    .map(|(&b, &neg)| b ^ neg)
                    .collect();
                let outputs = self.evaluate(&actual);
                let selected: Vec<bool> =
                    output_indices.iter().map(|&i| outputs[i]).collect();
                let entry = &mut per_weight[weight];
                match entry {
                    None => *entry = Some(selected),
                    Some(seen) => {
                        if *seen != selected {
                            continue 'masks;
                        }
                    }
                }
            }
            return Some(negations);
        }
        None
    }
}

impl BooleanFunction for Circuit {
    fn input_size(&self) -> usize {
        Circuit::input_size(self)
    }

    fn output_size(&self) -> usize {
        Circuit::output_size(self)
    }

    fn evaluate(&self, inputs: &[bool]) -> Vec<bool> {
        assert_eq!(
            inputs.len(),
            Circuit::input_size(self),
            "one value per declared input"
        );
        let tri: Vec<TriValue> = inputs.iter().map(|&b| TriValue::from(b)).collect();
        self.evaluate_tri(&tri)
            .expect("length checked")
            .into_iter()
            .map(|v| v.to_bool().expect("fully assigned inputs define all gates"))
            .collect()
    }
}

impl BooleanFunction for TruthTable {
    fn input_size(&self) -> usize {
        TruthTable::input_size(self)
    }

    fn output_size(&self) -> usize {
        TruthTable::output_size(self)
    }

    fn evaluate(&self, inputs: &[bool]) -> Vec<bool> {
        assert_eq!(inputs.len(), TruthTable::input_size(self));
        let index = inputs.iter().fold(0usize, |acc, &b| (acc << 1) | b as usize);
        self.rows().iter().map(|row| row[index]).collect()
    }

    fn get_truth_table(&self) -> TruthTable {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateType;
    use TriValue::{False, True, Undefined};

    fn xor_majority() -> Circuit {
        // sum = a XOR b XOR c, maj = majority(a, b, c)
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.add_input("b").unwrap();
        circuit.add_input("c").unwrap();
        circuit.emplace_gate("ab", GateType::Xor, &["a", "b"]).unwrap();
        circuit.emplace_gate("sum", GateType::Xor, &["ab", "c"]).unwrap();
        circuit.emplace_gate("and_ab", GateType::And, &["a", "b"]).unwrap();
        circuit.emplace_gate("or_ab", GateType::Or, &["a", "b"]).unwrap();
        circuit
            .emplace_gate("and_c", GateType::And, &["or_ab", "c"])
            .unwrap();
        circuit
            .emplace_gate("maj", GateType::Or, &["and_ab", "and_c"])
            .unwrap();
        circuit.mark_as_output("sum").unwrap();
        circuit.mark_as_output("maj").unwrap();
        circuit
    }

    #[test]
    fn test_truth_table_matches_evaluate() {
        let circuit = xor_majority();
        let tt = circuit.get_truth_table();
        assert_eq!(tt.to_strings(), vec!["01101001", "00010111"]);
        for index in 0..8 {
            let inputs = canonical_input(index, 3);
            assert_eq!(
                circuit.evaluate(&inputs),
                vec![tt.value(0, index), tt.value(1, index)]
            );
        }
    }

    #[test]
    fn test_partial_evaluation_undefined() {
        let circuit = xor_majority();
        let mut assignment = FxHashMap::default();
        assignment.insert("a".to_string(), False);
        assignment.insert("b".to_string(), False);
        let values = circuit.evaluate_full_circuit(&assignment);
        // XOR with an undefined operand stays undefined.
        assert_eq!(values["sum"], Undefined);
        // Majority of (F, F, ?) is dominated to false.
        assert_eq!(values["maj"], False);
        assert_eq!(values["c"], Undefined);
    }

    #[test]
    fn test_duplicate_output_ports() {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.emplace_gate("n", GateType::Not, &["a"]).unwrap();
        circuit.mark_as_output("n").unwrap();
        circuit.mark_as_output("n").unwrap();
        assert_eq!(circuit.evaluate_tri(&[True]).unwrap(), vec![False, False]);
    }

    #[test]
    fn test_constant_queries() {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.emplace_gate("t", GateType::AlwaysTrue, &[]).unwrap();
        circuit.mark_as_output("t").unwrap();
        circuit.mark_as_output("a").unwrap();
        assert!(circuit.is_constant_at(0));
        assert!(!circuit.is_constant_at(1));
        assert!(!circuit.is_constant());
    }

    #[test]
    fn test_symmetry_queries() {
        let circuit = xor_majority();
        assert!(circuit.is_symmetric_at(0));
        assert!(circuit.is_symmetric_at(1));
        assert!(circuit.is_symmetric());

        let gt = TruthTable::from_strings(&["0010"]).unwrap();
        assert!(!gt.is_symmetric_at(0));
    }

    #[test]
    fn test_monotone_queries() {
        // OR truth table is monotone along canonical enumeration.
        let or = TruthTable::from_strings(&["0111"]).unwrap();
        assert!(or.is_monotone_at(0, false));
        assert!(!or.is_monotone_at(0, true));
        let nor = TruthTable::from_strings(&["1000"]).unwrap();
        assert!(nor.is_monotone_at(0, true));
    }

    #[test]
    fn test_dependence_and_significant_inputs() {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.add_input("b").unwrap();
        circuit.add_input("c").unwrap();
        circuit.emplace_gate("x", GateType::And, &["a", "b"]).unwrap();
        circuit.mark_as_output("x").unwrap();
        assert!(circuit.is_dependent_on_input_at(0, 0));
        assert!(circuit.is_dependent_on_input_at(0, 1));
        assert!(!circuit.is_dependent_on_input_at(0, 2));
        assert_eq!(circuit.get_significant_inputs_of(0), vec![0, 1]);
    }

    #[test]
    fn test_output_equals_input() {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.add_input("b").unwrap();
        circuit.emplace_gate("buf", GateType::Iff, &["b"]).unwrap();
        circuit.emplace_gate("inv", GateType::Not, &["b"]).unwrap();
        circuit.mark_as_output("buf").unwrap();
        circuit.mark_as_output("inv").unwrap();
        assert!(circuit.is_output_equal_to_input(0, 1));
        assert!(!circuit.is_output_equal_to_input(0, 0));
        assert!(circuit.is_output_equal_to_input_negation(1, 1));
    }

    #[test]
    fn test_find_negations() {
        // AND(NOT a, b) becomes symmetric under a single input negation;
        // negating b (making the function a NOR of the base) is found first.
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.add_input("b").unwrap();
        circuit.emplace_gate("na", GateType::Not, &["a"]).unwrap();
        circuit.emplace_gate("x", GateType::And, &["na", "b"]).unwrap();
        circuit.mark_as_output("x").unwrap();
        let negations = circuit.find_negations_to_make_symmetric(&[0]).unwrap();
        assert_eq!(negations, vec![false, true]);

        // XOR is already symmetric: the all-false vector comes first.
        let xor = TruthTable::from_strings(&["0110"]).unwrap();
        assert_eq!(
            xor.find_negations_to_make_symmetric(&[0]).unwrap(),
            vec![false, false]
        );
    }

    #[test]
    fn test_evaluate_tri_shape_check() {
        let circuit = xor_majority();
        assert!(matches!(
            circuit.evaluate_tri(&[True, False]),
            Err(CircuitError::BadTruthTableShape { .. })
        ));
    }
}
