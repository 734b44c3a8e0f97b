//! Fixed-size SAT encoding of circuit synthesis.

use std::time::Duration;

use itertools::Itertools;
use tracing::debug;

use skoll_ir::{Circuit, Gate, GateType, TruthTableModel};

use crate::basis::{Basis, Operation};
use crate::cnf::{Cnf, VarPool};
use crate::error::{SynthError, SynthResult};
use crate::solver::{KissatSolver, SatModel, SatSolver, SolverOutcome};

/// Variable names of the encoding.
///
/// Gate indices run over `[0, n + r)`: inputs first, then the `r` internal
/// gates. Pattern indices run over the `2^n` truth-table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SynthVar {
    /// Gate `gate` takes operands from gates `a < b < gate`.
    Pred { gate: usize, a: usize, b: usize },
    /// Value of gate `gate` on input pattern `t`.
    Value { gate: usize, t: usize },
    /// Truth-table entry of gate `gate` at argument pair `(p, q)`.
    TypeBit { gate: usize, p: bool, q: bool },
    /// Output `output` is computed at gate `gate`.
    Output { output: usize, gate: usize },
}

/// Encodes "does a circuit of `r` gates over basis `B` realize the model?"
/// as CNF and decodes satisfying assignments into concrete circuits.
///
/// The encoding is the classic one: one selector per predecessor pair,
/// `2^n` value variables per gate, a four-bit operator table per gate, and
/// an output-placement selector per output. It is practical up to roughly
/// `n ≤ 6`, `r ≤ 14` with a modern CDCL solver.
pub struct CircuitFinder {
    model: TruthTableModel,
    basis: Basis,
    num_inputs: usize,
    num_gates: usize,
    pool: VarPool<SynthVar>,
    cnf: Cnf,
}

impl CircuitFinder {
    /// Build the encoding for `model` with exactly `number_of_gates`
    /// internal gates over `basis`.
    pub fn new(model: TruthTableModel, number_of_gates: usize, basis: Basis) -> Self {
        let mut finder = Self {
            num_inputs: model.input_size(),
            num_gates: number_of_gates,
            model,
            basis,
            pool: VarPool::new(),
            cnf: Cnf::new(),
        };
        finder.encode();
        finder
    }

    fn total_gates(&self) -> usize {
        self.num_inputs + self.num_gates
    }

    fn internal_gates(&self) -> std::ops::Range<usize> {
        self.num_inputs..self.total_gates()
    }

    fn patterns(&self) -> std::ops::Range<usize> {
        0..1usize << self.num_inputs
    }

    /// Whether pattern `t` constrains nothing (every output row is a
    /// don't-care there).
    fn is_dont_care_pattern(&self, t: usize) -> bool {
        self.model.column_is_dont_care(t)
    }

    fn pred(&mut self, gate: usize, a: usize, b: usize) -> i32 {
        debug_assert!(a < b && b < gate);
        self.pool.id(SynthVar::Pred { gate, a, b })
    }

    fn value(&mut self, gate: usize, t: usize) -> i32 {
        self.pool.id(SynthVar::Value { gate, t })
    }

    fn type_bit(&mut self, gate: usize, p: bool, q: bool) -> i32 {
        self.pool.id(SynthVar::TypeBit { gate, p, q })
    }

    fn output_at(&mut self, output: usize, gate: usize) -> i32 {
        self.pool.id(SynthVar::Output { output, gate })
    }

    fn encode(&mut self) {
        // Each internal gate reads exactly one predecessor pair.
        for gate in self.internal_gates() {
            let lits: Vec<i32> = (0..gate)
                .tuple_combinations()
                .map(|(a, b)| self.pred(gate, a, b))
                .collect();
            self.cnf.add_exactly_one(&lits);
        }

        // Each output is computed at exactly one internal gate.
        for output in 0..self.model.output_size() {
            let lits: Vec<i32> = self
                .internal_gates()
                .map(|gate| self.output_at(output, gate))
                .collect();
            self.cnf.add_exactly_one(&lits);
        }

        // Input values are pinned to the pattern bits (big-endian: input 0
        // carries the most significant bit). Fully don't-care columns are
        // skipped throughout.
        for input in 0..self.num_inputs {
            for t in self.patterns() {
                if self.is_dont_care_pattern(t) {
                    continue;
                }
                let var = self.value(input, t);
                if (t >> (self.num_inputs - 1 - input)) & 1 == 1 {
                    self.cnf.add_unit(var);
                } else {
                    self.cnf.add_unit(-var);
                }
            }
        }

        // Functional consistency: if gate g reads (a, b) and the operand
        // values at pattern t are (p, q), then g's value at t must equal
        // its table entry at (p, q).
        for gate in self.internal_gates() {
            for (a, b) in (0..gate).tuple_combinations() {
                let selector = self.pred(gate, a, b);
                for (gate_bit, p, q) in
                    itertools::iproduct!([false, true], [false, true], [false, true])
                {
                    for t in self.patterns() {
                        if self.is_dont_care_pattern(t) {
                            continue;
                        }
                        let value_gate = self.value(gate, t);
                        let value_a = self.value(a, t);
                        let value_b = self.value(b, t);
                        let table = self.type_bit(gate, p, q);
                        self.cnf.add_clause(vec![
                            -selector,
                            if gate_bit { -value_gate } else { value_gate },
                            if p { -value_a } else { value_a },
                            if q { -value_b } else { value_b },
                            if gate_bit { table } else { -table },
                        ]);
                    }
                }
            }
        }

        // Output correctness on the defined cells.
        for output in 0..self.model.output_size() {
            for t in self.patterns() {
                let Some(required) = self.model.cell(output, t) else {
                    continue;
                };
                for gate in self.internal_gates() {
                    let placed = self.output_at(output, gate);
                    let value = self.value(gate, t);
                    self.cnf
                        .add_clause(vec![-placed, if required { value } else { -value }]);
                }
            }
        }

        // Basis restriction: forbid every excluded four-bit table.
        let forbidden = self.basis.forbidden();
        for gate in self.internal_gates() {
            for operation in &forbidden {
                let tt = operation.tt();
                let clause: Vec<i32> = (0..4)
                    .map(|i| {
                        let bit = self.type_bit(gate, i & 2 != 0, i & 1 != 0);
                        if tt[i] { -bit } else { bit }
                    })
                    .collect();
                self.cnf.add_clause(clause);
            }
        }
    }

    /// The accumulated CNF.
    pub fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    /// Pin gate `gate`'s structure: its predecessors (one or both) and/or
    /// its operation.
    ///
    /// `gate` must be an internal gate index; predecessors must precede it
    /// in strictly increasing order, and a second predecessor requires a
    /// first.
    pub fn fix_gate(
        &mut self,
        gate: usize,
        first: Option<usize>,
        second: Option<usize>,
        operation: Option<Operation>,
    ) -> SynthResult<()> {
        if !self.internal_gates().contains(&gate) {
            return Err(SynthError::GateAbsent { index: gate });
        }
        match (first, second) {
            (None, Some(_)) => return Err(SynthError::FixGateOrder { gate }),
            (Some(a), Some(b)) if a >= b => return Err(SynthError::FixGateOrder { gate }),
            _ => {}
        }
        for pred in [first, second].into_iter().flatten() {
            if pred >= self.total_gates() {
                return Err(SynthError::GateAbsent { index: pred });
            }
            if pred >= gate {
                return Err(SynthError::FixGateOrder { gate });
            }
        }

        match (first, second) {
            (Some(a), Some(b)) => {
                let lit = self.pred(gate, a, b);
                self.cnf.add_unit(lit);
            }
            (Some(a), None) => {
                let clause: Vec<i32> = (0..gate)
                    .tuple_combinations()
                    .filter(|&(x, y)| x == a || y == a)
                    .map(|(x, y)| self.pred(gate, x, y))
                    .collect();
                self.cnf.add_clause(clause);
            }
            (None, _) => {}
        }
        if let Some(operation) = operation {
            let tt = operation.tt();
            for i in 0..4 {
                let bit = self.type_bit(gate, i & 2 != 0, i & 1 != 0);
                self.cnf.add_unit(if tt[i] { bit } else { -bit });
            }
        }
        Ok(())
    }

    /// Forbid gate `to` from reading gate `from`.
    pub fn forbid_wire(&mut self, from: usize, to: usize) -> SynthResult<()> {
        if from >= self.total_gates() {
            return Err(SynthError::GateAbsent { index: from });
        }
        if !self.internal_gates().contains(&to) {
            return Err(SynthError::GateAbsent { index: to });
        }
        if from >= to {
            return Err(SynthError::ForbidWireOrder { from, to });
        }
        let forbidden: Vec<i32> = (0..to)
            .tuple_combinations()
            .filter(|&(a, b)| a == from || b == from)
            .map(|(a, b)| self.pred(to, a, b))
            .collect();
        for lit in forbidden {
            self.cnf.add_unit(-lit);
        }
        Ok(())
    }

    /// Solve the encoding with the default kissat backend.
    pub fn find_circuit(&mut self, time_limit: Option<Duration>) -> SynthResult<Circuit> {
        let mut solver = KissatSolver::new();
        self.find_circuit_with(&mut solver, time_limit)
    }

    /// Solve the encoding with a caller-provided solver.
    ///
    /// Returns [`SynthError::NoSolution`] on UNSAT and
    /// [`SynthError::SolverTimedOut`] when the limit fires.
    pub fn find_circuit_with(
        &mut self,
        solver: &mut dyn SatSolver,
        time_limit: Option<Duration>,
    ) -> SynthResult<Circuit> {
        debug!(
            inputs = self.num_inputs,
            gates = self.num_gates,
            outputs = self.model.output_size(),
            clauses = self.cnf.num_clauses(),
            "searching for a circuit"
        );
        if self.cnf.has_empty_clause() {
            return Err(SynthError::NoSolution);
        }
        match solver.solve(&self.cnf, time_limit)? {
            SolverOutcome::Unsat => Err(SynthError::NoSolution),
            SolverOutcome::Interrupted => Err(SynthError::SolverTimedOut),
            SolverOutcome::Sat(model) => self.decode(&model),
        }
    }

    fn label(&self, index: usize) -> String {
        if index < self.num_inputs {
            format!("x{index}")
        } else {
            format!("s{}", index - self.num_inputs)
        }
    }

    /// Read the witness back into a circuit with canonical labels.
    fn decode(&mut self, model: &SatModel) -> SynthResult<Circuit> {
        let mut circuit = Circuit::new();
        for input in 0..self.num_inputs {
            circuit.add_input(self.label(input))?;
        }

        for gate in self.internal_gates() {
            let (a, b) = (0..gate)
                .tuple_combinations()
                .find(|&(a, b)| model.is_true(self.pred(gate, a, b)))
                .expect("exactly-one selector is satisfied");
            let tt = [
                model.is_true(self.type_bit(gate, false, false)),
                model.is_true(self.type_bit(gate, false, true)),
                model.is_true(self.type_bit(gate, true, false)),
                model.is_true(self.type_bit(gate, true, true)),
            ];
            circuit.add_gate(self.decode_gate(self.label(gate), tt, a, b))?;
        }

        for output in 0..self.model.output_size() {
            let gate = self
                .internal_gates()
                .find(|&gate| model.is_true(self.output_at(output, gate)))
                .expect("exactly-one placement is satisfied");
            circuit.mark_as_output(self.label(gate))?;
        }
        Ok(circuit)
    }

    /// Map a four-bit table back to a gate, canonicalizing by arity: tables
    /// that depend on one operand decode to the unary type on that operand,
    /// constant tables to the nullary constants.
    fn decode_gate(&self, label: String, tt: [bool; 4], a: usize, b: usize) -> Gate {
        let first = self.label(a);
        let second = self.label(b);
        match Operation::from_tt(tt) {
            Operation::Zero => Gate::new(label, GateType::AlwaysFalse, Vec::<String>::new()),
            Operation::One => Gate::new(label, GateType::AlwaysTrue, Vec::<String>::new()),
            Operation::Not => Gate::new(label, GateType::Not, [first]),
            Operation::Not2 => Gate::new(label, GateType::Not, [second]),
            Operation::Iff => Gate::new(label, GateType::Iff, [first]),
            Operation::Iff2 => Gate::new(label, GateType::Iff, [second]),
            Operation::And => Gate::new(label, GateType::And, [first, second]),
            Operation::Or => Gate::new(label, GateType::Or, [first, second]),
            Operation::Nand => Gate::new(label, GateType::Nand, [first, second]),
            Operation::Nor => Gate::new(label, GateType::Nor, [first, second]),
            Operation::Xor => Gate::new(label, GateType::Xor, [first, second]),
            Operation::Nxor => Gate::new(label, GateType::Nxor, [first, second]),
            Operation::Greater => Gate::new(label, GateType::Gt, [first, second]),
            Operation::Less => Gate::new(label, GateType::Lt, [first, second]),
            Operation::GreaterOrEqual => Gate::new(label, GateType::Geq, [first, second]),
            Operation::LessOrEqual => Gate::new(label, GateType::Leq, [first, second]),
        }
    }
}
