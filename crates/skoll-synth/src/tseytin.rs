//! Tseytin transformation of circuits to CNF.

use rustc_hash::FxHashMap;

use skoll_ir::{Circuit, GateType, Label};

use crate::cnf::{Cnf, VarPool};

/// Result of Tseytin-transforming a circuit: the clauses plus the mapping
/// from gate labels to solver variables.
#[derive(Debug)]
pub struct TseytinTransform {
    cnf: Cnf,
    variables: FxHashMap<Label, i32>,
}

impl TseytinTransform {
    /// Transform a circuit. Every gate gets one variable; every non-input
    /// gate contributes the clauses tying its variable to its operands.
    pub fn new(circuit: &Circuit) -> Self {
        let mut pool: VarPool<Label> = VarPool::new();
        let mut cnf = Cnf::new();

        for gate in circuit.top_sort() {
            let out = pool.id(gate.label().clone());
            match gate.gate_type() {
                GateType::Input => {}
                GateType::AlwaysTrue => cnf.add_unit(out),
                GateType::AlwaysFalse => cnf.add_unit(-out),
                GateType::Not | GateType::Iff => {
                    let arg = pool.id(gate.operands()[0].clone());
                    let negated = gate.gate_type() == GateType::Not;
                    let arg_true = if negated { -out } else { out };
                    let arg_false = if negated { out } else { -out };
                    cnf.add_clause(vec![-arg, arg_true]);
                    cnf.add_clause(vec![arg, arg_false]);
                }
                binary => {
                    let tt = binary.tt4().expect("binary operators carry a table");
                    let a = pool.id(gate.operands()[0].clone());
                    let b = pool.id(gate.operands()[1].clone());
                    // One clause per argument pair: (a = p ∧ b = q) → out = tt[pq].
                    for (i, &result) in tt.iter().enumerate() {
                        let p = i & 2 != 0;
                        let q = i & 1 != 0;
                        cnf.add_clause(vec![
                            if p { -a } else { a },
                            if q { -b } else { b },
                            if result { out } else { -out },
                        ]);
                    }
                }
            }
        }

        let variables = circuit
            .labels()
            .iter()
            .map(|label| (label.clone(), pool.id(label.clone())))
            .collect();
        Self { cnf, variables }
    }

    /// The clauses.
    pub fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    /// Consume the transform, returning the clauses.
    pub fn into_cnf(self) -> Cnf {
        self.cnf
    }

    /// Solver variable of a gate.
    pub fn variable(&self, label: &str) -> Option<i32> {
        self.variables.get(label).copied()
    }

    /// Add the unit clauses requiring every output port to be true.
    pub fn assert_outputs_true(&mut self, circuit: &Circuit) {
        for output in circuit.outputs() {
            let var = self.variables[output];
            self.cnf.add_unit(var);
        }
    }
}
