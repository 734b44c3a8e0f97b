//! Named views into a region of a circuit.

use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::error::{CircuitError, CircuitResult};
use crate::gate::Label;

/// A non-owning view of a circuit region: declared inputs, the gates inside,
/// and the outputs visible to the rest of the circuit.
///
/// Blocks are bookkeeping for compositional construction; the underlying
/// gates belong to the circuit, and structural mutations (rename, removal)
/// keep every block in sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    name: Label,
    inputs: Vec<Label>,
    gates: Vec<Label>,
    outputs: Vec<Label>,
}

impl Block {
    pub(crate) fn new(
        name: impl Into<Label>,
        inputs: Vec<Label>,
        gates: Vec<Label>,
        outputs: Vec<Label>,
    ) -> Self {
        Self {
            name: name.into(),
            inputs,
            gates,
            outputs,
        }
    }

    /// The block's name.
    #[inline]
    pub fn name(&self) -> &Label {
        &self.name
    }

    /// Gates feeding the block from outside.
    #[inline]
    pub fn inputs(&self) -> &[Label] {
        &self.inputs
    }

    /// Gates inside the block.
    #[inline]
    pub fn gates(&self) -> &[Label] {
        &self.gates
    }

    /// Block gates visible outside the block.
    #[inline]
    pub fn outputs(&self) -> &[Label] {
        &self.outputs
    }

    pub(crate) fn rename_label(&mut self, old: &str, new: &Label) {
        for list in [&mut self.inputs, &mut self.gates, &mut self.outputs] {
            for item in list.iter_mut() {
                if item == old {
                    *item = new.clone();
                }
            }
        }
    }

    pub(crate) fn forget_label(&mut self, label: &str) {
        self.inputs.retain(|l| l != label);
        self.gates.retain(|l| l != label);
        self.outputs.retain(|l| l != label);
    }
}

impl Circuit {
    /// Define a block over existing gates.
    ///
    /// Every gate in `gates` must draw its operands from `inputs ∪ gates`
    /// (a gate fed from outside that set is reported as
    /// [`CircuitError::GateAbsent`] on the stray operand), and only gates
    /// listed in `outputs` may be used outside the block
    /// ([`CircuitError::BlockHasUsers`] otherwise).
    pub fn make_block_from_slice(
        &mut self,
        name: impl Into<Label>,
        inputs: Vec<Label>,
        gates: Vec<Label>,
        outputs: Vec<Label>,
    ) -> CircuitResult<&Block> {
        let name = name.into();
        if self.blocks.contains_key(&name) {
            return Err(CircuitError::BlockExists { name });
        }
        for label in inputs.iter().chain(&gates).chain(&outputs) {
            self.gate(label)?;
        }

        let visible: rustc_hash::FxHashSet<&str> = inputs
            .iter()
            .chain(&gates)
            .map(Label::as_str)
            .collect();
        for label in &gates {
            for operand in self.gates[label].operands() {
                if !visible.contains(operand.as_str()) {
                    return Err(CircuitError::GateAbsent {
                        label: operand.clone(),
                    });
                }
            }
        }

        let inside: rustc_hash::FxHashSet<&str> = gates.iter().map(Label::as_str).collect();
        let exported: rustc_hash::FxHashSet<&str> = outputs.iter().map(Label::as_str).collect();
        for label in &gates {
            if exported.contains(label.as_str()) {
                continue;
            }
            if let Some(leak) = self.users[label]
                .iter()
                .find(|user| !inside.contains(user.as_str()))
            {
                return Err(CircuitError::BlockHasUsers {
                    name,
                    label: leak.clone(),
                });
            }
        }

        self.blocks
            .insert(name.clone(), Block::new(name.clone(), inputs, gates, outputs));
        Ok(&self.blocks[&name])
    }

    /// Get a block by name.
    pub fn get_block(&self, name: &str) -> CircuitResult<&Block> {
        self.blocks.get(name).ok_or_else(|| CircuitError::BlockAbsent {
            name: name.to_string(),
        })
    }

    /// Iterate over blocks (no particular order).
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Drop a block view. The underlying gates stay.
    pub fn delete_block(&mut self, name: &str) -> CircuitResult<&mut Self> {
        if self.blocks.remove(name).is_none() {
            return Err(CircuitError::BlockAbsent {
                name: name.to_string(),
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateType;

    fn sample() -> Circuit {
        let mut circuit = Circuit::new();
        circuit.add_input("a").unwrap();
        circuit.add_input("b").unwrap();
        circuit.emplace_gate("m", GateType::And, &["a", "b"]).unwrap();
        circuit.emplace_gate("n", GateType::Not, &["m"]).unwrap();
        circuit.emplace_gate("z", GateType::Or, &["n", "a"]).unwrap();
        circuit.mark_as_output("z").unwrap();
        circuit
    }

    #[test]
    fn test_make_block() {
        let mut circuit = sample();
        let block = circuit
            .make_block_from_slice(
                "inner",
                vec!["a".into(), "b".into()],
                vec!["m".into(), "n".into()],
                vec!["n".into()],
            )
            .unwrap();
        assert_eq!(block.gates(), ["m".to_string(), "n".to_string()]);
        assert_eq!(block.outputs(), ["n".to_string()]);
    }

    #[test]
    fn test_block_exists() {
        let mut circuit = sample();
        circuit
            .make_block_from_slice("inner", vec!["a".into()], vec![], vec![])
            .unwrap();
        assert!(matches!(
            circuit.make_block_from_slice("inner", vec![], vec![], vec![]),
            Err(CircuitError::BlockExists { .. })
        ));
    }

    #[test]
    fn test_block_leaking_user_rejected() {
        let mut circuit = sample();
        // m is used by n, which is outside the block and m is not exported.
        let result = circuit.make_block_from_slice(
            "leaky",
            vec!["a".into(), "b".into()],
            vec!["m".into()],
            vec![],
        );
        assert!(matches!(result, Err(CircuitError::BlockHasUsers { .. })));
    }

    #[test]
    fn test_block_foreign_operand_rejected() {
        let mut circuit = sample();
        // n's operand m is neither a block input nor a block gate.
        let result = circuit.make_block_from_slice(
            "torn",
            vec!["a".into()],
            vec!["n".into()],
            vec!["n".into()],
        );
        assert!(matches!(result, Err(CircuitError::GateAbsent { .. })));
    }

    #[test]
    fn test_rename_updates_block() {
        let mut circuit = sample();
        circuit
            .make_block_from_slice(
                "inner",
                vec!["a".into(), "b".into()],
                vec!["m".into(), "n".into()],
                vec!["n".into()],
            )
            .unwrap();
        circuit.rename_gate("n", "inv").unwrap();
        let block = circuit.get_block("inner").unwrap();
        assert_eq!(block.outputs(), ["inv".to_string()]);
    }

    #[test]
    fn test_delete_block_keeps_gates() {
        let mut circuit = sample();
        circuit
            .make_block_from_slice("inner", vec!["a".into()], vec![], vec![])
            .unwrap();
        circuit.delete_block("inner").unwrap();
        assert!(circuit.get_block("inner").is_err());
        assert!(circuit.has_gate("a"));
        assert!(matches!(
            circuit.delete_block("inner"),
            Err(CircuitError::BlockAbsent { .. })
        ));
    }
}
