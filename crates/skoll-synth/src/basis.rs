//! Binary operator tables and synthesis bases.

use skoll_ir::GateType;

use crate::error::{SynthError, SynthResult};

/// One of the sixteen binary truth tables a synthesized gate may compute.
///
/// The synthesizer reasons about raw tables; the position-dependent unary
/// behaviors appear as the `Not2`/`Iff2` tables (reading the second
/// operand). Decoding canonicalizes back to [`GateType`]s by arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `0000` — constant false.
    Zero,
    /// `1111` — constant true.
    One,
    /// `1100` — negation of the first operand.
    Not,
    /// `0011` — first operand.
    Iff,
    /// `1010` — negation of the second operand.
    Not2,
    /// `0101` — second operand.
    Iff2,
    /// `0111` — disjunction.
    Or,
    /// `1000` — negated disjunction.
    Nor,
    /// `0001` — conjunction.
    And,
    /// `1110` — negated conjunction.
    Nand,
    /// `0110` — exclusive or.
    Xor,
    /// `1001` — negated exclusive or.
    Nxor,
    /// `0010` — strictly greater.
    Greater,
    /// `0100` — strictly less.
    Less,
    /// `1011` — greater or equal.
    GreaterOrEqual,
    /// `1101` — less or equal.
    LessOrEqual,
}

impl Operation {
    /// All sixteen tables.
    pub const ALL: [Operation; 16] = [
        Operation::Zero,
        Operation::One,
        Operation::Not2,
        Operation::Iff2,
        Operation::Iff,
        Operation::Not,
        Operation::And,
        Operation::Or,
        Operation::Nand,
        Operation::Nor,
        Operation::Greater,
        Operation::Less,
        Operation::GreaterOrEqual,
        Operation::LessOrEqual,
        Operation::Xor,
        Operation::Nxor,
    ];

    /// The four-bit table, indexed by `2*p + q`.
    pub fn tt(self) -> [bool; 4] {
        let bits: [u8; 4] = match self {
            Operation::Zero => [0, 0, 0, 0],
            Operation::One => [1, 1, 1, 1],
            Operation::Not => [1, 1, 0, 0],
            Operation::Iff => [0, 0, 1, 1],
            Operation::Not2 => [1, 0, 1, 0],
            Operation::Iff2 => [0, 1, 0, 1],
            Operation::Or => [0, 1, 1, 1],
            Operation::Nor => [1, 0, 0, 0],
            Operation::And => [0, 0, 0, 1],
            Operation::Nand => [1, 1, 1, 0],
            Operation::Xor => [0, 1, 1, 0],
            Operation::Nxor => [1, 0, 0, 1],
            Operation::Greater => [0, 0, 1, 0],
            Operation::Less => [0, 1, 0, 0],
            Operation::GreaterOrEqual => [1, 0, 1, 1],
            Operation::LessOrEqual => [1, 1, 0, 1],
        };
        [bits[0] == 1, bits[1] == 1, bits[2] == 1, bits[3] == 1]
    }

    /// The operation computing a given table.
    pub fn from_tt(tt: [bool; 4]) -> Operation {
        Operation::ALL
            .into_iter()
            .find(|op| op.tt() == tt)
            .expect("all sixteen tables are covered")
    }

    /// The canonical table for a gate type, when it has one.
    ///
    /// The overlapping types collapse onto the table they compute:
    /// `NOT`/`LNOT` onto `1100`, `RNOT` onto `1010`, and likewise for the
    /// identities.
    pub fn from_gate_type(gate_type: GateType) -> SynthResult<Operation> {
        match gate_type.tt4() {
            Some(tt) => Ok(Operation::from_tt(tt)),
            None => Err(SynthError::BadBasis {
                name: gate_type.name(),
            }),
        }
    }
}

/// The set of operations the synthesizer may assign to a gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basis {
    operations: Vec<Operation>,
}

impl Basis {
    /// And-inverter style basis: negation plus the eight and/or-like tables.
    pub fn aig() -> Self {
        Self {
            operations: vec![
                Operation::Not,
                Operation::And,
                Operation::Or,
                Operation::Nand,
                Operation::Nor,
                Operation::Greater,
                Operation::Less,
                Operation::GreaterOrEqual,
                Operation::LessOrEqual,
            ],
        }
    }

    /// [`Basis::aig`] extended with XOR and NXOR.
    pub fn xaig() -> Self {
        let mut basis = Self::aig();
        basis.operations.push(Operation::Xor);
        basis.operations.push(Operation::Nxor);
        basis
    }

    /// All sixteen tables.
    pub fn full() -> Self {
        Self {
            operations: Operation::ALL.to_vec(),
        }
    }

    /// A basis from explicit gate types.
    ///
    /// Fails with [`SynthError::BadBasis`] on types without a two-operand
    /// table (i.e. `INPUT`).
    pub fn custom(gate_types: &[GateType]) -> SynthResult<Self> {
        let mut operations = Vec::with_capacity(gate_types.len());
        for &gate_type in gate_types {
            let operation = Operation::from_gate_type(gate_type)?;
            if !operations.contains(&operation) {
                operations.push(operation);
            }
        }
        Ok(Self { operations })
    }

    /// The allowed operations.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Whether the basis admits an operation.
    pub fn contains(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }

    /// The operations excluded by this basis.
    pub fn forbidden(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| !self.contains(*op))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for op in Operation::ALL {
            assert!(seen.insert(op.tt()), "{op:?} table repeated");
        }
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn test_from_tt_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_tt(op.tt()), op);
        }
    }

    #[test]
    fn test_gate_type_collapse() {
        assert_eq!(
            Operation::from_gate_type(GateType::Not).unwrap(),
            Operation::Not
        );
        assert_eq!(
            Operation::from_gate_type(GateType::LNot).unwrap(),
            Operation::Not
        );
        assert_eq!(
            Operation::from_gate_type(GateType::RNot).unwrap(),
            Operation::Not2
        );
        assert!(Operation::from_gate_type(GateType::Input).is_err());
    }

    #[test]
    fn test_basis_presets() {
        assert_eq!(Basis::aig().operations().len(), 9);
        assert_eq!(Basis::xaig().operations().len(), 11);
        assert_eq!(Basis::full().operations().len(), 16);
        assert!(Basis::full().forbidden().is_empty());
        assert!(!Basis::aig().contains(Operation::Xor));
        assert_eq!(Basis::xaig().forbidden().len(), 5);
    }

    #[test]
    fn test_custom_basis_dedups_overlap() {
        let basis = Basis::custom(&[GateType::Not, GateType::LNot, GateType::Or]).unwrap();
        assert_eq!(basis.operations().len(), 2);
    }
}
