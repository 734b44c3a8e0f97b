//! Gate catalog and the [`Gate`] triple.

use serde::{Deserialize, Serialize};

use crate::logic::TriValue;

/// A gate identifier, unique within one [`crate::Circuit`].
pub type Label = String;

/// Closed set of gate operators.
///
/// Besides the inputs, the unary operators and the ten proper binary tables,
/// the catalog carries the argument-position variants `LNot`/`RNot` and
/// `LIff`/`RIff`: two-operand gates that semantically depend on only one of
/// their operands. Their four-bit tables coincide with the unary forms, but
/// the types stay distinct because they read different operand positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateType {
    /// Circuit input; no operands.
    Input,
    /// Negation of the only operand.
    Not,
    /// Identity of the only operand (also known as BUFF).
    Iff,
    /// Negation of the first of two operands.
    LNot,
    /// Negation of the second of two operands.
    RNot,
    /// Identity of the first of two operands.
    LIff,
    /// Identity of the second of two operands.
    RIff,
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
    /// Negated conjunction.
    Nand,
    /// Negated disjunction.
    Nor,
    /// Exclusive or.
    Xor,
    /// Negated exclusive or.
    Nxor,
    /// `a >= b`.
    Geq,
    /// `a > b`.
    Gt,
    /// `a <= b`.
    Leq,
    /// `a < b`.
    Lt,
    /// Constant true; no operands.
    AlwaysTrue,
    /// Constant false; no operands.
    AlwaysFalse,
}

impl GateType {
    /// All operator types, inputs excluded.
    pub const OPERATORS: [GateType; 18] = [
        GateType::Not,
        GateType::Iff,
        GateType::LNot,
        GateType::RNot,
        GateType::LIff,
        GateType::RIff,
        GateType::And,
        GateType::Or,
        GateType::Nand,
        GateType::Nor,
        GateType::Xor,
        GateType::Nxor,
        GateType::Geq,
        GateType::Gt,
        GateType::Leq,
        GateType::Lt,
        GateType::AlwaysTrue,
        GateType::AlwaysFalse,
    ];

    /// Number of operands the gate takes.
    #[inline]
    pub fn arity(self) -> usize {
        match self {
            GateType::Input | GateType::AlwaysTrue | GateType::AlwaysFalse => 0,
            GateType::Not | GateType::Iff => 1,
            _ => 2,
        }
    }

    /// Whether swapping the two operands never changes the result.
    ///
    /// Nullary and unary gates are trivially symmetric.
    #[inline]
    pub fn is_symmetric(self) -> bool {
        match self.tt4() {
            Some(tt) => tt[0b01] == tt[0b10],
            None => true,
        }
    }

    /// The four-bit truth table, indexed by `2*a + b`.
    ///
    /// This is the canonical identity of an operator up to argument-position
    /// handling. `None` for [`GateType::Input`].
    pub fn tt4(self) -> Option<[bool; 4]> {
        let bits: [u8; 4] = match self {
            GateType::Input => return None,
            GateType::Not | GateType::LNot => [1, 1, 0, 0],
            GateType::RNot => [1, 0, 1, 0],
            GateType::Iff | GateType::LIff => [0, 0, 1, 1],
            GateType::RIff => [0, 1, 0, 1],
            GateType::And => [0, 0, 0, 1],
            GateType::Or => [0, 1, 1, 1],
            GateType::Nand => [1, 1, 1, 0],
            GateType::Nor => [1, 0, 0, 0],
            GateType::Xor => [0, 1, 1, 0],
            GateType::Nxor => [1, 0, 0, 1],
            GateType::Geq => [1, 0, 1, 1],
            GateType::Gt => [0, 0, 1, 0],
            GateType::Leq => [1, 1, 0, 1],
            GateType::Lt => [0, 1, 0, 0],
            GateType::AlwaysTrue => [1, 1, 1, 1],
            GateType::AlwaysFalse => [0, 0, 0, 0],
        };
        Some([bits[0] == 1, bits[1] == 1, bits[2] == 1, bits[3] == 1])
    }

    /// Upper-case operator name, as used by the `.bench` format.
    pub fn name(self) -> &'static str {
        match self {
            GateType::Input => "INPUT",
            GateType::Not => "NOT",
            GateType::Iff => "IFF",
            GateType::LNot => "LNOT",
            GateType::RNot => "RNOT",
            GateType::LIff => "LIFF",
            GateType::RIff => "RIFF",
            GateType::And => "AND",
            GateType::Or => "OR",
            GateType::Nand => "NAND",
            GateType::Nor => "NOR",
            GateType::Xor => "XOR",
            GateType::Nxor => "NXOR",
            GateType::Geq => "GEQ",
            GateType::Gt => "GT",
            GateType::Leq => "LEQ",
            GateType::Lt => "LT",
            GateType::AlwaysTrue => "ALWAYS_TRUE",
            GateType::AlwaysFalse => "ALWAYS_FALSE",
        }
    }

    /// Evaluate the gate over three-valued operands.
    ///
    /// An `Undefined` operand propagates to the result exactly when flipping
    /// it could change the two-valued outcome; otherwise the dominating
    /// operands fix the result.
    ///
    /// # Panics
    ///
    /// Panics if `args.len()` does not match [`GateType::arity`], or when
    /// called on [`GateType::Input`] (inputs are assigned, not computed).
    pub fn eval(self, args: &[TriValue]) -> TriValue {
        assert_eq!(
            args.len(),
            self.arity(),
            "operator {} expects {} operands, got {}",
            self.name(),
            self.arity(),
            args.len()
        );
        match self {
            GateType::Input => panic!("inputs are assigned, not evaluated"),
            GateType::AlwaysTrue => TriValue::True,
            GateType::AlwaysFalse => TriValue::False,
            GateType::Not => args[0].not(),
            GateType::Iff => args[0],
            _ => {
                let tt = self.tt4().expect("binary operators carry a table");
                eval_tt4(tt, args[0], args[1])
            }
        }
    }
}

/// Evaluate a four-bit table over possibly-undefined operands.
///
/// Enumerates the boolean resolutions of every `Undefined` operand; the
/// result is defined iff all resolutions agree.
fn eval_tt4(tt: [bool; 4], a: TriValue, b: TriValue) -> TriValue {
    let choices = |v: TriValue| -> &'static [bool] {
        match v {
            TriValue::False => &[false],
            TriValue::True => &[true],
            TriValue::Undefined => &[false, true],
        }
    };
    let mut result: Option<bool> = None;
    for &va in choices(a) {
        for &vb in choices(b) {
            let out = tt[((va as usize) << 1) | vb as usize];
            match result {
                None => result = Some(out),
                Some(prev) if prev != out => return TriValue::Undefined,
                Some(_) => {}
            }
        }
    }
    TriValue::from(result.expect("at least one resolution"))
}

/// One gate of a circuit: an immutable `(label, type, operands)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    label: Label,
    gate_type: GateType,
    operands: Vec<Label>,
}

impl Gate {
    /// Create a gate.
    ///
    /// # Panics
    ///
    /// Panics if the number of operands does not match the operator arity.
    pub fn new(
        label: impl Into<Label>,
        gate_type: GateType,
        operands: impl IntoIterator<Item = impl Into<Label>>,
    ) -> Self {
        let operands: Vec<Label> = operands.into_iter().map(Into::into).collect();
        assert_eq!(
            operands.len(),
            gate_type.arity(),
            "operator {} expects {} operands, got {}",
            gate_type.name(),
            gate_type.arity(),
            operands.len()
        );
        Self {
            label: label.into(),
            gate_type,
            operands,
        }
    }

    /// Create an input gate.
    pub fn input(label: impl Into<Label>) -> Self {
        Self {
            label: label.into(),
            gate_type: GateType::Input,
            operands: vec![],
        }
    }

    /// The gate's label.
    #[inline]
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// The gate's operator type.
    #[inline]
    pub fn gate_type(&self) -> GateType {
        self.gate_type
    }

    /// The gate's operands, in order.
    #[inline]
    pub fn operands(&self) -> &[Label] {
        &self.operands
    }

    /// Whether this is an input gate.
    #[inline]
    pub fn is_input(&self) -> bool {
        self.gate_type == GateType::Input
    }

    pub(crate) fn with_label(&self, label: Label) -> Gate {
        Gate {
            label,
            gate_type: self.gate_type,
            operands: self.operands.clone(),
        }
    }

    pub(crate) fn with_operands(&self, operands: Vec<Label>) -> Gate {
        assert_eq!(operands.len(), self.gate_type.arity());
        Gate {
            label: self.label.clone(),
            gate_type: self.gate_type,
            operands,
        }
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_input() {
            write!(f, "INPUT({})", self.label)
        } else {
            write!(
                f,
                "{} = {}({})",
                self.label,
                self.gate_type.name(),
                self.operands.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TriValue::{False, True, Undefined};

    #[test]
    fn test_arity() {
        assert_eq!(GateType::Input.arity(), 0);
        assert_eq!(GateType::AlwaysTrue.arity(), 0);
        assert_eq!(GateType::Not.arity(), 1);
        assert_eq!(GateType::Iff.arity(), 1);
        assert_eq!(GateType::LNot.arity(), 2);
        assert_eq!(GateType::And.arity(), 2);
    }

    #[test]
    fn test_symmetry() {
        assert!(GateType::And.is_symmetric());
        assert!(GateType::Xor.is_symmetric());
        assert!(!GateType::Gt.is_symmetric());
        assert!(!GateType::Leq.is_symmetric());
        assert!(!GateType::LNot.is_symmetric());
    }

    #[test]
    fn test_tt4_identity() {
        // LNOT and NOT share a table but remain distinct types.
        assert_eq!(GateType::Not.tt4(), GateType::LNot.tt4());
        assert_ne!(GateType::Not, GateType::LNot);
        assert_eq!(GateType::Xor.tt4(), Some([false, true, true, false]));
        assert_eq!(GateType::Gt.tt4(), Some([false, false, true, false]));
    }

    #[test]
    fn test_tables_match_two_valued_eval() {
        for op in GateType::OPERATORS {
            if op.arity() != 2 {
                continue;
            }
            let tt = op.tt4().unwrap();
            for (i, &expect) in tt.iter().enumerate() {
                let a = TriValue::from(i & 2 != 0);
                let b = TriValue::from(i & 1 != 0);
                assert_eq!(op.eval(&[a, b]), TriValue::from(expect), "{}", op.name());
            }
        }
    }

    #[test]
    fn test_undefined_domination() {
        assert_eq!(GateType::And.eval(&[False, Undefined]), False);
        assert_eq!(GateType::And.eval(&[True, Undefined]), Undefined);
        assert_eq!(GateType::Or.eval(&[True, Undefined]), True);
        assert_eq!(GateType::Or.eval(&[Undefined, False]), Undefined);
        assert_eq!(GateType::Xor.eval(&[Undefined, True]), Undefined);
        assert_eq!(GateType::LNot.eval(&[False, Undefined]), True);
        assert_eq!(GateType::RIff.eval(&[Undefined, True]), True);
        assert_eq!(GateType::AlwaysTrue.eval(&[]), True);
    }

    #[test]
    fn test_gate_display() {
        let g = Gate::new("c", GateType::And, ["a", "b"]);
        assert_eq!(g.to_string(), "c = AND(a, b)");
        assert_eq!(Gate::input("a").to_string(), "INPUT(a)");
    }

    #[test]
    #[should_panic(expected = "expects 2 operands")]
    fn test_gate_arity_mismatch_panics() {
        let _ = Gate::new("c", GateType::And, ["a"]);
    }
}
