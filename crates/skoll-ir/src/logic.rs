//! Three-valued logic domain.

use serde::{Deserialize, Serialize};

/// Value carried by a wire during evaluation.
///
/// `Undefined` models an input that has not been assigned (or a value that
/// cannot be determined from the assigned inputs). Binary operators absorb
/// it only when a dominating operand fixes the result, e.g.
/// `AND(False, Undefined) = False` but `AND(True, Undefined) = Undefined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriValue {
    /// Logical false.
    False,
    /// Logical true.
    True,
    /// Not (yet) determined.
    Undefined,
}

impl TriValue {
    /// Convert to a plain boolean, if defined.
    #[inline]
    pub fn to_bool(self) -> Option<bool> {
        match self {
            TriValue::False => Some(false),
            TriValue::True => Some(true),
            TriValue::Undefined => None,
        }
    }

    /// Check whether the value is defined.
    #[inline]
    pub fn is_defined(self) -> bool {
        !matches!(self, TriValue::Undefined)
    }

    /// Three-valued negation.
    #[inline]
    pub fn not(self) -> TriValue {
        match self {
            TriValue::False => TriValue::True,
            TriValue::True => TriValue::False,
            TriValue::Undefined => TriValue::Undefined,
        }
    }
}

impl From<bool> for TriValue {
    #[inline]
    fn from(value: bool) -> Self {
        if value { TriValue::True } else { TriValue::False }
    }
}
