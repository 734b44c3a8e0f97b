//! [`Circuit`] to `.bench` text conversion.

use std::fmt::Write as _;

use skoll_ir::{Circuit, Gate, GateType};

use crate::error::{BenchError, BenchResult};

/// Serialize a circuit as `.bench` text.
///
/// Gates are emitted in topological order. The format has no nullary gates,
/// so constants are rewritten over the first input: `ALWAYS_TRUE` becomes
/// `OR(x, NOT(x))` and `ALWAYS_FALSE` becomes `AND(x, NOT(x))`; a
/// constant-bearing circuit without inputs cannot be written. The
/// argument-position operators are emitted as their unary equivalents on the
/// operand they depend on.
pub fn write_bench(circuit: &Circuit) -> BenchResult<String> {
    let mut text = String::new();
    for input in circuit.inputs() {
        writeln!(text, "INPUT({input})").expect("string write");
    }

    // One shared inverted-first-input gate serves every constant.
    let mut inverter: Option<String> = None;
    let mut fresh = 0usize;

    for gate in circuit.top_sort() {
        match gate.gate_type() {
            GateType::Input => {}
            GateType::AlwaysTrue | GateType::AlwaysFalse => {
                let Some(first_input) = circuit.inputs().first() else {
                    return Err(BenchError::ConstantWithoutInputs {
                        label: gate.label().clone(),
                    });
                };
                let inv = match &inverter {
                    Some(label) => label.clone(),
                    None => {
                        let label = fresh_label(circuit, "const_inv", &mut fresh);
                        writeln!(text, "{label} = NOT({first_input})").expect("string write");
                        inverter = Some(label.clone());
                        label
                    }
                };
                let operator = if gate.gate_type() == GateType::AlwaysTrue {
                    "OR"
                } else {
                    "AND"
                };
                writeln!(
                    text,
                    "{} = {}({}, {})",
                    gate.label(),
                    operator,
                    first_input,
                    inv
                )
                .expect("string write");
            }
            _ => {
                writeln!(text, "{}", render_operator(gate)).expect("string write");
            }
        }
    }
    for output in circuit.outputs() {
        writeln!(text, "OUTPUT({output})").expect("string write");
    }
    Ok(text)
}

fn render_operator(gate: &Gate) -> String {
    let operands = gate.operands();
    match gate.gate_type() {
        // Position-dependent operators collapse to their effective operand.
        GateType::LNot => format!("{} = NOT({})", gate.label(), operands[0]),
        GateType::RNot => format!("{} = NOT({})", gate.label(), operands[1]),
        GateType::LIff => format!("{} = BUFF({})", gate.label(), operands[0]),
        GateType::RIff => format!("{} = BUFF({})", gate.label(), operands[1]),
        GateType::Iff => format!("{} = BUFF({})", gate.label(), operands[0]),
        other => format!(
            "{} = {}({})",
            gate.label(),
            other.name(),
            operands.join(", ")
        ),
    }
}

fn fresh_label(circuit: &Circuit, prefix: &str, counter: &mut usize) -> String {
    loop {
        let candidate = format!("{prefix}_{counter}");
        *counter += 1;
        if !circuit.has_gate(&candidate) {
            return candidate;
        }
    }
}
