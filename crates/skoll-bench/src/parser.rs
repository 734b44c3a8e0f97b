//! `.bench` text to [`Circuit`] conversion.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use skoll_ir::{Circuit, GateType, Label};

use crate::error::{BenchError, BenchResult};
use crate::lexer::{Token, tokenize};

/// One parsed assignment statement.
struct Statement {
    line: usize,
    label: Label,
    operator: String,
    args: Vec<Label>,
}

/// Parse `.bench` text into a circuit.
///
/// The format is line-oriented: `INPUT(l)`, `OUTPUT(l)` and
/// `l = OP(a[, b, ...])` declarations, `#` comments, case-insensitive
/// operator names. Definitions may reference gates declared later in the
/// file. N-ary symmetric operators are folded into binary chains with
/// generated intermediate labels.
pub fn parse_bench(text: &str) -> BenchResult<Circuit> {
    let mut inputs: Vec<Label> = Vec::new();
    let mut outputs: Vec<Label> = Vec::new();
    let mut statements: Vec<Statement> = Vec::new();
    let mut defined: FxHashSet<Label> = FxHashSet::default();

    for (number, raw) in text.lines().enumerate() {
        let line = number + 1;
        let Some(tokens) = tokenize(raw) else {
            return Err(BenchError::MalformedLine {
                line,
                text: raw.trim().to_string(),
            });
        };
        if tokens.is_empty() {
            continue;
        }
        debug!(line, text = raw.trim(), "parsing bench line");
        match classify(&tokens) {
            Some(LineKind::Input(label)) => {
                if !defined.insert(label.clone()) {
                    return Err(BenchError::DuplicateDefinition { line, label });
                }
                inputs.push(label);
            }
            Some(LineKind::Output(label)) => outputs.push(label),
            Some(LineKind::Assignment { label, operator, args }) => {
                if !defined.insert(label.clone()) {
                    return Err(BenchError::DuplicateDefinition { line, label });
                }
                statements.push(Statement {
                    line,
                    label,
                    operator,
                    args,
                });
            }
            None => {
                return Err(BenchError::MalformedLine {
                    line,
                    text: raw.trim().to_string(),
                });
            }
        }
    }

    build_circuit(inputs, outputs, statements)
}

enum LineKind {
    Input(Label),
    Output(Label),
    Assignment {
        label: Label,
        operator: String,
        args: Vec<Label>,
    },
}

fn classify(tokens: &[Token]) -> Option<LineKind> {
    match tokens {
        // INPUT(l) / OUTPUT(l)
        [Token::Ident(head), Token::LParen, Token::Ident(label), Token::RParen] => {
            match head.to_uppercase().as_str() {
                "INPUT" => Some(LineKind::Input(label.clone())),
                "OUTPUT" => Some(LineKind::Output(label.clone())),
                _ => None,
            }
        }
        // l = OP(a, b, ...)
        [
            Token::Ident(label),
            Token::Equals,
            Token::Ident(operator),
            Token::LParen,
            rest @ ..,
            Token::RParen,
        ] => {
            let mut args = Vec::new();
            let mut expect_ident = true;
            for token in rest {
                match (expect_ident, token) {
                    (true, Token::Ident(arg)) => {
                        args.push(arg.clone());
                        expect_ident = false;
                    }
                    (false, Token::Comma) => expect_ident = true,
                    _ => return None,
                }
            }
            if args.is_empty() || expect_ident {
                return None;
            }
            Some(LineKind::Assignment {
                label: label.clone(),
                operator: operator.clone(),
                args,
            })
        }
        _ => None,
    }
}

/// The binary gate type for an operator name, together with the base
/// operator used when folding an n-ary application.
fn resolve_operator(name: &str) -> Option<(GateType, GateType)> {
    let gate_type = match name.to_uppercase().as_str() {
        "NOT" => GateType::Not,
        "IFF" | "BUFF" => GateType::Iff,
        "AND" => GateType::And,
        "OR" => GateType::Or,
        "NAND" => GateType::Nand,
        "NOR" => GateType::Nor,
        "XOR" => GateType::Xor,
        "NXOR" | "XNOR" => GateType::Nxor,
        _ => return None,
    };
    let fold_base = match gate_type {
        GateType::Nand => GateType::And,
        GateType::Nor => GateType::Or,
        GateType::Nxor => GateType::Xor,
        other => other,
    };
    Some((gate_type, fold_base))
}

fn build_circuit(
    inputs: Vec<Label>,
    outputs: Vec<Label>,
    statements: Vec<Statement>,
) -> BenchResult<Circuit> {
    let mut circuit = Circuit::new();
    for input in &inputs {
        circuit.add_input(input.clone())?;
    }

    let declared: FxHashSet<Label> = inputs
        .iter()
        .cloned()
        .chain(statements.iter().map(|s| s.label.clone()))
        .collect();

    // Definitions may appear in any order; insert them Kahn-style, waiting
    // until all operands of a statement are present.
    let mut pending: FxHashMap<Label, Statement> = statements
        .into_iter()
        .map(|s| (s.label.clone(), s))
        .collect();
    let mut progress = true;
    while progress && !pending.is_empty() {
        progress = false;
        let ready: Vec<Label> = pending
            .values()
            .filter(|s| s.args.iter().all(|a| circuit.has_gate(a)))
            .map(|s| s.label.clone())
            .collect();
        for label in ready {
            let statement = pending.remove(&label).expect("selected above");
            emit_statement(&mut circuit, &statement)?;
            progress = true;
        }
    }
    if !pending.is_empty() {
        // Either an operand never defined or a definition cycle.
        for statement in pending.values() {
            for arg in &statement.args {
                if !declared.contains(arg) {
                    return Err(BenchError::UndefinedGate { label: arg.clone() });
                }
            }
        }
        let stuck = pending.into_values().next().expect("non-empty");
        return Err(BenchError::CyclicDefinition {
            label: stuck.label,
        });
    }

    for output in outputs {
        if !circuit.has_gate(&output) {
            return Err(BenchError::UndefinedGate { label: output });
        }
        circuit.mark_as_output(output)?;
    }
    Ok(circuit)
}

fn emit_statement(circuit: &mut Circuit, statement: &Statement) -> BenchResult<()> {
    let Some((gate_type, fold_base)) = resolve_operator(&statement.operator) else {
        return Err(BenchError::UnknownOperator {
            line: statement.line,
            name: statement.operator.clone(),
        });
    };
    let args = &statement.args;
    match gate_type.arity() {
        1 => {
            if args.len() != 1 {
                return Err(BenchError::WrongArity {
                    line: statement.line,
                    name: statement.operator.clone(),
                    got: args.len(),
                });
            }
            circuit.emplace_gate(statement.label.clone(), gate_type, &[args[0].as_str()])?;
        }
        _ => {
            if args.len() < 2 {
                return Err(BenchError::WrongArity {
                    line: statement.line,
                    name: statement.operator.clone(),
                    got: args.len(),
                });
            }
            // Fold left with the base operator; the declared operator is
            // applied at the last step, so NAND(a, b, c) reads as
            // NAND(AND(a, b), c).
            let mut acc = args[0].clone();
            for (i, arg) in args[1..args.len() - 1].iter().enumerate() {
                let folded = format!("{}$fold{}", statement.label, i);
                circuit.emplace_gate(
                    folded.clone(),
                    fold_base,
                    &[acc.as_str(), arg.as_str()],
                )?;
                acc = folded;
            }
            circuit.emplace_gate(
                statement.label.clone(),
                gate_type,
                &[acc.as_str(), args[args.len() - 1].as_str()],
            )?;
        }
    }
    Ok(())
}
