//! Miter construction and SAT equivalence checking.

use std::time::Duration;

use tracing::debug;

use skoll_ir::{Circuit, GateType, Label};

use crate::error::{SynthError, SynthResult};
use crate::solver::{SatSolver, SolverOutcome};
use crate::tseytin::TseytinTransform;

/// Build the miter of two circuits: a single-output circuit that is
/// satisfiable exactly when the operands disagree on some input.
///
/// Both circuits are grafted as blocks over a shared set of fresh inputs;
/// matching output ports are XOR-ed and the disagreement bits are OR-ed
/// into one output.
pub fn build_miter(left: &Circuit, right: &Circuit) -> SynthResult<Circuit> {
    if left.input_size() != right.input_size() || left.output_size() != right.output_size() {
        return Err(SynthError::MiterShapeMismatch {
            left_inputs: left.input_size(),
            left_outputs: left.output_size(),
            right_inputs: right.input_size(),
            right_outputs: right.output_size(),
        });
    }

    let mut miter = Circuit::new();
    miter.add_circuit(left, "left")?;
    let shared_inputs: Vec<Label> = miter.get_block("left")?.inputs().to_vec();
    miter.connect_circuit(right, &shared_inputs, right.inputs(), "right")?;

    let left_outputs = miter.get_block("left")?.outputs().to_vec();
    let right_outputs = miter.get_block("right")?.outputs().to_vec();

    let mut disagreements: Vec<Label> = Vec::with_capacity(left_outputs.len());
    for (i, (l, r)) in left_outputs.iter().zip(&right_outputs).enumerate() {
        let label = format!("diff_{i}");
        miter.emplace_gate(label.clone(), GateType::Xor, &[l.as_str(), r.as_str()])?;
        disagreements.push(label);
    }

    let spine = match disagreements.as_slice() {
        [] => {
            // No outputs to compare: the miter is constantly false.
            miter.emplace_gate("any_diff", GateType::AlwaysFalse, &[])?;
            "any_diff".to_string()
        }
        [single] => single.clone(),
        [first, rest @ ..] => {
            let mut acc = first.clone();
            for (i, next) in rest.iter().enumerate() {
                let label = format!("any_diff_{i}");
                miter.emplace_gate(label.clone(), GateType::Or, &[acc.as_str(), next.as_str()])?;
                acc = label;
            }
            acc
        }
    };
    miter.set_outputs(vec![spine])?;
    Ok(miter)
}

/// Whether some input makes every output port of `circuit` true.
pub fn is_satisfiable(
    circuit: &Circuit,
    solver: &mut dyn SatSolver,
    time_limit: Option<Duration>,
) -> SynthResult<bool> {
    let mut transform = TseytinTransform::new(circuit);
    transform.assert_outputs_true(circuit);
    match solver.solve(transform.cnf(), time_limit)? {
        SolverOutcome::Sat(_) => Ok(true),
        SolverOutcome::Unsat => Ok(false),
        SolverOutcome::Interrupted => Err(SynthError::SolverTimedOut),
    }
}

/// Check two circuits for functional equivalence via their miter.
pub fn are_equivalent(
    left: &Circuit,
    right: &Circuit,
    solver: &mut dyn SatSolver,
    time_limit: Option<Duration>,
) -> SynthResult<bool> {
    let miter = build_miter(left, right)?;
    debug!(gates = miter.num_gates(), "checking equivalence via miter");
    Ok(!is_satisfiable(&miter, solver, time_limit)?)
}
