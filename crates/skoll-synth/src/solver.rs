//! SAT solver abstraction and the kissat backend.
//!
//! The synthesizer speaks integer CNF; this module converts to solver
//! literals at the boundary and implements cooperative time limits: a timer
//! thread raises the solver's interrupt flag, and the solver honors it at
//! its next decision point.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context as _;
use rustsat::solvers::{Interrupt, InterruptSolver, Solve, SolverResult};
use rustsat::types::{Lit, TernaryVal};
use tracing::debug;

use crate::cnf::Cnf;
use crate::error::{SynthError, SynthResult};

/// Flatten an FFI-boundary error chain into the typed solver failure.
fn solver_failure(error: anyhow::Error) -> SynthError {
    SynthError::Solver(format!("{error:#}"))
}

/// A satisfying assignment, indexed by the positive variable numbers of the
/// originating [`Cnf`].
#[derive(Debug, Clone)]
pub struct SatModel {
    values: Vec<bool>,
}

impl SatModel {
    /// Truth value of variable `var` (1-based). Variables the solver never
    /// saw default to false.
    pub fn is_true(&self, var: i32) -> bool {
        debug_assert!(var > 0);
        self.values.get((var - 1) as usize).copied().unwrap_or(false)
    }
}

/// Outcome of one solver invocation.
#[derive(Debug)]
pub enum SolverOutcome {
    /// Satisfiable, with a witness.
    Sat(SatModel),
    /// Proven unsatisfiable.
    Unsat,
    /// Interrupted by the time limit before deciding.
    Interrupted,
}

/// An external SAT solver.
pub trait SatSolver {
    /// Decide `cnf`, giving up once `time_limit` elapses.
    fn solve(&mut self, cnf: &Cnf, time_limit: Option<Duration>) -> SynthResult<SolverOutcome>;
}

/// The kissat backend.
#[derive(Debug, Default)]
pub struct KissatSolver;

impl KissatSolver {
    /// Create a solver backend.
    pub fn new() -> Self {
        Self
    }
}

fn to_lit(literal: i32) -> Lit {
    debug_assert!(literal != 0);
    if literal > 0 {
        Lit::positive((literal - 1) as u32)
    } else {
        Lit::negative((-literal - 1) as u32)
    }
}

impl SatSolver for KissatSolver {
    fn solve(&mut self, cnf: &Cnf, time_limit: Option<Duration>) -> SynthResult<SolverOutcome> {
        let mut solver = rustsat_kissat::Kissat::default();
        for clause in cnf.clauses() {
            let lits: rustsat::types::Clause = clause.iter().map(|&l| to_lit(l)).collect();
            solver
                .add_clause(lits)
                .context("loading clause into kissat")
                .map_err(solver_failure)?;
        }
        debug!(
            clauses = cnf.num_clauses(),
            vars = cnf.max_var(),
            limit = ?time_limit,
            "invoking kissat"
        );

        // The timer thread idles on a channel; if the solve finishes first it
        // is woken and exits without interrupting.
        let (done, timer) = match time_limit {
            Some(limit) => {
                let (tx, rx) = mpsc::channel::<()>();
                let interrupter = solver.interrupter();
                let handle = thread::spawn(move || {
                    if rx.recv_timeout(limit).is_err() {
                        interrupter.interrupt();
                    }
                });
                (Some(tx), Some(handle))
            }
            None => (None, None),
        };

        let result = solver
            .solve()
            .context("running kissat")
            .map_err(solver_failure);
        if let Some(done) = done {
            let _ = done.send(());
        }
        if let Some(handle) = timer {
            let _ = handle.join();
        }

        match result? {
            SolverResult::Unsat => Ok(SolverOutcome::Unsat),
            SolverResult::Interrupted => Ok(SolverOutcome::Interrupted),
            SolverResult::Sat => {
                let mut values = Vec::with_capacity(cnf.max_var() as usize);
                for var in 0..cnf.max_var() as u32 {
                    let value = solver
                        .lit_val(Lit::positive(var))
                        .context("reading kissat model value")
                        .map_err(solver_failure)?;
                    values.push(value == TernaryVal::True);
                }
                Ok(SolverOutcome::Sat(SatModel { values }))
            }
        }
    }
}
