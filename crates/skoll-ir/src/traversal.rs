//! Lazy traversal engine: Kahn top-sort, DFS with hooks, BFS.
//!
//! All traversals are pull-based iterators over an immutable borrow of the
//! circuit; consumers control when work happens, and the borrow checker
//! guarantees hooks cannot mutate the circuit mid-walk.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use rustc_hash::FxHashMap;

use crate::circuit::Circuit;
use crate::gate::{Gate, Label};

/// Visit state of a gate during DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraverseState {
    /// Not reached yet.
    Unseen,
    /// On the DFS stack.
    Entered,
    /// Fully processed.
    Exited,
}

/// Which links a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraverseDirection {
    /// Follow operand links (towards the inputs).
    Operands,
    /// Follow user links (towards the outputs).
    Users,
}

struct GateIndex<'c> {
    labels: Vec<&'c Label>,
    positions: FxHashMap<&'c str, usize>,
}

impl<'c> GateIndex<'c> {
    fn new(circuit: &'c Circuit) -> Self {
        let labels: Vec<&'c Label> = circuit.order.iter().collect();
        let positions = labels
            .iter()
            .enumerate()
            .map(|(i, &l)| (l.as_str(), i))
            .collect();
        Self { labels, positions }
    }
}

/// Lazy Kahn-style topological order over a circuit.
///
/// Ties are broken by gate insertion order, which makes the sequence
/// deterministic. In the forward direction inputs come first; in the
/// inverse direction gates precede their operands.
pub struct TopSort<'c> {
    circuit: &'c Circuit,
    index: GateIndex<'c>,
    remaining: Vec<usize>,
    ready: BinaryHeap<Reverse<usize>>,
    inverse: bool,
}

impl<'c> TopSort<'c> {
    fn new(circuit: &'c Circuit, inverse: bool) -> Self {
        let index = GateIndex::new(circuit);
        let mut remaining = vec![0usize; index.labels.len()];
        for (i, label) in index.labels.iter().enumerate() {
            remaining[i] = if inverse {
                circuit.users[*label].len()
            } else {
                circuit.gates[*label].operands().len()
            };
        }
        let ready = remaining
            .iter()
            .enumerate()
            .filter(|&(_, &r)| r == 0)
            .map(|(i, _)| Reverse(i))
            .collect();
        Self {
            circuit,
            index,
            remaining,
            ready,
            inverse,
        }
    }
}

impl<'c> Iterator for TopSort<'c> {
    type Item = &'c Gate;

    fn next(&mut self) -> Option<Self::Item> {
        let Reverse(position) = self.ready.pop()?;
        let label = self.index.labels[position];
        let gate = &self.circuit.gates[label];
        let successors: &[Label] = if self.inverse {
            gate.operands()
        } else {
            &self.circuit.users[label]
        };
        for successor in successors {
            let s = self.index.positions[successor.as_str()];
            self.remaining[s] -= 1;
            if self.remaining[s] == 0 {
                self.ready.push(Reverse(s));
            }
        }
        Some(gate)
    }
}

/// Hook set for [`Circuit::dfs`].
///
/// Hooks receive shared borrows only; the traversal holds the circuit
/// borrowed for its whole lifetime, so no hook can mutate it.
#[derive(Default)]
pub struct DfsHooks<'h> {
    on_enter: Option<Box<dyn FnMut(&Gate) + 'h>>,
    on_exit: Option<Box<dyn FnMut(&Gate) + 'h>>,
    on_discover: Option<Box<dyn FnMut(&Gate, TraverseState) + 'h>>,
    on_unvisited: Option<Box<dyn FnMut(&Gate) + 'h>>,
}

impl<'h> DfsHooks<'h> {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when a gate is first entered.
    #[must_use]
    pub fn on_enter(mut self, hook: impl FnMut(&Gate) + 'h) -> Self {
        self.on_enter = Some(Box::new(hook));
        self
    }

    /// Called when a gate's whole subtree has been processed.
    #[must_use]
    pub fn on_exit(mut self, hook: impl FnMut(&Gate) + 'h) -> Self {
        self.on_exit = Some(Box::new(hook));
        self
    }

    /// Called when traversal re-discovers an already seen gate, with its
    /// current state. Seeing [`TraverseState::Entered`] here means a back
    /// edge, i.e. a directed cycle.
    #[must_use]
    pub fn on_discover(mut self, hook: impl FnMut(&Gate, TraverseState) + 'h) -> Self {
        self.on_discover = Some(Box::new(hook));
        self
    }

    /// Called once for every gate the start set never reached, right before
    /// it is traversed as an additional start.
    #[must_use]
    pub fn on_unvisited(mut self, hook: impl FnMut(&Gate) + 'h) -> Self {
        self.on_unvisited = Some(Box::new(hook));
        self
    }
}

/// Iterative depth-first traversal yielding gates in entry order.
pub struct Dfs<'c, 'h> {
    circuit: &'c Circuit,
    index: GateIndex<'c>,
    hooks: DfsHooks<'h>,
    state: Vec<TraverseState>,
    stack: Vec<(usize, usize)>,
    starts: VecDeque<usize>,
    direction: TraverseDirection,
    topsort_unvisited: bool,
    unvisited_queued: bool,
}

impl<'c, 'h> Dfs<'c, 'h> {
    fn new(
        circuit: &'c Circuit,
        starts: impl IntoIterator<Item = &'c Label>,
        direction: TraverseDirection,
        topsort_unvisited: bool,
        hooks: DfsHooks<'h>,
    ) -> Self {
        let index = GateIndex::new(circuit);
        let starts = starts
            .into_iter()
            .map(|label| index.positions[label.as_str()])
            .collect();
        let state = vec![TraverseState::Unseen; index.labels.len()];
        Self {
            circuit,
            index,
            hooks,
            state,
            stack: Vec::new(),
            starts,
            direction,
            topsort_unvisited,
            unvisited_queued: false,
        }
    }

    fn neighbors(&self, position: usize) -> &'c [Label] {
        let label = self.index.labels[position];
        match self.direction {
            TraverseDirection::Operands => self.circuit.gates[label].operands(),
            TraverseDirection::Users => &self.circuit.users[label],
        }
    }

    fn gate_at(&self, position: usize) -> &'c Gate {
        &self.circuit.gates[self.index.labels[position]]
    }

    fn enter(&mut self, position: usize) -> &'c Gate {
        self.state[position] = TraverseState::Entered;
        let gate = self.gate_at(position);
        if let Some(hook) = self.hooks.on_enter.as_mut() {
            hook(gate);
        }
        self.stack.push((position, 0));
        gate
    }

    /// Queue every still-unseen gate as an extra start, in topological or
    /// insertion order, announcing each through the unvisited hook.
    fn queue_unvisited(&mut self) {
        self.unvisited_queued = true;
        let pending: Vec<usize> = if self.topsort_unvisited {
            self.circuit
                .top_sort()
                .map(|gate| self.index.positions[gate.label().as_str()])
                .filter(|&p| self.state[p] == TraverseState::Unseen)
                .collect()
        } else {
            (0..self.index.labels.len())
                .filter(|&p| self.state[p] == TraverseState::Unseen)
                .collect()
        };
        for position in pending {
            let gate = self.gate_at(position);
            if let Some(hook) = self.hooks.on_unvisited.as_mut() {
                hook(gate);
            }
            self.starts.push_back(position);
        }
    }
}

impl<'c, 'h> Iterator for Dfs<'c, 'h> {
    type Item = &'c Gate;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((position, cursor)) = self.stack.last().copied() {
                let neighbors = self.neighbors(position);
                if cursor < neighbors.len() {
                    self.stack.last_mut().expect("non-empty").1 += 1;
                    let n = self.index.positions[neighbors[cursor].as_str()];
                    match self.state[n] {
                        TraverseState::Unseen => return Some(self.enter(n)),
                        seen => {
                            if let Some(hook) = self.hooks.on_discover.as_mut() {
                                let gate = &self.circuit.gates[self.index.labels[n]];
                                hook(gate, seen);
                            }
                        }
                    }
                } else {
                    self.state[position] = TraverseState::Exited;
                    let gate = self.gate_at(position);
                    if let Some(hook) = self.hooks.on_exit.as_mut() {
                        hook(gate);
                    }
                    self.stack.pop();
                }
            } else if let Some(start) = self.starts.pop_front() {
                if self.state[start] == TraverseState::Unseen {
                    return Some(self.enter(start));
                }
            } else if !self.unvisited_queued
                && (self.topsort_unvisited || self.hooks.on_unvisited.is_some())
            {
                self.queue_unvisited();
            } else {
                return None;
            }
        }
    }
}

/// Breadth-first traversal yielding gates in discovery order.
pub struct Bfs<'c, 'h> {
    circuit: &'c Circuit,
    index: GateIndex<'c>,
    queue: VecDeque<usize>,
    seen: Vec<bool>,
    direction: TraverseDirection,
    on_enter: Option<Box<dyn FnMut(&Gate) + 'h>>,
}

impl<'c, 'h> Iterator for Bfs<'c, 'h> {
    type Item = &'c Gate;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.queue.pop_front()?;
        let label = self.index.labels[position];
        let gate = &self.circuit.gates[label];
        let neighbors: &[Label] = match self.direction {
            TraverseDirection::Operands => gate.operands(),
            TraverseDirection::Users => &self.circuit.users[label],
        };
        for neighbor in neighbors {
            let n = self.index.positions[neighbor.as_str()];
            if !self.seen[n] {
                self.seen[n] = true;
                self.queue.push_back(n);
            }
        }
        if let Some(hook) = self.on_enter.as_mut() {
            hook(gate);
        }
        Some(gate)
    }
}

impl Circuit {
    /// Topological order, inputs first.
    pub fn top_sort(&self) -> TopSort<'_> {
        TopSort::new(self, false)
    }

    /// Topological order, outputs first (every gate precedes its operands).
    pub fn top_sort_inverse(&self) -> TopSort<'_> {
        TopSort::new(self, true)
    }

    /// Depth-first traversal from `starts`.
    ///
    /// Gates are yielded on entry. With `topsort_unvisited`, gates the start
    /// set never reaches are traversed afterwards in topological order (they
    /// are announced through the `on_unvisited` hook first).
    ///
    /// # Panics
    ///
    /// Panics if a start label is absent from the circuit.
    pub fn dfs<'c, 'h>(
        &'c self,
        starts: impl IntoIterator<Item = &'c Label>,
        direction: TraverseDirection,
        topsort_unvisited: bool,
        hooks: DfsHooks<'h>,
    ) -> Dfs<'c, 'h> {
        Dfs::new(self, starts, direction, topsort_unvisited, hooks)
    }

    /// DFS from all outputs towards the inputs.
    pub fn dfs_from_outputs<'c, 'h>(&'c self, hooks: DfsHooks<'h>) -> Dfs<'c, 'h> {
        Dfs::new(
            self,
            self.outputs.iter(),
            TraverseDirection::Operands,
            false,
            hooks,
        )
    }

    /// Breadth-first traversal from `starts`.
    pub fn bfs<'c, 'h>(
        &'c self,
        starts: impl IntoIterator<Item = &'c Label>,
        direction: TraverseDirection,
        on_enter: Option<Box<dyn FnMut(&Gate) + 'h>>,
    ) -> Bfs<'c, 'h> {
        let index = GateIndex::new(self);
        let mut seen = vec![false; index.labels.len()];
        let mut queue = VecDeque::new();
        for label in starts {
            let position = index.positions[label.as_str()];
            if !seen[position] {
                seen[position] = true;
                queue.push_back(position);
            }
        }
        Bfs {
            circuit: self,
            index,
            queue,
            seen,
            direction,
            on_enter,
        }
    }
}
