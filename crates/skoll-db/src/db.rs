//! The in-memory pattern database of small circuits.

use std::io::{Read, Write};

use itertools::Itertools;
use rustc_hash::FxHashMap;
use tracing::debug;

use skoll_ir::{BooleanFunction, Circuit, GateType, TruthTable, TruthTableModel};

use crate::coding::{decode_circuit, encode_circuit};
use crate::dict_io::{BinaryDict, read_binary_dict, write_binary_dict};
use crate::error::{DbError, DbResult};

/// A key→circuit store caching small (typically optimal) circuits,
/// persisted through the binary dictionary layout.
///
/// Keys are free-form labels; circuits stored without an explicit label are
/// keyed by their truth table (`'0'/'1'` rows joined with `_`), which is
/// what the truth-table lookups query.
#[derive(Debug, Default)]
pub struct CircuitDatabase {
    entries: FxHashMap<String, Vec<u8>>,
    order: Vec<String>,
}

impl CircuitDatabase {
    /// An empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a database from a dictionary stream.
    pub fn load(stream: &mut impl Read) -> DbResult<Self> {
        let dict = read_binary_dict(stream)?;
        let mut db = Self::new();
        for (key, value) in dict {
            if db.entries.insert(key.clone(), value).is_some() {
                return Err(DbError::DuplicateLabel(key));
            }
            db.order.push(key);
        }
        debug!(entries = db.order.len(), "loaded circuit database");
        Ok(db)
    }

    /// Persist the database to a dictionary stream.
    pub fn save(&self, stream: &mut impl Write) -> DbResult<()> {
        let dict: BinaryDict = self
            .order
            .iter()
            .map(|key| (key.clone(), self.entries[key].clone()))
            .collect();
        write_binary_dict(&dict, stream)
    }

    /// Number of stored circuits.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the database is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Decode the circuit stored under `label`.
    pub fn get_by_label(&self, label: &str) -> DbResult<Option<Circuit>> {
        match self.entries.get(label) {
            Some(bytes) => Ok(Some(decode_circuit(bytes)?)),
            None => Ok(None),
        }
    }

    /// Store a circuit; without an explicit label it is keyed by its truth
    /// table.
    pub fn add_circuit(&mut self, circuit: &Circuit, label: Option<&str>) -> DbResult<()> {
        let key = match label {
            Some(label) => label.to_string(),
            None => truth_table_key(&circuit.get_truth_table()),
        };
        if self.entries.contains_key(&key) {
            return Err(DbError::DuplicateLabel(key));
        }
        let bytes = encode_circuit(circuit)?;
        self.entries.insert(key.clone(), bytes);
        self.order.push(key);
        Ok(())
    }

    /// Look up a circuit by its exact truth table.
    pub fn get_by_truth_table(&self, table: &TruthTable) -> DbResult<Option<Circuit>> {
        self.get_by_label(&truth_table_key(table))
    }

    /// Look up the cheapest circuit consistent with a model: every
    /// completion of the don't-care cells is queried and the smallest hit
    /// (counting neither inputs nor inverters/buffers) wins.
    pub fn get_by_truth_table_model(
        &self,
        model: &TruthTableModel,
    ) -> DbResult<Option<Circuit>> {
        let undefined: Vec<(usize, usize)> = model
            .rows()
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, cell)| cell.is_none())
                    .map(move |(j, _)| (i, j))
            })
            .collect();

        if undefined.is_empty() {
            let table = model.define(&[])?;
            return self.get_by_truth_table(&table);
        }

        let mut best: Option<(usize, Circuit)> = None;
        for completion in (0..undefined.len())
            .map(|_| [false, true])
            .multi_cartesian_product()
        {
            let choices: Vec<((usize, usize), bool)> = undefined
                .iter()
                .copied()
                .zip(completion.iter().copied())
                .collect();
            let table = model.define(&choices)?;
            if let Some(circuit) = self.get_by_truth_table(&table)? {
                let size = circuit_cost(&circuit);
                if best.as_ref().is_none_or(|(best_size, _)| size < *best_size) {
                    best = Some((size, circuit));
                }
            }
        }
        Ok(best.map(|(_, circuit)| circuit))
    }
}

fn truth_table_key(table: &TruthTable) -> String {
    table.to_strings().join("_")
}

fn circuit_cost(circuit: &Circuit) -> usize {
    circuit
        .gates()
        .filter(|g| {
            !matches!(
                g.gate_type(),
                GateType::Input | GateType::Not | GateType::Iff
            )
        })
        .count()
}
