//! Dense truth tables, concrete and with don't-cares.
//!
//! Row `i` of a table describes output `i`; column `t` holds the value of
//! that output on the input pattern that is the canonical big-endian
//! encoding of `t` (input `0` carries the most significant bit).

use serde::{Deserialize, Serialize};

use crate::error::{CircuitError, CircuitResult};

/// The canonical input pattern for column `index` of an `input_size`-ary table.
pub fn canonical_input(index: usize, input_size: usize) -> Vec<bool> {
    (0..input_size)
        .map(|i| (index >> (input_size - 1 - i)) & 1 == 1)
        .collect()
}

fn checked_input_size(row_len: usize) -> CircuitResult<usize> {
    if row_len == 0 || !row_len.is_power_of_two() {
        return Err(CircuitError::BadTruthTableShape {
            expected: row_len.next_power_of_two().max(1),
            got: row_len,
        });
    }
    Ok(row_len.trailing_zeros() as usize)
}

/// A fully defined truth table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthTable {
    input_size: usize,
    rows: Vec<Vec<bool>>,
}

impl TruthTable {
    /// Build a table from one row per output.
    ///
    /// Every row must have the same power-of-two length.
    pub fn new(rows: Vec<Vec<bool>>) -> CircuitResult<Self> {
        let width = rows.first().map_or(1, Vec::len);
        let input_size = checked_input_size(width)?;
        for row in &rows {
            if row.len() != width {
                return Err(CircuitError::BadTruthTableShape {
                    expected: width,
                    got: row.len(),
                });
            }
        }
        Ok(Self { input_size, rows })
    }

    /// Parse rows of `'0'`/`'1'` characters.
    pub fn from_strings<S: AsRef<str>>(rows: &[S]) -> CircuitResult<Self> {
        let mut parsed = Vec::with_capacity(rows.len());
        for row in rows {
            let mut bits = Vec::with_capacity(row.as_ref().len());
            for c in row.as_ref().chars() {
                match c {
                    '0' => bits.push(false),
                    '1' => bits.push(true),
                    other => return Err(CircuitError::BadBooleanValue { value: other }),
                }
            }
            parsed.push(bits);
        }
        Self::new(parsed)
    }

    /// Number of inputs.
    #[inline]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Number of outputs.
    #[inline]
    pub fn output_size(&self) -> usize {
        self.rows.len()
    }

    /// The rows, one per output.
    #[inline]
    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    /// Value of output `output` at column `index`.
    #[inline]
    pub fn value(&self, output: usize, index: usize) -> bool {
        self.rows[output][index]
    }

    /// Render each row as a `'0'`/`'1'` string.
    pub fn to_strings(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|&b| if b { '1' } else { '0' }).collect())
            .collect()
    }
}

/// A truth table in which some cells are yet to be determined.
///
/// `None` cells are don't-cares: a realizing circuit may produce either
/// value there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthTableModel {
    input_size: usize,
    rows: Vec<Vec<Option<bool>>>,
}

impl TruthTableModel {
    /// Build a model from one row per output.
    pub fn new(rows: Vec<Vec<Option<bool>>>) -> CircuitResult<Self> {
        let width = rows.first().map_or(1, Vec::len);
        let input_size = checked_input_size(width)?;
        for row in &rows {
            if row.len() != width {
                return Err(CircuitError::BadTruthTableShape {
                    expected: width,
                    got: row.len(),
                });
            }
        }
        Ok(Self { input_size, rows })
    }

    /// Parse rows of `'0'`/`'1'`/`'*'` characters (`'*'` = don't-care).
    pub fn from_strings<S: AsRef<str>>(rows: &[S]) -> CircuitResult<Self> {
        let mut parsed = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cells = Vec::with_capacity(row.as_ref().len());
            for c in row.as_ref().chars() {
                match c {
                    '0' => cells.push(Some(false)),
                    '1' => cells.push(Some(true)),
                    '*' => cells.push(None),
                    other => return Err(CircuitError::BadBooleanValue { value: other }),
                }
            }
            parsed.push(cells);
        }
        Self::new(parsed)
    }

    /// A model without don't-cares, from a concrete table.
    pub fn from_truth_table(table: &TruthTable) -> Self {
        Self {
            input_size: table.input_size(),
            rows: table
                .rows()
                .iter()
                .map(|row| row.iter().map(|&b| Some(b)).collect())
                .collect(),
        }
    }

    /// Number of inputs.
    #[inline]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Number of outputs.
    #[inline]
    pub fn output_size(&self) -> usize {
        self.rows.len()
    }

    /// The rows, one per output.
    #[inline]
    pub fn rows(&self) -> &[Vec<Option<bool>>] {
        &self.rows
    }

    /// Cell of output `output` at column `index`.
    #[inline]
    pub fn cell(&self, output: usize, index: usize) -> Option<bool> {
        self.rows[output][index]
    }

    /// Whether column `index` is don't-care for every output.
    pub fn column_is_dont_care(&self, index: usize) -> bool {
        self.rows.iter().all(|row| row[index].is_none())
    }

    /// Check that a concrete table agrees with this model on all defined cells.
    pub fn is_consistent_with(&self, table: &TruthTable) -> bool {
        self.input_size == table.input_size()
            && self.output_size() == table.output_size()
            && self.rows.iter().zip(table.rows()).all(|(model, row)| {
                model
                    .iter()
                    .zip(row)
                    .all(|(cell, &value)| cell.is_none_or(|c| c == value))
            })
    }

    /// Extend the definition of this model by fixing selected don't-cares.
    ///
    /// `choices` maps `(output, column)` cells to concrete values; every
    /// don't-care must be covered. Fixing an already defined cell to a
    /// conflicting value is an error.
    pub fn define(&self, choices: &[((usize, usize), bool)]) -> CircuitResult<TruthTable> {
        let mut rows: Vec<Vec<Option<bool>>> = self.rows.clone();
        for &((output, column), value) in choices {
            let cell = &mut rows[output][column];
            match *cell {
                None => *cell = Some(value),
                Some(existing) if existing != value => {
                    return Err(CircuitError::BadTruthTableShape {
                        expected: self.defined_cells(),
                        got: self.defined_cells() + 1,
                    });
                }
                Some(_) => {}
            }
        }
        let remaining = rows.iter().flatten().filter(|c| c.is_none()).count();
        if remaining != 0 {
            return Err(CircuitError::BadTruthTableShape {
                expected: self.rows.len() << self.input_size,
                got: (self.rows.len() << self.input_size) - remaining,
            });
        }
        TruthTable::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(|c| c.unwrap_or_default()).collect())
                .collect(),
        )
    }

    fn defined_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }
}
