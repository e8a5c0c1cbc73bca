//! # Column identities and column values
//!
//! A column is a fixed-length sequence of field elements addressed by a
//! [`ColumnId`]. Values are carried as a [`ColumnVector`], which keeps
//! constant and zero-padded columns compact.

use crate::error::{Result, TableError};
use crate::field::Field;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully qualified column name: `{table}.{prefix}_{name}`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnId(String);

impl ColumnId {
    /// Build an id from the owning table, the module prefix and the column name.
    pub fn new(table: &str, prefix: &str, name: &str) -> Self {
        ColumnId(format!("{}.{}_{}", table, prefix, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to a declared column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    id: ColumnId,
    len: usize,
}

impl Column {
    pub fn new(id: ColumnId, len: usize) -> Self {
        Self { id, len }
    }

    pub fn id(&self) -> &ColumnId {
        &self.id
    }

    /// Declared length (the table height)
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Values of an assigned column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "F: Field")]
pub enum ColumnVector<F: Field> {
    /// Every row holds the same value
    Constant { value: F, len: usize },
    /// Explicit values for every row
    Regular(Vec<F>),
    /// Explicit prefix followed by zeros up to `len`
    RightZeroPadded { values: Vec<F>, len: usize },
}

impl<F: Field> ColumnVector<F> {
    /// A column of `len` zeros
    pub fn zeros(len: usize) -> Self {
        ColumnVector::Constant {
            value: F::zero(),
            len,
        }
    }

    /// Pad `values` with zeros on the right up to `len`.
    ///
    /// Padding never truncates: a prefix longer than `len` is an error.
    pub fn right_zero_padded(values: Vec<F>, len: usize) -> Result<Self> {
        if values.len() > len {
            return Err(TableError::PaddingOverflow {
                values: values.len(),
                len,
            });
        }
        Ok(ColumnVector::RightZeroPadded { values, len })
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnVector::Constant { len, .. } => *len,
            ColumnVector::Regular(values) => values.len(),
            ColumnVector::RightZeroPadded { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `row`, `None` past the end
    pub fn get(&self, row: usize) -> Option<F> {
        if row >= self.len() {
            return None;
        }
        match self {
            ColumnVector::Constant { value, .. } => Some(value.clone()),
            ColumnVector::Regular(values) => Some(values[row].clone()),
            ColumnVector::RightZeroPadded { values, .. } => {
                Some(values.get(row).cloned().unwrap_or_else(F::zero))
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = F> + '_ {
        (0..self.len()).filter_map(move |row| self.get(row))
    }

    /// Expand into one value per row
    pub fn to_vec(&self) -> Vec<F> {
        self.iter().collect()
    }
}
