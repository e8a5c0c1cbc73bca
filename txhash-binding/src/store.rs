//! Column store: declare once per table, assign once per proving run
//!
//! A [`TableSchema`] records column names and lengths at table-construction
//! time and is immutable afterwards. Each proving run gets its own
//! [`ProverRun`], so independent runs over the same schema never share
//! mutable state.

use crate::error::Result as BindingResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use txhash_spec::error::Result;
use txhash_spec::{Column, ColumnId, ColumnVector, Field, TableError};

/// Declaration side of the column store
pub trait ColumnDeclarer {
    /// Identity of the table, part of every column id
    fn table_name(&self) -> &str;

    /// Declare a column of `len` rows named `{table}.{prefix}_{name}`.
    fn declare_column(&mut self, prefix: &str, name: &str, len: usize) -> Result<Column>;
}

/// Assignment side of the column store
pub trait ColumnStore {
    /// Field the column values live in
    type Element: Field;

    /// Assigned values of `column`
    fn column(&self, column: &Column) -> Result<&ColumnVector<Self::Element>>;

    fn is_assigned(&self, column: &Column) -> bool;

    /// Assign several columns at once.
    ///
    /// The whole batch is checked before anything is written: either every
    /// column is assigned or none is.
    fn assign_columns(
        &mut self,
        batch: Vec<(Column, ColumnVector<Self::Element>)>,
    ) -> Result<()>;

    fn assign_column(
        &mut self,
        column: &Column,
        values: ColumnVector<Self::Element>,
    ) -> Result<()> {
        self.assign_columns(vec![(column.clone(), values)])
    }
}

/// Declared columns of one table
#[derive(Debug, Clone, Default)]
pub struct TableSchema {
    name: String,
    columns: BTreeMap<ColumnId, usize>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a declared column by id
    pub fn column(&self, id: &ColumnId) -> Option<Column> {
        self.columns
            .get(id)
            .map(|&len| Column::new(id.clone(), len))
    }

    /// All declared columns in id order
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns
            .iter()
            .map(|(id, &len)| Column::new(id.clone(), len))
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

impl ColumnDeclarer for TableSchema {
    fn table_name(&self) -> &str {
        &self.name
    }

    fn declare_column(&mut self, prefix: &str, name: &str, len: usize) -> Result<Column> {
        let id = ColumnId::new(&self.name, prefix, name);
        if self.columns.contains_key(&id) {
            return Err(TableError::DuplicateColumn(id));
        }
        self.columns.insert(id.clone(), len);
        tracing::trace!(column = %id, len, "declared column");
        Ok(Column::new(id, len))
    }
}

/// Column assignments of a single proving run
#[derive(Debug)]
pub struct ProverRun<'a, F: Field> {
    schema: &'a TableSchema,
    assignments: BTreeMap<ColumnId, ColumnVector<F>>,
}

impl<'a, F: Field> ProverRun<'a, F> {
    pub fn new(schema: &'a TableSchema) -> Self {
        Self {
            schema,
            assignments: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &TableSchema {
        self.schema
    }

    pub fn num_assigned(&self) -> usize {
        self.assignments.len()
    }

    /// Expanded copy of every assigned column, in id order
    pub fn snapshot(&self) -> TableSnapshot<F> {
        TableSnapshot {
            table: self.schema.name().to_string(),
            columns: self
                .assignments
                .iter()
                .map(|(id, values)| (id.clone(), values.to_vec()))
                .collect(),
        }
    }

    fn check_assignable(&self, column: &Column, values: &ColumnVector<F>) -> Result<()> {
        let declared = self
            .schema
            .column(column.id())
            .ok_or_else(|| TableError::UnknownColumn(column.id().clone()))?;
        if declared.len() != column.len() {
            return Err(TableError::LengthMismatch {
                column: column.id().clone(),
                expected: declared.len(),
                found: column.len(),
            });
        }
        if self.assignments.contains_key(column.id()) {
            return Err(TableError::AlreadyAssigned(column.id().clone()));
        }
        if values.len() != declared.len() {
            return Err(TableError::LengthMismatch {
                column: column.id().clone(),
                expected: declared.len(),
                found: values.len(),
            });
        }
        Ok(())
    }
}

impl<'a, F: Field> ColumnStore for ProverRun<'a, F> {
    type Element = F;

    fn column(&self, column: &Column) -> Result<&ColumnVector<F>> {
        if self.schema.column(column.id()).is_none() {
            return Err(TableError::UnknownColumn(column.id().clone()));
        }
        self.assignments
            .get(column.id())
            .ok_or_else(|| TableError::NotAssigned(column.id().clone()))
    }

    fn is_assigned(&self, column: &Column) -> bool {
        self.assignments.contains_key(column.id())
    }

    fn assign_columns(&mut self, batch: Vec<(Column, ColumnVector<F>)>) -> Result<()> {
        let mut seen = BTreeSet::new();
        for (column, values) in &batch {
            self.check_assignable(column, values)?;
            if !seen.insert(column.id().clone()) {
                return Err(TableError::AlreadyAssigned(column.id().clone()));
            }
        }

        for (column, values) in batch {
            tracing::trace!(column = %column.id(), rows = values.len(), "assigned column");
            self.assignments.insert(column.id().clone(), values);
        }
        Ok(())
    }
}

/// Assigned columns of one run, expanded to plain vectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "F: Field")]
pub struct TableSnapshot<F: Field> {
    pub table: String,
    pub columns: Vec<(ColumnId, Vec<F>)>,
}

impl<F: Field> TableSnapshot<F> {
    pub fn to_bytes(&self) -> BindingResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> BindingResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn column(&self, id: &ColumnId) -> Option<&[F]> {
        self.columns
            .iter()
            .find(|(cid, _)| cid == id)
            .map(|(_, values)| values.as_slice())
    }
}
