//! # Error Types for table declaration and assignment

use crate::column::ColumnId;
use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    // Declaration errors
    #[error("Column already declared: {0}")]
    DuplicateColumn(ColumnId),

    #[error("Unknown column: {0}")]
    UnknownColumn(ColumnId),

    // Assignment errors
    #[error("Column already assigned: {0}")]
    AlreadyAssigned(ColumnId),

    #[error("Column not assigned: {0}")]
    NotAssigned(ColumnId),

    #[error("Invalid column length for {column}: expected {expected} rows, found {found} rows")]
    LengthMismatch {
        column: ColumnId,
        expected: usize,
        found: usize,
    },

    #[error("Cannot pad {values} values to {len} rows without truncating")]
    PaddingOverflow { values: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, TableError>;

impl TableError {
    /// Errors raised by writing to a column rather than by declaring one
    pub fn is_assignment_error(&self) -> bool {
        matches!(
            self,
            TableError::AlreadyAssigned(_)
                | TableError::LengthMismatch { .. }
                | TableError::PaddingOverflow { .. }
        )
    }
}
