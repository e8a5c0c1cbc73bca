//! Binding error types

use thiserror::Error;
use txhash_spec::{ConfigError, TableError};

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Table too small: {required} rows required, table height is {height}")]
    CapacityOverflow { required: usize, height: usize },

    #[error("Digest {index} has width {found} bytes, expected {expected} bytes")]
    WidthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Hash engine produces {found}-byte digests, binding expects {expected}-byte digests")]
    EngineMismatch { expected: usize, found: usize },

    #[error("Hash trace has {digests} digests for {streams} streams")]
    TraceLength { streams: usize, digests: usize },

    #[error("Malformed byte stream at row {row}: {reason}")]
    MalformedStream { row: usize, reason: String },

    #[error("Malformed info column {column}: {reason}")]
    ShapeViolation { column: String, reason: String },

    #[error("Stream/digest count mismatch: {streams} streams, {digests} flagged digests")]
    ClaimCountMismatch { streams: usize, digests: usize },

    #[error("Snapshot encoding failed: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl From<ConfigError> for BindingError {
    fn from(err: ConfigError) -> Self {
        BindingError::Table(TableError::InvalidConfig(err))
    }
}

pub type Result<T> = std::result::Result<T, BindingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use txhash_spec::ColumnId;

    #[test]
    fn test_capacity_overflow_display() {
        let err = BindingError::CapacityOverflow {
            required: 12,
            height: 10,
        };
        assert_eq!(
            err.to_string(),
            "Table too small: 12 rows required, table height is 10"
        );
    }

    #[test]
    fn test_engine_mismatch_display() {
        let err = BindingError::EngineMismatch {
            expected: 32,
            found: 4,
        };
        assert_eq!(
            err.to_string(),
            "Hash engine produces 4-byte digests, binding expects 32-byte digests"
        );
    }

    #[test]
    fn test_width_mismatch_display() {
        let err = BindingError::WidthMismatch {
            index: 3,
            expected: 32,
            found: 20,
        };
        assert_eq!(
            err.to_string(),
            "Digest 3 has width 20 bytes, expected 32 bytes"
        );
    }

    #[test]
    fn test_table_error_from() {
        let table_err = TableError::AlreadyAssigned(ColumnId::new("t", "TX", "IS_HASH"));
        let err: BindingError = table_err.into();
        assert_eq!(
            err.to_string(),
            "Table error: Column already assigned: t.TX_IS_HASH"
        );
    }

    #[test]
    fn test_config_error_from() {
        let err: BindingError = ConfigError::ZeroRowsPerSignatureBlock.into();
        assert!(matches!(
            err,
            BindingError::Table(TableError::InvalidConfig(ConfigError::ZeroRowsPerSignatureBlock))
        ));
    }

    #[test]
    fn test_claim_count_display() {
        let err = BindingError::ClaimCountMismatch {
            streams: 3,
            digests: 2,
        };
        assert_eq!(
            err.to_string(),
            "Stream/digest count mismatch: 3 streams, 2 flagged digests"
        );
    }
}
