//! Module descriptors for the hash circuit
//!
//! The hash circuit is written once against [`ByteHashModule`]: anything that
//! offers ordered byte streams (the hash inputs) together with matching result
//! columns (the hash outputs). Every producer hands over the same shape, so
//! the circuit never special-cases a caller.

use crate::error::{BindingError, Result};
use crate::store::ColumnStore;
use crate::stream::ByteStreamSource;
use txhash_spec::{Column, Field};

/// Result columns of a hashing module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoModule {
    pub hash_hi: Column,
    pub hash_lo: Column,
    /// Marks rows whose `hash_hi` is a digest result
    pub is_hash_hi: Column,
    /// Marks rows whose `hash_lo` is a digest result
    pub is_hash_lo: Column,
}

impl InfoModule {
    fn columns(&self) -> [&Column; 4] {
        [&self.hash_hi, &self.hash_lo, &self.is_hash_hi, &self.is_hash_lo]
    }

    /// Check the assigned columns have the descriptor shape.
    ///
    /// All four columns share one length, the flags are boolean, and the hi
    /// and lo flags agree row by row. Returns the shared length.
    pub fn check_shape<S: ColumnStore + ?Sized>(&self, store: &S) -> Result<usize> {
        let height = store.column(&self.hash_hi)?.len();
        for column in self.columns() {
            let len = store.column(column)?.len();
            if len != height {
                return Err(BindingError::ShapeViolation {
                    column: column.id().to_string(),
                    reason: format!("length {} differs from {}", len, height),
                });
            }
        }

        let flags_hi = store.column(&self.is_hash_hi)?;
        let flags_lo = store.column(&self.is_hash_lo)?;
        for (row, (hi, lo)) in flags_hi.iter().zip(flags_lo.iter()).enumerate() {
            if !(hi.is_zero() || hi.is_one()) {
                return Err(BindingError::ShapeViolation {
                    column: self.is_hash_hi.id().to_string(),
                    reason: format!("non-boolean flag {} at row {}", hi, row),
                });
            }
            if hi != lo {
                return Err(BindingError::ShapeViolation {
                    column: self.is_hash_lo.id().to_string(),
                    reason: format!("flag disagrees with {} at row {}", self.is_hash_hi.id(), row),
                });
            }
        }
        Ok(height)
    }

    /// `(hash_hi, hash_lo)` of every flagged row, in row order
    pub fn flagged_digests<S: ColumnStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Vec<(S::Element, S::Element)>> {
        let hi = store.column(&self.hash_hi)?;
        let lo = store.column(&self.hash_lo)?;
        let flags = store.column(&self.is_hash_hi)?;

        Ok(flags
            .iter()
            .zip(hi.iter().zip(lo.iter()))
            .filter(|(flag, _)| flag.is_one())
            .map(|(_, pair)| pair)
            .collect())
    }
}

/// Hash inputs paired with hash outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericByteModule<S> {
    pub data: S,
    pub info: InfoModule,
}

/// Anything offering ordered byte streams plus matching result columns
pub trait ByteHashModule {
    type Data: ByteStreamSource;

    fn data(&self) -> &Self::Data;

    fn info(&self) -> &InfoModule;
}

impl<S: ByteStreamSource> ByteHashModule for GenericByteModule<S> {
    type Data = S;

    fn data(&self) -> &S {
        &self.data
    }

    fn info(&self) -> &InfoModule {
        &self.info
    }
}

/// One input stream and the digest halves claimed for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashClaim<F: Field> {
    pub input: Vec<u8>,
    pub hash_hi: F,
    pub hash_lo: F,
}

/// Pair every input stream of `module` with its flagged digest, in order.
///
/// This is what the hash circuit consumes from any producer; it does not
/// recompute the digests.
pub fn collect_hash_claims<M, S>(module: &M, store: &S) -> Result<Vec<HashClaim<S::Element>>>
where
    M: ByteHashModule + ?Sized,
    S: ColumnStore + ?Sized,
{
    module.info().check_shape(store)?;
    let streams = module.data().scan_streams(store)?;
    let digests = module.info().flagged_digests(store)?;
    if streams.len() != digests.len() {
        return Err(BindingError::ClaimCountMismatch {
            streams: streams.len(),
            digests: digests.len(),
        });
    }

    Ok(streams
        .into_iter()
        .zip(digests)
        .map(|(input, (hash_hi, hash_lo))| HashClaim {
            input,
            hash_hi,
            hash_lo,
        })
        .collect())
}
