//! Hash-consistency binding for transaction signatures
//!
//! Owns three native columns of the table:
//!
//! - `HASH_HI`: high half of each transaction digest
//! - `HASH_LO`: low half of each transaction digest
//! - `IS_HASH`: 1 on the first row of each digest block, 0 elsewhere
//!
//! ## Row layout
//!
//! ```text
//! rows [0, P)             placeholder block, all zero (owned upstream)
//! rows [P + i*R, P+(i+1)*R)  digest i: hi/lo repeated R times, IS_HASH = 1,0,..,0
//! rows [P + n*R, H)       zero padding
//! ```
//!
//! with `P = nb_placeholder_units * rows_per_placeholder_unit` and
//! `R = rows_per_signature_block`. The columns do not prove anything about
//! the digests; the consuming hash circuit checks them against the byte
//! streams through the module descriptor.

use crate::descriptor::{GenericByteModule, InfoModule};
use crate::error::{BindingError, Result};
use crate::store::{ColumnDeclarer, ColumnStore};
use crate::stream::ByteStreamSource;
use crate::trace::HashTraceGenerator;
use std::iter;
use txhash_spec::{split_digest, BindingConfig, Column, ColumnVector, Field};

/// Column prefix used for the transaction-signature binding
pub const TX_SIGNATURE_PREFIX: &str = "TX_SIGNATURE";

/// Row accounting of one assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssignmentSummary {
    pub placeholder_rows: usize,
    pub nb_digests: usize,
    /// Placeholder plus digest rows
    pub used_rows: usize,
    pub padding_rows: usize,
}

/// Finished values of the three binding columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashColumns<F: Field> {
    pub hash_hi: ColumnVector<F>,
    pub hash_lo: ColumnVector<F>,
    pub is_hash: ColumnVector<F>,
    pub summary: AssignmentSummary,
}

/// Lay `digests` out over a table of `table_height` rows.
///
/// Fails before producing anything if the digests do not fit or a digest has
/// the wrong width.
pub fn layout_hash_columns<F: Field>(
    config: &BindingConfig,
    digests: &[Vec<u8>],
    nb_placeholder_units: usize,
    table_height: usize,
) -> Result<HashColumns<F>> {
    config.validate_for_field::<F>()?;

    let required = config
        .required_rows(nb_placeholder_units, digests.len())
        .ok_or(BindingError::CapacityOverflow {
            required: usize::MAX,
            height: table_height,
        })?;
    if required > table_height {
        return Err(BindingError::CapacityOverflow {
            required,
            height: table_height,
        });
    }

    let block = config.rows_per_signature_block;
    let placeholder_rows = config.placeholder_rows(nb_placeholder_units);

    let mut hash_hi = vec![F::zero(); placeholder_rows];
    let mut hash_lo = vec![F::zero(); placeholder_rows];
    let mut is_hash = vec![F::zero(); placeholder_rows];
    hash_hi.reserve(required - placeholder_rows);
    hash_lo.reserve(required - placeholder_rows);
    is_hash.reserve(required - placeholder_rows);

    for (index, digest) in digests.iter().enumerate() {
        let (hi, lo) = split_digest::<F>(digest, &config.digest).ok_or(
            BindingError::WidthMismatch {
                index,
                expected: config.digest.digest_bytes,
                found: digest.len(),
            },
        )?;
        tracing::trace!(index, row = hash_hi.len(), %hi, %lo, "digest block");

        hash_hi.extend(iter::repeat(hi).take(block));
        hash_lo.extend(iter::repeat(lo).take(block));
        is_hash.push(F::one());
        is_hash.extend(iter::repeat(F::zero()).take(block - 1));
    }

    let summary = AssignmentSummary {
        placeholder_rows,
        nb_digests: digests.len(),
        used_rows: required,
        padding_rows: table_height - required,
    };

    Ok(HashColumns {
        hash_hi: ColumnVector::right_zero_padded(hash_hi, table_height)?,
        hash_lo: ColumnVector::right_zero_padded(hash_lo, table_height)?,
        is_hash: ColumnVector::right_zero_padded(is_hash, table_height)?,
        summary,
    })
}

/// Digest columns of the transaction-signature section of the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashBinding {
    pub hash_hi: Column,
    pub hash_lo: Column,
    pub is_hash: Column,
    config: BindingConfig,
}

impl HashBinding {
    /// Declare `{prefix}_HASH_HI`, `{prefix}_HASH_LO` and `{prefix}_IS_HASH`
    /// with `table_height` rows each.
    pub fn declare<D: ColumnDeclarer + ?Sized>(
        schema: &mut D,
        prefix: &str,
        table_height: usize,
        config: BindingConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            hash_hi: schema.declare_column(prefix, "HASH_HI", table_height)?,
            hash_lo: schema.declare_column(prefix, "HASH_LO", table_height)?,
            is_hash: schema.declare_column(prefix, "IS_HASH", table_height)?,
            config,
        })
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// Height the columns were declared with
    pub fn table_height(&self) -> usize {
        self.hash_hi.len()
    }

    /// Result columns in the shape the hash circuit expects.
    ///
    /// The single flag column marks both halves.
    pub fn info_module(&self) -> InfoModule {
        InfoModule {
            hash_hi: self.hash_hi.clone(),
            hash_lo: self.hash_lo.clone(),
            is_hash_hi: self.is_hash.clone(),
            is_hash_lo: self.is_hash.clone(),
        }
    }

    /// Pair `source` (hash inputs) with the binding columns (hash outputs).
    pub fn bind<S: ByteStreamSource>(&self, source: S) -> GenericByteModule<S> {
        GenericByteModule {
            data: source,
            info: self.info_module(),
        }
    }

    /// Hash every stream of `source` and assign the three columns.
    ///
    /// Fails if `generator` produces digests of another shape than the
    /// configured one. Nothing is written unless all three columns can be
    /// written.
    pub fn assign<S, B, G>(
        &self,
        store: &mut S,
        source: &B,
        generator: &G,
        nb_placeholder_units: usize,
    ) -> Result<AssignmentSummary>
    where
        S: ColumnStore + ?Sized,
        B: ByteStreamSource + ?Sized,
        G: HashTraceGenerator + ?Sized,
    {
        let engine = generator.digest_layout();
        if engine != self.config.digest {
            return Err(BindingError::EngineMismatch {
                expected: self.config.digest.digest_bytes,
                found: engine.digest_bytes,
            });
        }

        let streams = source.scan_streams(&*store)?;
        let trace = generator.generate_trace(&streams)?;
        if trace.len() != streams.len() {
            return Err(BindingError::TraceLength {
                streams: streams.len(),
                digests: trace.len(),
            });
        }

        let columns = layout_hash_columns::<S::Element>(
            &self.config,
            &trace.digests,
            nb_placeholder_units,
            self.table_height(),
        )?;

        tracing::debug!(
            streams = streams.len(),
            hash_blocks = trace.total_blocks(),
            placeholder_rows = columns.summary.placeholder_rows,
            used_rows = columns.summary.used_rows,
            height = self.table_height(),
            "assigning transaction hash columns"
        );

        store.assign_columns(vec![
            (self.hash_hi.clone(), columns.hash_hi),
            (self.hash_lo.clone(), columns.hash_lo),
            (self.is_hash.clone(), columns.is_hash),
        ])?;
        Ok(columns.summary)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use txhash_spec::{join_digest, DigestLayout, Mersenne31};

    fn arb_digests() -> impl Strategy<Value = Vec<Vec<u8>>> {
        proptest::collection::vec(proptest::collection::vec(any::<u8>(), 4), 0..6)
    }

    proptest! {
        #[test]
        fn test_layout_properties(
            digests in arb_digests(),
            rows_per_unit in 1usize..4,
            block in 1usize..5,
            units in 0usize..4,
            slack in 0usize..8,
        ) {
            let layout = DigestLayout::new(4).unwrap();
            let config = BindingConfig::new(rows_per_unit, block, layout).unwrap();
            let p = units * rows_per_unit;
            let used = p + digests.len() * block;
            let height = used + slack;

            let cols = layout_hash_columns::<Mersenne31>(&config, &digests, units, height).unwrap();
            let hi = cols.hash_hi.to_vec();
            let lo = cols.hash_lo.to_vec();
            let flag = cols.is_hash.to_vec();

            prop_assert_eq!(hi.len(), height);
            prop_assert_eq!(lo.len(), height);
            prop_assert_eq!(flag.len(), height);

            // placeholder block and padding are zero
            for row in (0..p).chain(used..height) {
                prop_assert!(hi[row].is_zero());
                prop_assert!(lo[row].is_zero());
                prop_assert!(flag[row].is_zero());
            }

            prop_assert_eq!(flag.iter().filter(|f| f.is_one()).count(), digests.len());

            for (i, digest) in digests.iter().enumerate() {
                let start = p + i * block;
                prop_assert!(flag[start].is_one());
                for row in start..start + block {
                    prop_assert_eq!(hi[row], hi[start]);
                    prop_assert_eq!(lo[row], lo[start]);
                    if row != start {
                        prop_assert!(flag[row].is_zero());
                    }
                }
                let rebuilt = join_digest(&hi[start], &lo[start], &layout).unwrap();
                prop_assert_eq!(&rebuilt, digest);
            }
        }

        #[test]
        fn test_overflow_never_truncates(
            n in 1usize..6,
            block in 1usize..5,
            deficit in 1usize..4,
        ) {
            let config = BindingConfig::new(1, block, DigestLayout::new(4).unwrap()).unwrap();
            let digests = vec![vec![0u8, 1, 0, 1]; n];
            let required = n * block;
            let height = required.saturating_sub(deficit);
            let result = layout_hash_columns::<Mersenne31>(&config, &digests, 0, height);
            let is_overflow = matches!(result, Err(BindingError::CapacityOverflow { .. }));
            prop_assert!(is_overflow);
        }
    }
}
