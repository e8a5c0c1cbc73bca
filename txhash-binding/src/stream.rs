//! Byte-stream sources
//!
//! A source yields the ordered logical streams (one per transaction) that the
//! hash engine digests. Two sources are provided:
//!
//! - [`StreamList`]: streams already materialized in memory
//! - [`DataModule`]: streams laid out as limb columns of the table itself,
//!   scanned back out of a proving run
//!
//! ## Limb layout
//!
//! ```text
//! row | HASH_NUM | INDEX | LIMB          | NBYTES | TO_HASH
//! ----+----------+-------+---------------+--------+--------
//!   0 |    1     |   0   | bytes 0..16   |   16   |   1
//!   1 |    1     |   1   | bytes 16..20  |    4   |   1
//!   2 |    2     |   0   | (empty)       |    0   |   1
//!   3 |    0     |   0   | 0             |    0   |   0     <- padding
//! ```
//!
//! Limbs are big-endian integers of their `NBYTES` meaningful bytes.

use crate::error::{BindingError, Result};
use crate::store::{ColumnDeclarer, ColumnStore};
use txhash_spec::{
    element_from_be_bytes, element_to_be_bytes, Column, ColumnVector, ConfigError, Field,
};

/// Default limb width for column-backed streams
pub const DEFAULT_LIMB_BYTES: usize = 16;

/// Anything that yields ordered logical byte streams for a proving run
pub trait ByteStreamSource {
    fn scan_streams<S: ColumnStore + ?Sized>(&self, store: &S) -> Result<Vec<Vec<u8>>>;
}

impl<T: ByteStreamSource + ?Sized> ByteStreamSource for &T {
    fn scan_streams<S: ColumnStore + ?Sized>(&self, store: &S) -> Result<Vec<Vec<u8>>> {
        (**self).scan_streams(store)
    }
}

/// Streams held in memory, independent of the run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamList(Vec<Vec<u8>>);

impl StreamList {
    pub fn new(streams: Vec<Vec<u8>>) -> Self {
        Self(streams)
    }

    pub fn push(&mut self, stream: impl Into<Vec<u8>>) {
        self.0.push(stream.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn streams(&self) -> &[Vec<u8>] {
        &self.0
    }
}

impl From<Vec<Vec<u8>>> for StreamList {
    fn from(streams: Vec<Vec<u8>>) -> Self {
        Self(streams)
    }
}

impl ByteStreamSource for StreamList {
    fn scan_streams<S: ColumnStore + ?Sized>(&self, _store: &S) -> Result<Vec<Vec<u8>>> {
        Ok(self.0.clone())
    }
}

/// Streams stored as limb columns of the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataModule {
    pub hash_num: Column,
    pub index: Column,
    pub limb: Column,
    pub n_bytes: Column,
    pub to_hash: Column,
    limb_bytes: usize,
}

impl DataModule {
    /// Declare the five limb columns under `prefix`.
    pub fn declare<D: ColumnDeclarer + ?Sized>(
        schema: &mut D,
        prefix: &str,
        table_height: usize,
        limb_bytes: usize,
    ) -> Result<Self> {
        if limb_bytes == 0 {
            return Err(ConfigError::ZeroLimbWidth.into());
        }
        Ok(Self {
            hash_num: schema.declare_column(prefix, "HASH_NUM", table_height)?,
            index: schema.declare_column(prefix, "INDEX", table_height)?,
            limb: schema.declare_column(prefix, "LIMB", table_height)?,
            n_bytes: schema.declare_column(prefix, "NBYTES", table_height)?,
            to_hash: schema.declare_column(prefix, "TO_HASH", table_height)?,
            limb_bytes,
        })
    }

    pub fn limb_bytes(&self) -> usize {
        self.limb_bytes
    }

    pub fn table_height(&self) -> usize {
        self.limb.len()
    }

    /// Rows needed to lay out `streams`; an empty stream still takes one row.
    pub fn rows_for(&self, streams: &[Vec<u8>]) -> usize {
        streams
            .iter()
            .map(|s| s.len().div_ceil(self.limb_bytes).max(1))
            .sum()
    }

    /// Lay `streams` out as limb rows and assign the five columns.
    pub fn assign_streams<S: ColumnStore + ?Sized>(
        &self,
        store: &mut S,
        streams: &[Vec<u8>],
    ) -> Result<()> {
        let [hash_num, index, limb, n_bytes, to_hash] =
            self.limb_rows::<S::Element>(streams)?;
        let height = self.table_height();

        tracing::debug!(
            streams = streams.len(),
            rows = limb.len(),
            height,
            "assigning stream limbs"
        );

        store.assign_columns(vec![
            (self.hash_num.clone(), ColumnVector::right_zero_padded(hash_num, height)?),
            (self.index.clone(), ColumnVector::right_zero_padded(index, height)?),
            (self.limb.clone(), ColumnVector::right_zero_padded(limb, height)?),
            (self.n_bytes.clone(), ColumnVector::right_zero_padded(n_bytes, height)?),
            (self.to_hash.clone(), ColumnVector::right_zero_padded(to_hash, height)?),
        ])?;
        Ok(())
    }

    /// Unpadded HASH_NUM, INDEX, LIMB, NBYTES and TO_HASH values for `streams`
    fn limb_rows<F: Field>(&self, streams: &[Vec<u8>]) -> Result<[Vec<F>; 5]> {
        if self.limb_bytes > F::CAPACITY_BYTES {
            return Err(ConfigError::LimbExceedsFieldCapacity {
                limb_bytes: self.limb_bytes,
                capacity_bytes: F::CAPACITY_BYTES,
            }
            .into());
        }

        let height = self.table_height();
        let required = self.rows_for(streams);
        if required > height {
            return Err(BindingError::CapacityOverflow { required, height });
        }

        let mut hash_num = Vec::with_capacity(required);
        let mut index = Vec::with_capacity(required);
        let mut limb = Vec::with_capacity(required);
        let mut n_bytes = Vec::with_capacity(required);
        let mut to_hash = Vec::with_capacity(required);

        for (i, stream) in streams.iter().enumerate() {
            let chunks: Vec<&[u8]> = if stream.is_empty() {
                vec![stream.as_slice()]
            } else {
                stream.chunks(self.limb_bytes).collect()
            };
            for (j, chunk) in chunks.into_iter().enumerate() {
                hash_num.push(F::from_u64(i as u64 + 1));
                index.push(F::from_u64(j as u64));
                limb.push(element_from_be_bytes::<F>(chunk));
                n_bytes.push(F::from_u64(chunk.len() as u64));
                to_hash.push(F::one());
            }
        }
        Ok([hash_num, index, limb, n_bytes, to_hash])
    }
}

fn small_value<F: Field>(value: &F, row: usize, what: &str) -> Result<usize> {
    value
        .to_u64()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| BindingError::MalformedStream {
            row,
            reason: format!("{} value {} out of range", what, value),
        })
}

impl ByteStreamSource for DataModule {
    fn scan_streams<S: ColumnStore + ?Sized>(&self, store: &S) -> Result<Vec<Vec<u8>>> {
        let hash_num = store.column(&self.hash_num)?.to_vec();
        let index = store.column(&self.index)?.to_vec();
        let limb = store.column(&self.limb)?.to_vec();
        let n_bytes = store.column(&self.n_bytes)?.to_vec();
        let to_hash = store.column(&self.to_hash)?.to_vec();

        let mut streams: Vec<Vec<u8>> = Vec::new();
        // INDEX expected on the next row of the open stream
        let mut next_index = 0usize;
        for row in 0..to_hash.len() {
            if to_hash[row].is_zero() {
                continue;
            }
            if !to_hash[row].is_one() {
                return Err(BindingError::MalformedStream {
                    row,
                    reason: format!("TO_HASH must be 0 or 1, found {}", to_hash[row]),
                });
            }

            let idx = small_value(&index[row], row, "INDEX")?;
            let n = small_value(&n_bytes[row], row, "NBYTES")?;
            let num = small_value(&hash_num[row], row, "HASH_NUM")?;

            if idx == 0 {
                streams.push(Vec::new());
            } else if idx != next_index {
                return Err(BindingError::MalformedStream {
                    row,
                    reason: format!("INDEX {} where {} was expected", idx, next_index),
                });
            }
            next_index = idx + 1;
            if num != streams.len() {
                return Err(BindingError::MalformedStream {
                    row,
                    reason: format!("HASH_NUM {} does not follow stream {}", num, streams.len()),
                });
            }
            if n > self.limb_bytes {
                return Err(BindingError::MalformedStream {
                    row,
                    reason: format!("NBYTES {} exceeds limb width {}", n, self.limb_bytes),
                });
            }
            let bytes = element_to_be_bytes(&limb[row], n).ok_or_else(|| {
                BindingError::MalformedStream {
                    row,
                    reason: format!("LIMB does not fit in {} bytes", n),
                }
            })?;

            // num == streams.len() >= 1 here, so a stream is open
            if let Some(current) = streams.last_mut() {
                current.extend_from_slice(&bytes);
            }
        }
        Ok(streams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ProverRun, TableSchema};
    use txhash_spec::{Bn254Scalar, Mersenne31, TableError};

    fn module(height: usize, limb_bytes: usize) -> (TableSchema, DataModule) {
        let mut schema = TableSchema::new("test");
        let data = DataModule::declare(&mut schema, "RLP_TXN", height, limb_bytes).unwrap();
        (schema, data)
    }

    #[test]
    fn test_stream_list() {
        let mut list = StreamList::default();
        assert!(list.is_empty());
        list.push(b"abc".to_vec());
        list.push(Vec::new());
        assert_eq!(list.len(), 2);

        let schema = TableSchema::new("t");
        let run = ProverRun::<Mersenne31>::new(&schema);
        let streams = list.scan_streams(&run).unwrap();
        assert_eq!(streams, vec![b"abc".to_vec(), vec![]]);
    }

    #[test]
    fn test_declare_data_module() {
        let (schema, data) = module(8, 16);
        assert_eq!(schema.num_columns(), 5);
        assert_eq!(data.limb.id().as_str(), "test.RLP_TXN_LIMB");
        assert_eq!(data.table_height(), 8);
        assert_eq!(data.limb_bytes(), 16);
    }

    #[test]
    fn test_zero_limb_width_rejected() {
        let mut schema = TableSchema::new("t");
        let err = DataModule::declare(&mut schema, "X", 4, 0).unwrap_err();
        assert!(matches!(
            err,
            BindingError::Table(TableError::InvalidConfig(ConfigError::ZeroLimbWidth))
        ));
    }

    #[test]
    fn test_rows_for() {
        let (_, data) = module(8, 4);
        let streams = vec![vec![1u8; 9], vec![], vec![2u8; 4]];
        assert_eq!(data.rows_for(&streams), 3 + 1 + 1);
    }

    #[test]
    fn test_limb_layout() {
        let (schema, data) = module(6, 2);
        let mut run = ProverRun::<Mersenne31>::new(&schema);
        let streams = vec![vec![0x01, 0x02, 0x03], vec![]];
        data.assign_streams(&mut run, &streams).unwrap();

        let col = |c: &Column| -> Vec<u32> {
            run.column(c).unwrap().iter().map(|e| e.value()).collect()
        };
        assert_eq!(col(&data.hash_num), vec![1, 1, 2, 0, 0, 0]);
        assert_eq!(col(&data.index), vec![0, 1, 0, 0, 0, 0]);
        assert_eq!(col(&data.limb), vec![0x0102, 0x03, 0, 0, 0, 0]);
        assert_eq!(col(&data.n_bytes), vec![2, 1, 0, 0, 0, 0]);
        assert_eq!(col(&data.to_hash), vec![1, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_scan_round_trip() {
        let (schema, data) = module(16, 16);
        let mut run = ProverRun::<Bn254Scalar>::new(&schema);
        let streams = vec![
            (0u8..40).collect::<Vec<_>>(),
            vec![],
            vec![0x00, 0x00, 0x05],
            vec![0xff; 16],
        ];
        data.assign_streams(&mut run, &streams).unwrap();
        assert_eq!(data.scan_streams(&run).unwrap(), streams);
    }

    #[test]
    fn test_leading_zero_bytes_preserved() {
        let (schema, data) = module(4, 2);
        let mut run = ProverRun::<Mersenne31>::new(&schema);
        let streams = vec![vec![0x00, 0x00, 0x00]];
        data.assign_streams(&mut run, &streams).unwrap();
        assert_eq!(data.scan_streams(&run).unwrap(), streams);
    }

    #[test]
    fn test_capacity_overflow() {
        let (schema, data) = module(2, 2);
        let mut run = ProverRun::<Mersenne31>::new(&schema);
        let err = data
            .assign_streams(&mut run, &[vec![1, 2, 3, 4, 5]])
            .unwrap_err();
        assert!(matches!(
            err,
            BindingError::CapacityOverflow {
                required: 3,
                height: 2
            }
        ));
        assert_eq!(run.num_assigned(), 0);
    }

    #[test]
    fn test_limb_exceeds_field_capacity() {
        let (schema, data) = module(4, 16);
        let mut run = ProverRun::<Mersenne31>::new(&schema);
        let err = data.assign_streams(&mut run, &[vec![1]]).unwrap_err();
        assert!(matches!(
            err,
            BindingError::Table(TableError::InvalidConfig(
                ConfigError::LimbExceedsFieldCapacity { .. }
            ))
        ));
    }

    #[test]
    fn test_scan_unassigned_fails() {
        let (schema, data) = module(4, 2);
        let run = ProverRun::<Mersenne31>::new(&schema);
        let err = data.scan_streams(&run).unwrap_err();
        assert!(matches!(err, BindingError::Table(TableError::NotAssigned(_))));
    }

    #[test]
    fn test_scan_rejects_malformed_rows() {
        let (schema, data) = module(2, 2);
        let mut run = ProverRun::<Mersenne31>::new(&schema);
        let m = Mersenne31::new;
        // continuation row without a stream start
        run.assign_columns(vec![
            (data.hash_num.clone(), ColumnVector::Regular(vec![m(1), m(0)])),
            (data.index.clone(), ColumnVector::Regular(vec![m(1), m(0)])),
            (data.limb.clone(), ColumnVector::Regular(vec![m(7), m(0)])),
            (data.n_bytes.clone(), ColumnVector::Regular(vec![m(1), m(0)])),
            (data.to_hash.clone(), ColumnVector::Regular(vec![m(1), m(0)])),
        ])
        .unwrap();
        let err = data.scan_streams(&run).unwrap_err();
        assert!(matches!(err, BindingError::MalformedStream { row: 0, .. }));
    }

    #[test]
    fn test_scan_rejects_non_boolean_flag() {
        let (schema, data) = module(1, 2);
        let mut run = ProverRun::<Mersenne31>::new(&schema);
        let m = Mersenne31::new;
        run.assign_columns(vec![
            (data.hash_num.clone(), ColumnVector::Regular(vec![m(1)])),
            (data.index.clone(), ColumnVector::Regular(vec![m(0)])),
            (data.limb.clone(), ColumnVector::Regular(vec![m(7)])),
            (data.n_bytes.clone(), ColumnVector::Regular(vec![m(1)])),
            (data.to_hash.clone(), ColumnVector::Regular(vec![m(2)])),
        ])
        .unwrap();
        let err = data.scan_streams(&run).unwrap_err();
        assert!(err.to_string().contains("TO_HASH must be 0 or 1"));
    }

    fn assign_raw(run: &mut ProverRun<'_, Mersenne31>, data: &DataModule, rows: [Vec<u32>; 5]) {
        let [hash_num, index, limb, n_bytes, to_hash] =
            rows.map(|r| ColumnVector::Regular(r.into_iter().map(Mersenne31::new).collect()));
        run.assign_columns(vec![
            (data.hash_num.clone(), hash_num),
            (data.index.clone(), index),
            (data.limb.clone(), limb),
            (data.n_bytes.clone(), n_bytes),
            (data.to_hash.clone(), to_hash),
        ])
        .unwrap();
    }

    #[test]
    fn test_scan_rejects_skipped_index() {
        let (schema, data) = module(3, 2);
        let mut run = ProverRun::<Mersenne31>::new(&schema);
        assign_raw(
            &mut run,
            &data,
            [
                vec![1, 1, 1],
                vec![0, 7, 7],
                vec![0x41, 0x42, 0x43],
                vec![1, 1, 1],
                vec![1, 1, 1],
            ],
        );
        let err = data.scan_streams(&run).unwrap_err();
        assert!(matches!(err, BindingError::MalformedStream { row: 1, .. }));
        assert!(err.to_string().contains("INDEX 7 where 1 was expected"));
    }

    #[test]
    fn test_scan_rejects_repeated_index() {
        let (schema, data) = module(3, 2);
        let mut run = ProverRun::<Mersenne31>::new(&schema);
        assign_raw(
            &mut run,
            &data,
            [
                vec![1, 1, 1],
                vec![0, 1, 1],
                vec![0x41, 0x42, 0x43],
                vec![1, 1, 1],
                vec![1, 1, 1],
            ],
        );
        let err = data.scan_streams(&run).unwrap_err();
        assert!(matches!(err, BindingError::MalformedStream { row: 2, .. }));
    }

    #[test]
    fn test_scan_accepts_consecutive_index() {
        let (schema, data) = module(4, 1);
        let mut run = ProverRun::<Mersenne31>::new(&schema);
        assign_raw(
            &mut run,
            &data,
            [
                vec![1, 1, 2, 2],
                vec![0, 1, 0, 1],
                vec![0x41, 0x42, 0x43, 0x44],
                vec![1, 1, 1, 1],
                vec![1, 1, 1, 1],
            ],
        );
        assert_eq!(
            data.scan_streams(&run).unwrap(),
            vec![b"AB".to_vec(), b"CD".to_vec()]
        );
    }
}
