//! # Transaction-hash binding
//!
//! Fills the transaction-hash section of a fixed-height constraint table.
//!
//! For each transaction byte stream the binding writes one block of rows
//! holding the two halves of the stream's digest and a flag on the block's
//! first row. A leading placeholder block belongs to an upstream sub-circuit
//! and is left zero, and the rest of the table is zero-padded. The hash circuit
//! consumes the columns through a [`GenericByteModule`] descriptor.
//!
//! ## Example
//!
//! ```rust
//! use txhash_binding::{HashBinding, Keccak256Trace, ProverRun, StreamList, TableSchema};
//! use txhash_spec::{BindingConfig, Bn254Scalar};
//!
//! let mut schema = TableSchema::new("ecdsa");
//! let binding =
//!     HashBinding::declare(&mut schema, "TX_SIGNATURE", 64, BindingConfig::DEFAULT).unwrap();
//! let source = StreamList::new(vec![b"tx-0".to_vec(), b"tx-1".to_vec()]);
//!
//! let mut run = ProverRun::<Bn254Scalar>::new(&schema);
//! let summary = binding.assign(&mut run, &source, &Keccak256Trace, 1).unwrap();
//! assert_eq!(summary.used_rows, 10 + 2 * 10);
//! ```

pub mod error;
pub mod store;
pub mod stream;
pub mod trace;
pub mod binding;
pub mod descriptor;

pub use error::BindingError;
pub use store::{ColumnDeclarer, ColumnStore, ProverRun, TableSchema, TableSnapshot};
pub use stream::{ByteStreamSource, DataModule, StreamList, DEFAULT_LIMB_BYTES};
pub use trace::{HashTrace, HashTraceGenerator, Keccak256Trace, PrecomputedTrace, Sha256Trace};
pub use binding::{
    layout_hash_columns, AssignmentSummary, HashBinding, HashColumns, TX_SIGNATURE_PREFIX,
};
pub use descriptor::{collect_hash_claims, ByteHashModule, GenericByteModule, HashClaim, InfoModule};
