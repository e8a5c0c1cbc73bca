//! # Transaction-hash table specification types
//!
//! Core types shared by everything that builds the transaction-hash section of
//! a fixed-height constraint table.
//!
//! ## Contents
//! - Prime fields (`Mersenne31`, `Bn254Scalar`) behind the [`Field`] trait
//! - Big-endian codec from digest halves to field elements
//! - Column identities and column values
//! - Row-budget and digest-layout configuration

pub mod field;
pub mod codec;
pub mod column;
pub mod config;
pub mod error;

pub use field::{Bn254Scalar, Field, Mersenne31, NonCanonicalElement, MERSENNE31_PRIME};
pub use codec::{element_from_be_bytes, element_to_be_bytes, join_digest, split_digest};
pub use column::{Column, ColumnId, ColumnVector};
pub use config::{
    BindingConfig, ConfigError, DigestLayout, NB_ROWS_PER_PLACEHOLDER_UNIT,
    NB_ROWS_PER_SIGNATURE_BLOCK,
};
pub use error::TableError;
