//! Hash trace generation
//!
//! A trace generator digests every logical stream, in order, and reports the
//! digests together with the number of hash blocks each stream consumed. The
//! hash engine's own round layout is not modelled here.
//!
//! | engine     | digest | block (rate) |
//! |------------|--------|--------------|
//! | Keccak-256 | 32 B   | 136 B        |
//! | SHA-256    | 32 B   | 64 B         |

use crate::error::{BindingError, Result};
use sha2::Sha256;
use sha3::{Digest, Keccak256};
use txhash_spec::DigestLayout;

/// Keccak-256 sponge rate in bytes
pub const KECCAK_RATE_BYTES: usize = 136;

/// SHA-256 message block size in bytes
pub const SHA256_BLOCK_BYTES: usize = 64;

/// Digests of an ordered list of streams
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashTrace {
    /// One digest per stream, in stream order
    pub digests: Vec<Vec<u8>>,
    /// Hash blocks consumed by each stream
    pub blocks: Vec<usize>,
}

impl HashTrace {
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn total_blocks(&self) -> usize {
        self.blocks.iter().sum()
    }
}

/// Produces the ordered digests of a list of byte streams
pub trait HashTraceGenerator {
    /// Shape of every digest in the trace
    fn digest_layout(&self) -> DigestLayout;

    /// Digest `streams` in order: exactly one digest per stream.
    fn generate_trace(&self, streams: &[Vec<u8>]) -> Result<HashTrace>;
}

impl<T: HashTraceGenerator + ?Sized> HashTraceGenerator for &T {
    fn digest_layout(&self) -> DigestLayout {
        (**self).digest_layout()
    }

    fn generate_trace(&self, streams: &[Vec<u8>]) -> Result<HashTrace> {
        (**self).generate_trace(streams)
    }
}

/// Keccak-256 over each stream
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256Trace;

/// Number of Keccak-f permutations to absorb `len` bytes (padding always adds a block boundary)
pub fn keccak_blocks(len: usize) -> usize {
    len / KECCAK_RATE_BYTES + 1
}

impl HashTraceGenerator for Keccak256Trace {
    fn digest_layout(&self) -> DigestLayout {
        DigestLayout::KECCAK256
    }

    fn generate_trace(&self, streams: &[Vec<u8>]) -> Result<HashTrace> {
        let digests = streams
            .iter()
            .map(|s| Keccak256::digest(s).to_vec())
            .collect();
        let blocks = streams.iter().map(|s| keccak_blocks(s.len())).collect();
        Ok(HashTrace { digests, blocks })
    }
}

/// SHA-256 over each stream
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Trace;

/// Number of SHA-256 compressions for a `len`-byte message (0x80 byte plus 8-byte length)
pub fn sha256_blocks(len: usize) -> usize {
    (len + 9).div_ceil(SHA256_BLOCK_BYTES)
}

impl HashTraceGenerator for Sha256Trace {
    fn digest_layout(&self) -> DigestLayout {
        DigestLayout::SHA256
    }

    fn generate_trace(&self, streams: &[Vec<u8>]) -> Result<HashTrace> {
        let digests = streams
            .iter()
            .map(|s| Sha256::digest(s).to_vec())
            .collect();
        let blocks = streams.iter().map(|s| sha256_blocks(s.len())).collect();
        Ok(HashTrace { digests, blocks })
    }
}

/// Digests computed ahead of time by an external engine, replayed in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecomputedTrace {
    layout: DigestLayout,
    digests: Vec<Vec<u8>>,
}

impl PrecomputedTrace {
    pub fn new(layout: DigestLayout, digests: Vec<Vec<u8>>) -> Self {
        Self { layout, digests }
    }
}

impl HashTraceGenerator for PrecomputedTrace {
    fn digest_layout(&self) -> DigestLayout {
        self.layout
    }

    fn generate_trace(&self, streams: &[Vec<u8>]) -> Result<HashTrace> {
        if streams.len() != self.digests.len() {
            return Err(BindingError::TraceLength {
                streams: streams.len(),
                digests: self.digests.len(),
            });
        }
        Ok(HashTrace {
            digests: self.digests.clone(),
            blocks: vec![1; streams.len()],
        })
    }
}
