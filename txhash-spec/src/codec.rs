//! Big-endian byte codec for field elements
//!
//! Digest halves enter the table as single field elements. The caller picks
//! widths within `Field::CAPACITY_BYTES` (see
//! [`BindingConfig::validate_for_field`](crate::config::BindingConfig::validate_for_field));
//! decoding reduces modulo p and never fails.

use crate::config::DigestLayout;
use crate::field::Field;

/// Decode big-endian bytes into one field element.
#[inline]
pub fn element_from_be_bytes<F: Field>(bytes: &[u8]) -> F {
    F::from_be_bytes_mod_order(bytes)
}

/// Canonical big-endian encoding of `element` in exactly `width` bytes.
///
/// Returns `None` if the canonical integer needs more than `width` bytes.
pub fn element_to_be_bytes<F: Field>(element: &F, width: usize) -> Option<Vec<u8>> {
    let raw = element.to_be_bytes();
    let significant = raw.iter().position(|&b| b != 0).unwrap_or(raw.len());
    let trimmed = &raw[significant..];
    if trimmed.len() > width {
        return None;
    }
    let mut out = vec![0u8; width - trimmed.len()];
    out.extend_from_slice(trimmed);
    Some(out)
}

/// Split a digest into its (high, low) halves and encode each one.
///
/// Returns `None` if the digest width does not match the layout.
pub fn split_digest<F: Field>(digest: &[u8], layout: &DigestLayout) -> Option<(F, F)> {
    if digest.len() != layout.digest_bytes {
        return None;
    }
    let (hi, lo) = digest.split_at(layout.half_bytes);
    Some((element_from_be_bytes(hi), element_from_be_bytes(lo)))
}

/// Rebuild digest bytes from encoded halves.
pub fn join_digest<F: Field>(hi: &F, lo: &F, layout: &DigestLayout) -> Option<Vec<u8>> {
    let mut out = element_to_be_bytes(hi, layout.half_bytes)?;
    out.extend(element_to_be_bytes(lo, layout.half_bytes)?);
    Some(out)
}
