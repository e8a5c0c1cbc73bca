//! Prime fields for table columns
//!
//! Two fields are provided:
//! - `Mersenne31`: p = 2^31 - 1, holds up to 3 arbitrary bytes per element
//! - `Bn254Scalar`: the BN254 scalar field (254 bits), holds up to 31 bytes
//!   per element, enough for a 16-byte digest half
//!
//! Only what the table layer needs is implemented: constants and byte
//! conversion. Deserialization rejects non-canonical values.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::sync::OnceLock;

/// A prime field whose elements can be stored in table columns.
pub trait Field:
    Clone
    + fmt::Debug
    + fmt::Display
    + PartialEq
    + Eq
    + Hash
    + Send
    + Sync
    + Serialize
    + DeserializeOwned
    + 'static
{
    /// Number of arbitrary big-endian bytes that always fit below the modulus.
    const CAPACITY_BYTES: usize;

    /// Width of the canonical big-endian encoding of any element.
    const MODULUS_BYTES: usize;

    fn zero() -> Self;

    fn one() -> Self;

    fn from_u64(value: u64) -> Self;

    /// Interpret `bytes` as a big-endian integer and reduce it into the field.
    fn from_be_bytes_mod_order(bytes: &[u8]) -> Self;

    /// Big-endian bytes of the canonical integer, `MODULUS_BYTES` wide.
    fn to_be_bytes(&self) -> Vec<u8>;

    /// The canonical integer if it fits in a `u64`.
    fn to_u64(&self) -> Option<u64>;

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    fn is_one(&self) -> bool {
        *self == Self::one()
    }
}

/// Decoded integer is not below the field modulus
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Non-canonical field element: {value} is not below the modulus")]
pub struct NonCanonicalElement {
    pub value: String,
}

// ============================================================================
// Mersenne 31
// ============================================================================

/// Mersenne 31 prime: p = 2^31 - 1
pub const MERSENNE31_PRIME: u32 = (1u32 << 31) - 1;

/// Mersenne 31 field element
///
/// Values are stored in canonical form: 0 ≤ value < p
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[repr(transparent)]
pub struct Mersenne31(u32);

impl Mersenne31 {
    pub const PRIME: u32 = MERSENNE31_PRIME;
    pub const ZERO: Self = Mersenne31(0);
    pub const ONE: Self = Mersenne31(1);

    /// Create a new field element from a u32 (reduces modulo p)
    #[inline]
    pub const fn new(value: u32) -> Self {
        Mersenne31(Self::reduce(value))
    }

    /// Get the canonical value
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Reduce a u32 modulo p = 2^31 - 1
    ///
    /// For Mersenne primes: x mod (2^n - 1) = (x & (2^n - 1)) + (x >> n)
    #[inline]
    const fn reduce(x: u32) -> u32 {
        let low = x & MERSENNE31_PRIME;
        let high = x >> 31;
        let sum = low + high;

        if sum >= MERSENNE31_PRIME {
            sum - MERSENNE31_PRIME
        } else {
            sum
        }
    }

    /// Reduce a u64 modulo p
    #[inline]
    const fn reduce64(x: u64) -> u32 {
        let p = MERSENNE31_PRIME as u64;
        // two folds bring any u64 below 2^31 + 8
        let folded = (x & p) + (x >> 31);
        let folded = (folded & p) + (folded >> 31);
        Self::reduce(folded as u32)
    }
}

impl Field for Mersenne31 {
    const CAPACITY_BYTES: usize = 3;
    const MODULUS_BYTES: usize = 4;

    fn zero() -> Self {
        Self::ZERO
    }

    fn one() -> Self {
        Self::ONE
    }

    fn from_u64(value: u64) -> Self {
        Mersenne31(Self::reduce64(value))
    }

    fn from_be_bytes_mod_order(bytes: &[u8]) -> Self {
        let acc = bytes
            .iter()
            .fold(0u32, |acc, &b| Self::reduce64(((acc as u64) << 8) | b as u64));
        Mersenne31(acc)
    }

    fn to_be_bytes(&self) -> Vec<u8> {
        self.0.to_be_bytes().to_vec()
    }

    fn to_u64(&self) -> Option<u64> {
        Some(self.0 as u64)
    }
}

impl TryFrom<u32> for Mersenne31 {
    type Error = NonCanonicalElement;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value >= MERSENNE31_PRIME {
            return Err(NonCanonicalElement {
                value: value.to_string(),
            });
        }
        Ok(Mersenne31(value))
    }
}

impl From<Mersenne31> for u32 {
    fn from(element: Mersenne31) -> u32 {
        element.0
    }
}

impl fmt::Display for Mersenne31 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// BN254 scalar field
// ============================================================================

/// r = 0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001
pub const BN254_SCALAR_MODULUS: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29, 0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91, 0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00, 0x00, 0x01,
];

fn bn254_modulus() -> &'static BigUint {
    static MODULUS: OnceLock<BigUint> = OnceLock::new();
    MODULUS.get_or_init(|| BigUint::from_bytes_be(&BN254_SCALAR_MODULUS))
}

/// BN254 scalar field element, canonical (< r).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BigUint", into = "BigUint")]
pub struct Bn254Scalar(BigUint);

impl Bn254Scalar {
    pub fn modulus() -> &'static BigUint {
        bn254_modulus()
    }

    /// Reduce an arbitrary integer into the field.
    pub fn from_biguint(value: BigUint) -> Self {
        Bn254Scalar(value % bn254_modulus())
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl Field for Bn254Scalar {
    const CAPACITY_BYTES: usize = 31;
    const MODULUS_BYTES: usize = 32;

    fn zero() -> Self {
        Bn254Scalar(BigUint::zero())
    }

    fn one() -> Self {
        Bn254Scalar(BigUint::from(1u8))
    }

    fn from_u64(value: u64) -> Self {
        // every u64 is already below r
        Bn254Scalar(BigUint::from(value))
    }

    fn from_be_bytes_mod_order(bytes: &[u8]) -> Self {
        Self::from_biguint(BigUint::from_bytes_be(bytes))
    }

    fn to_be_bytes(&self) -> Vec<u8> {
        let raw = self.0.to_bytes_be();
        let mut out = vec![0u8; Self::MODULUS_BYTES.saturating_sub(raw.len())];
        out.extend_from_slice(&raw);
        out
    }

    fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<BigUint> for Bn254Scalar {
    type Error = NonCanonicalElement;

    fn try_from(value: BigUint) -> Result<Self, Self::Error> {
        if &value >= bn254_modulus() {
            return Err(NonCanonicalElement {
                value: value.to_string(),
            });
        }
        Ok(Bn254Scalar(value))
    }
}

impl From<Bn254Scalar> for BigUint {
    fn from(element: Bn254Scalar) -> BigUint {
        element.0
    }
}

impl fmt::Display for Bn254Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
