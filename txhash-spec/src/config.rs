//! # Configuration for the transaction-hash table
//!
//! Row budgets and digest layout shared between the hash binding and the
//! upstream sub-circuit that owns the placeholder block.

use crate::field::Field;
use std::fmt;

/// Rows used by one unit of the upstream sub-circuit in the placeholder block.
///
/// The upstream producer lays out its own units with this same constant; the
/// binding never takes it from anywhere else.
pub const NB_ROWS_PER_PLACEHOLDER_UNIT: usize = 10;

/// Rows occupied by one digest (one transaction signature) in the table.
pub const NB_ROWS_PER_SIGNATURE_BLOCK: usize = 10;

/// Byte layout of a digest and its two halves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DigestLayout {
    /// Total digest width in bytes
    pub digest_bytes: usize,
    /// Width of each half in bytes (digest_bytes / 2)
    pub half_bytes: usize,
}

impl DigestLayout {
    /// Keccak-256: 32-byte digest, 16-byte halves
    pub const KECCAK256: Self = Self {
        digest_bytes: 32,
        half_bytes: 16,
    };

    /// SHA-256: same shape as Keccak-256
    pub const SHA256: Self = Self {
        digest_bytes: 32,
        half_bytes: 16,
    };

    /// Create a layout for an even digest width
    pub const fn new(digest_bytes: usize) -> Result<Self, ConfigError> {
        let layout = Self {
            digest_bytes,
            half_bytes: digest_bytes / 2,
        };
        match layout.validate() {
            Ok(()) => Ok(layout),
            Err(e) => Err(e),
        }
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.digest_bytes == 0 {
            return Err(ConfigError::EmptyDigest);
        }
        if self.digest_bytes % 2 != 0 {
            return Err(ConfigError::OddDigestWidth);
        }
        if self.half_bytes * 2 != self.digest_bytes {
            return Err(ConfigError::UnevenHalves);
        }
        Ok(())
    }
}

/// Layout configuration for the hash binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingConfig {
    /// Rows per upstream placeholder unit
    pub rows_per_placeholder_unit: usize,
    /// Rows per digest block
    pub rows_per_signature_block: usize,
    /// Digest layout produced by the hash engine
    pub digest: DigestLayout,
}

impl BindingConfig {
    /// Default configuration: shared row constants, Keccak-256 digests
    pub const DEFAULT: Self = Self {
        rows_per_placeholder_unit: NB_ROWS_PER_PLACEHOLDER_UNIT,
        rows_per_signature_block: NB_ROWS_PER_SIGNATURE_BLOCK,
        digest: DigestLayout::KECCAK256,
    };

    /// Create a new configuration with validation
    pub const fn new(
        rows_per_placeholder_unit: usize,
        rows_per_signature_block: usize,
        digest: DigestLayout,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            rows_per_placeholder_unit,
            rows_per_signature_block,
            digest,
        };
        match config.validate() {
            Ok(()) => Ok(config),
            Err(e) => Err(e),
        }
    }

    /// Validate configuration
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.rows_per_placeholder_unit == 0 {
            return Err(ConfigError::ZeroRowsPerPlaceholderUnit);
        }
        if self.rows_per_signature_block == 0 {
            return Err(ConfigError::ZeroRowsPerSignatureBlock);
        }
        self.digest.validate()
    }

    /// Validate configuration against the field the columns will hold
    pub fn validate_for_field<F: Field>(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.digest.half_bytes > F::CAPACITY_BYTES {
            return Err(ConfigError::HalfExceedsFieldCapacity {
                half_bytes: self.digest.half_bytes,
                capacity_bytes: F::CAPACITY_BYTES,
            });
        }
        Ok(())
    }

    /// Rows reserved for `nb_units` upstream units
    #[inline]
    pub const fn placeholder_rows(&self, nb_units: usize) -> usize {
        nb_units * self.rows_per_placeholder_unit
    }

    /// Rows needed for the placeholder block plus `nb_digests` blocks
    ///
    /// Returns `None` on arithmetic overflow.
    pub fn required_rows(&self, nb_units: usize, nb_digests: usize) -> Option<usize> {
        let placeholder = nb_units.checked_mul(self.rows_per_placeholder_unit)?;
        let blocks = nb_digests.checked_mul(self.rows_per_signature_block)?;
        placeholder.checked_add(blocks)
    }
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BindingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BindingConfig {{ placeholder unit: {} rows, signature block: {} rows, ",
            self.rows_per_placeholder_unit, self.rows_per_signature_block,
        )?;
        write!(
            f,
            "digest: {} bytes ({}+{}) }}",
            self.digest.digest_bytes, self.digest.half_bytes, self.digest.half_bytes,
        )
    }
}

/// Configuration error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Placeholder units must occupy at least one row
    ZeroRowsPerPlaceholderUnit,
    /// Signature blocks must occupy at least one row
    ZeroRowsPerSignatureBlock,
    /// Digest width must be non-zero
    EmptyDigest,
    /// Digest width must be even
    OddDigestWidth,
    /// Halves must be exactly half the digest
    UnevenHalves,
    /// A digest half does not fit in one field element
    HalfExceedsFieldCapacity {
        half_bytes: usize,
        capacity_bytes: usize,
    },
    /// Stream limbs must carry at least one byte
    ZeroLimbWidth,
    /// A stream limb does not fit in one field element
    LimbExceedsFieldCapacity {
        limb_bytes: usize,
        capacity_bytes: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroRowsPerPlaceholderUnit => {
                write!(f, "rows_per_placeholder_unit must be at least 1")
            }
            ConfigError::ZeroRowsPerSignatureBlock => {
                write!(f, "rows_per_signature_block must be at least 1")
            }
            ConfigError::EmptyDigest => {
                write!(f, "digest width must be non-zero")
            }
            ConfigError::OddDigestWidth => {
                write!(f, "digest width must be even")
            }
            ConfigError::UnevenHalves => {
                write!(f, "half width must be exactly half the digest width")
            }
            ConfigError::HalfExceedsFieldCapacity {
                half_bytes,
                capacity_bytes,
            } => {
                write!(
                    f,
                    "digest half of {} bytes exceeds field capacity of {} bytes",
                    half_bytes, capacity_bytes
                )
            }
            ConfigError::ZeroLimbWidth => {
                write!(f, "limb width must be at least 1 byte")
            }
            ConfigError::LimbExceedsFieldCapacity {
                limb_bytes,
                capacity_bytes,
            } => {
                write!(
                    f,
                    "limb of {} bytes exceeds field capacity of {} bytes",
                    limb_bytes, capacity_bytes
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Bn254Scalar, Mersenne31};

    #[test]
    fn test_default_config() {
        let config = BindingConfig::DEFAULT;
        assert_eq!(config.rows_per_placeholder_unit, NB_ROWS_PER_PLACEHOLDER_UNIT);
        assert_eq!(config.rows_per_signature_block, NB_ROWS_PER_SIGNATURE_BLOCK);
        assert_eq!(config.digest, DigestLayout::KECCAK256);
        assert!(config.validate().is_ok());
        assert_eq!(BindingConfig::default(), config);
    }

    #[test]
    fn test_validation() {
        assert!(BindingConfig::new(1, 1, DigestLayout::KECCAK256).is_ok());
        assert_eq!(
            BindingConfig::new(0, 3, DigestLayout::KECCAK256).unwrap_err(),
            ConfigError::ZeroRowsPerPlaceholderUnit
        );
        assert_eq!(
            BindingConfig::new(2, 0, DigestLayout::KECCAK256).unwrap_err(),
            ConfigError::ZeroRowsPerSignatureBlock
        );

        let uneven = DigestLayout {
            digest_bytes: 32,
            half_bytes: 8,
        };
        assert_eq!(
            BindingConfig::new(1, 1, uneven).unwrap_err(),
            ConfigError::UnevenHalves
        );
    }

    #[test]
    fn test_digest_layout() {
        assert_eq!(DigestLayout::new(32).unwrap(), DigestLayout::KECCAK256);
        assert_eq!(DigestLayout::new(4).unwrap().half_bytes, 2);
        assert_eq!(DigestLayout::new(0).unwrap_err(), ConfigError::EmptyDigest);
        assert_eq!(DigestLayout::new(7).unwrap_err(), ConfigError::OddDigestWidth);
    }

    #[test]
    fn test_field_capacity() {
        let config = BindingConfig::DEFAULT;
        assert!(config.validate_for_field::<Bn254Scalar>().is_ok());
        assert_eq!(
            config.validate_for_field::<Mersenne31>().unwrap_err(),
            ConfigError::HalfExceedsFieldCapacity {
                half_bytes: 16,
                capacity_bytes: 3,
            }
        );

        let small = BindingConfig::new(1, 1, DigestLayout::new(6).unwrap()).unwrap();
        assert!(small.validate_for_field::<Mersenne31>().is_ok());
    }

    #[test]
    fn test_row_arithmetic() {
        let config = BindingConfig::new(5, 3, DigestLayout::KECCAK256).unwrap();
        assert_eq!(config.placeholder_rows(0), 0);
        assert_eq!(config.placeholder_rows(2), 10);
        assert_eq!(config.required_rows(2, 4), Some(22));
        assert_eq!(config.required_rows(usize::MAX, 1), None);
        assert_eq!(config.required_rows(0, usize::MAX), None);
    }

    #[test]
    fn test_display() {
        let s = BindingConfig::DEFAULT.to_string();
        assert!(s.contains("signature block: 10 rows"));
        assert!(s.contains("digest: 32 bytes (16+16)"));

        let err = ConfigError::HalfExceedsFieldCapacity {
            half_bytes: 16,
            capacity_bytes: 3,
        };
        assert_eq!(
            err.to_string(),
            "digest half of 16 bytes exceeds field capacity of 3 bytes"
        );
    }
}
