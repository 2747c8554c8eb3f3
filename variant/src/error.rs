//! Error types for variant encoding/decoding.

use std::fmt;

use bitstream::BitError;

/// Result type for variant operations.
pub type VariantResult<T> = Result<T, VariantError>;

/// Errors that can occur while encoding or decoding variants.
///
/// Only `PartialEq`: the `FloatOutOfRange` payload is an `f64`.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum VariantError {
    /// A type tag outside the closed set was encountered.
    UnknownTag {
        /// The raw tag value.
        tag: u8,
    },

    /// The struct-terminator tag appeared where a value was required.
    UnexpectedNull,

    /// Variant nesting exceeded the configured safety bound.
    NestingTooDeep {
        /// The configured maximum depth.
        max_depth: usize,
    },

    /// An array length field exceeded the configured bound.
    ArrayTooLong {
        /// The declared element count.
        len: usize,
        /// The configured maximum.
        max: usize,
    },

    /// An array element's kind does not match the array's declared kind.
    ElementKindMismatch {
        /// The declared element tag.
        expected: u8,
        /// The tag of the offending element.
        found: u8,
    },

    /// A struct key or 6-bit string is longer than 63 characters.
    KeyTooLong {
        /// The offending length.
        len: usize,
    },

    /// A float value cannot be represented in the fixed-point wire layout.
    FloatOutOfRange {
        /// The offending value.
        value: f64,
    },

    /// Underlying bitstream failure.
    Bit(BitError),
}

impl fmt::Display for VariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTag { tag } => write!(f, "unknown variant tag: {tag}"),
            Self::UnexpectedNull => write!(f, "unexpected null variant tag"),
            Self::NestingTooDeep { max_depth } => {
                write!(f, "variant nesting exceeds maximum depth {max_depth}")
            }
            Self::ArrayTooLong { len, max } => {
                write!(f, "array length {len} exceeds maximum {max}")
            }
            Self::ElementKindMismatch { expected, found } => {
                write!(
                    f,
                    "array element tag {found} does not match declared element tag {expected}"
                )
            }
            Self::KeyTooLong { len } => {
                write!(f, "6-bit string length {len} exceeds maximum 63")
            }
            Self::FloatOutOfRange { value } => {
                write!(f, "float value {value} cannot be encoded")
            }
            Self::Bit(err) => write!(f, "bitstream error: {err}"),
        }
    }
}

impl std::error::Error for VariantError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bit(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BitError> for VariantError {
    fn from(err: BitError) -> Self {
        Self::Bit(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_tag() {
        let err = VariantError::UnknownTag { tag: 7 };
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn display_nesting_too_deep() {
        let err = VariantError::NestingTooDeep { max_depth: 64 };
        assert!(err.to_string().contains("64"));
    }

    #[test]
    fn float_out_of_range_compares() {
        let err = VariantError::FloatOutOfRange { value: 5e9 };
        assert_eq!(err, err.clone());
        assert_ne!(err, VariantError::FloatOutOfRange { value: 6e9 });
    }

    #[test]
    fn bit_error_converts_and_sources() {
        let bit = BitError::UnexpectedEof {
            requested: 4,
            available: 0,
        };
        let err: VariantError = bit.clone().into();
        assert_eq!(err, VariantError::Bit(bit));
        assert!(std::error::Error::source(&err).is_some());
    }
}
