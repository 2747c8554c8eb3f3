//! Error types for level file encoding/decoding.

use std::fmt;

use bitstream::BitError;
use level::LevelError;
use variant::VariantError;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while encoding or decoding a level file.
///
/// Only `PartialEq`: the wrapped variant errors carry float payloads.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CodecError {
    /// A magic marker did not match.
    BadMagic {
        /// The marker that was expected.
        expected: &'static str,
        /// The bytes actually present.
        found: Vec<u8>,
    },

    /// The file header carries a version this codec does not understand.
    UnsupportedVersion {
        /// The version from the header.
        version: u16,
    },

    /// A header field carries a structurally impossible value.
    InvalidHeader {
        /// What was wrong.
        detail: &'static str,
    },

    /// A count or size field exceeded the configured decode limit.
    LimitExceeded {
        /// Which limit was hit.
        what: &'static str,
        /// The value from the input.
        value: u64,
        /// The configured maximum.
        max: u64,
    },

    /// A region body failed to decompress.
    Compression {
        /// Decompressor failure description.
        detail: String,
    },

    /// Underlying bitstream failure.
    Bit(BitError),

    /// Variant tree failure.
    Variant(VariantError),

    /// Level model failure.
    Level(LevelError),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic { expected, found } => {
                write!(f, "expected {expected:?} marker, found {found:?}")
            }
            Self::UnsupportedVersion { version } => {
                write!(f, "unsupported level version: {version}")
            }
            Self::InvalidHeader { detail } => write!(f, "invalid header: {detail}"),
            Self::LimitExceeded { what, value, max } => {
                write!(f, "{what} {value} exceeds limit {max}")
            }
            Self::Compression { detail } => write!(f, "decompression failed: {detail}"),
            Self::Bit(err) => write!(f, "bitstream error: {err}"),
            Self::Variant(err) => write!(f, "variant error: {err}"),
            Self::Level(err) => write!(f, "level error: {err}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bit(err) => Some(err),
            Self::Variant(err) => Some(err),
            Self::Level(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BitError> for CodecError {
    fn from(err: BitError) -> Self {
        Self::Bit(err)
    }
}

impl From<VariantError> for CodecError {
    fn from(err: VariantError) -> Self {
        Self::Variant(err)
    }
}

impl From<LevelError> for CodecError {
    fn from(err: LevelError) -> Self {
        Self::Level(err)
    }
}
