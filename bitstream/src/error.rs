//! Error types for bitstream operations.

use std::fmt;

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur during bit-level encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitError {
    /// Attempted to read past the end of the buffer.
    UnexpectedEof {
        /// Number of bits requested.
        requested: usize,
        /// Number of bits available.
        available: usize,
    },

    /// Invalid bit count for the operation.
    InvalidBitCount {
        /// The invalid bit count provided.
        bits: u32,
        /// Maximum allowed bits for this operation.
        max_bits: u32,
    },

    /// Value exceeds the range representable by the specified number of bits.
    ValueOutOfRange {
        /// The value that was out of range.
        value: u64,
        /// Number of bits available.
        bits: u32,
    },

    /// Signed value exceeds the two's-complement range of the field.
    SignedOutOfRange {
        /// The value that was out of range.
        value: i64,
        /// Number of bits available.
        bits: u32,
    },

    /// Byte-aligned access attempted while the cursor sits mid-byte.
    MisalignedAccess {
        /// The bit position the cursor was at.
        bit_position: usize,
    },

    /// Seek target lies outside the written/readable range.
    SeekOutOfBounds {
        /// The requested bit position.
        target: usize,
        /// The end of the valid range in bits.
        end: usize,
    },
}

impl fmt::Display for BitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bits but only {available} bits available"
                )
            }
            Self::InvalidBitCount { bits, max_bits } => {
                write!(f, "invalid bit count {bits}, maximum allowed is {max_bits}")
            }
            Self::ValueOutOfRange { value, bits } => {
                write!(f, "value {value} cannot be represented in {bits} bits")
            }
            Self::SignedOutOfRange { value, bits } => {
                write!(
                    f,
                    "signed value {value} cannot be represented in {bits} bits"
                )
            }
            Self::MisalignedAccess { bit_position } => {
                write!(
                    f,
                    "byte-aligned access attempted at bit position {bit_position}"
                )
            }
            Self::SeekOutOfBounds { target, end } => {
                write!(f, "seek to bit {target} is past the end of the stream ({end} bits)")
            }
        }
    }
}

impl std::error::Error for BitError {}
