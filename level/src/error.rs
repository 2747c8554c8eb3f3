//! Error types for level model operations.

use std::fmt;

/// Result type for level model operations.
pub type LevelResult<T> = Result<T, LevelError>;

/// Errors raised while constructing or mutating a level.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    /// An entity or prop id is already in use.
    DuplicateId {
        /// The colliding id.
        id: u32,
    },

    /// A tile shape enumerant outside the known set.
    UnknownShape {
        /// The raw shape value.
        shape: u8,
    },

    /// This level has no backdrop layer (backdrops do not nest).
    NoBackdrop,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id } => write!(f, "id {id} is already in use"),
            Self::UnknownShape { shape } => write!(f, "unknown tile shape: {shape}"),
            Self::NoBackdrop => write!(f, "level has no backdrop"),
        }
    }
}

impl std::error::Error for LevelError {}
