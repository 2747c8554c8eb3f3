//! Configurable limits for bounded variant decoding.

/// Limits enforced while decoding variant trees from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantLimits {
    /// Maximum struct/array nesting depth before decoding fails.
    pub max_depth: usize,

    /// Maximum declared element count for a single array.
    pub max_array_len: usize,
}

impl Default for VariantLimits {
    fn default() -> Self {
        Self {
            // Real level files nest a handful of levels deep at most; 64
            // leaves huge headroom while keeping recursion bounded.
            max_depth: 64,

            // The count field is 16 bits wide.
            max_array_len: 0xFFFF,
        }
    }
}

impl VariantLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_depth: 8,
            max_array_len: 64,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
            max_array_len: usize::MAX,
        }
    }
}
