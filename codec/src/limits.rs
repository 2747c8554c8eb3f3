//! Configurable limits for bounded decoding of untrusted level files.

use variant::VariantLimits;

/// Limits enforced while decoding a level file.
///
/// Level files are routinely shared between players, so every count and
/// size field read from the input is checked before allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum number of regions in the region directory.
    pub max_regions: u32,

    /// Maximum uncompressed byte size of a single region body.
    pub max_region_bytes: u64,

    /// Maximum byte size of the embedded thumbnail.
    pub max_sshot_bytes: u64,

    /// Limits for variant trees (metadata and entity properties).
    pub variant: VariantLimits,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            // A region covers 256x256 tiles; real levels use a handful.
            max_regions: 4096,
            max_region_bytes: 64 * 1024 * 1024,
            max_sshot_bytes: 16 * 1024 * 1024,
            variant: VariantLimits::default(),
        }
    }
}

impl DecodeLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_regions: 16,
            max_region_bytes: 1024 * 1024,
            max_sshot_bytes: 64 * 1024,
            variant: VariantLimits::for_testing(),
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_regions: u32::MAX,
            max_region_bytes: u64::MAX,
            max_sshot_bytes: u64::MAX,
            variant: VariantLimits::unlimited(),
        }
    }
}
