//! Wire-format constants shared by the reader and writer.

/// Marker at the start of a level file.
pub const LEVEL_MAGIC: &str = "DF_LVL";

/// Marker at the start of the metadata block.
pub const METADATA_MAGIC: &str = "DF_MTD";

/// File version this codec writes. Versions at or below 42 use a different
/// wire layout and are rejected on read.
pub const WRITE_VERSION: u16 = 44;

/// Version written into region headers.
pub const REGION_VERSION: u16 = 14;

/// Version written into segment headers.
pub const SEGMENT_VERSION: u16 = 8;

/// Byte size of the uncompressed region header.
pub const REGION_HEADER_BYTES: u64 = 17;

/// Bit size of the backpatched segment header.
pub const SEGMENT_HEADER_BITS: usize = 200;

/// Bit size of the metadata block.
pub const METADATA_BITS: usize = 224;

/// Layers above this are not representable in the tile block.
pub const LAYER_COUNT: u8 = 21;

/// The layer that carries gameplay collision and dust.
pub const SOLID_LAYER: u8 = 19;

/// Pixels per tile.
pub const TILE_PIXELS: f64 = 48.0;
