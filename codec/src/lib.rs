//! Binary level file codec.
//!
//! Decodes level files into the [`level::Level`] model and encodes the
//! model back to bytes. The outer file structure is byte oriented; segment
//! bodies are bit-packed and regions are zlib compressed.
//!
//! # Design Principles
//!
//! - **Terminal errors** - A decode either returns a complete level or an
//!   error; no partially populated model escapes.
//! - **Bounded decoding** - Counts and sizes from the input are checked
//!   against [`DecodeLimits`] before allocation or decompression.
//! - **Deterministic encoding** - Collections are emitted in key order, so
//!   `encode(decode(bytes)) == bytes` for files this encoder produced.
//!
//! # Example
//!
//! ```
//! use codec::{decode_level, encode_level, DecodeLimits};
//! use level::{Level, Tile, TileShape};
//!
//! let mut level = Level::new();
//! level.set_name(&b"roundtrip"[..]);
//! level.set_tile(19, 0, 0, Tile::new(TileShape::Full));
//! level.compute_edges();
//!
//! let bytes = encode_level(&mut level).unwrap();
//! let decoded = decode_level(&bytes, &DecodeLimits::default()).unwrap();
//! assert_eq!(decoded.name(), b"roundtrip");
//! ```

mod error;
mod format;
mod limits;
mod reader;
mod writer;

pub use error::{CodecError, CodecResult};
pub use limits::DecodeLimits;
pub use reader::decode_level;
pub use writer::encode_level;

#[cfg(test)]
mod tests {
    use super::*;
    use level::{Level, Tile, TileShape};

    #[test]
    fn doctest_example() {
        let mut level = Level::new();
        level.set_name(&b"roundtrip"[..]);
        level.set_tile(19, 0, 0, Tile::new(TileShape::Full));
        level.compute_edges();

        let bytes = encode_level(&mut level).unwrap();
        let decoded = decode_level(&bytes, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded.name(), b"roundtrip");
    }
}
