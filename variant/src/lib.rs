//! Self-describing tagged values for the ldec level codec.
//!
//! Level metadata and per-entity properties are stored as trees of typed
//! values without a fixed schema. This crate provides the [`Variant`] model,
//! the ordered [`StructMap`], and the bit-packed wire codec for both.
//!
//! # Design Principles
//!
//! - **Closed set** - The tag space is fixed; unknown tags are hard errors.
//! - **Order preserving** - Struct entries re-encode in stored order, so
//!   decode/encode round trips are byte-exact.
//! - **Bounded decoding** - Nesting depth and array lengths are checked
//!   against [`VariantLimits`] before recursing or allocating.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//! use variant::{read_struct, write_struct, StructMap, Variant, VariantLimits};
//!
//! let mut map = StructMap::new();
//! map.insert("level_name", Variant::String(b"downhill".to_vec()));
//! map.insert("checkpoints", Variant::Int(3));
//!
//! let mut writer = BitWriter::new();
//! write_struct(&mut writer, &map).unwrap();
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! let decoded = read_struct(&mut reader, &VariantLimits::default()).unwrap();
//! assert_eq!(decoded, map);
//! ```

mod codec;
mod error;
pub mod float;
mod limits;
pub mod sixbit;
mod value;

pub use codec::{read_struct, read_value, write_struct, write_value, STRING_CHUNK_MAX};
pub use error::{VariantError, VariantResult};
pub use limits::VariantLimits;
pub use value::{StructMap, Variant, VariantKind};
