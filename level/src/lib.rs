//! In-memory level model for the ldec codec.
//!
//! A [`Level`] holds a sparse tile grid keyed by `(layer, x, y)`, entities
//! and props keyed by id, and a free-form metadata map of
//! [`variant`] values. The model is format-agnostic: wire encoding and
//! decoding live in the `codec` crate.
//!
//! # Design Principles
//!
//! - **Derived flags are cache** - Per-edge solidity, visibility, and cap
//!   flags can always be recomputed from shapes via
//!   [`Level::compute_edges`]; stale flags are never trusted.
//! - **Deterministic collections** - Tiles, entities, and props live in
//!   ordered maps so iteration (and therefore re-encoding) is stable.
//! - **Explicit collision policy** - Placing a tile on an occupied
//!   coordinate replaces it and returns the old tile; reusing an entity or
//!   prop id is an error.

mod edges;
mod entity;
mod error;
mod level;
mod prop;
pub mod tile;

pub use entity::Entity;
pub use error::{LevelError, LevelResult};
pub use level::Level;
pub use prop::Prop;
pub use tile::{Tile, TileEdgeData, TileShape, TileSide};
