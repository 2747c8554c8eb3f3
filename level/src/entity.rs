//! Entity representation.

use variant::StructMap;

/// A placed entity: spawn point, player, trigger, or scripted object.
///
/// The entity kind is a free-form name resolved against the game's entity
/// catalog; this model treats it as opaque. Typed per-kind accessors belong
/// in a layer above, reading and writing [`Entity::variables`].
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Catalog name of the entity kind.
    pub kind: String,
    /// Horizontal position in pixels.
    pub x: f64,
    /// Vertical position in pixels.
    pub y: f64,
    /// Rotation in 1/65536ths of a turn.
    pub rotation: u16,
    /// Layer the entity renders on.
    pub layer: u8,
    /// Mirrored horizontally.
    pub flip_x: bool,
    /// Mirrored vertically.
    pub flip_y: bool,
    /// Rendered at all.
    pub visible: bool,
    /// Free-form typed properties.
    pub variables: StructMap,
}

impl Entity {
    /// Creates an entity of the given kind at a position, unrotated and
    /// visible on the default layer.
    #[must_use]
    pub fn new(kind: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            kind: kind.into(),
            x,
            y,
            rotation: 0,
            layer: 18,
            flip_x: false,
            flip_y: false,
            visible: true,
            variables: StructMap::new(),
        }
    }
}
