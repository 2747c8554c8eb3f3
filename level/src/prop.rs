//! Prop representation.

/// A decorative prop. Props carry no behavior, only placement and art
/// selection within the prop catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    /// Layer the prop renders on.
    pub layer: u8,
    /// Sub-layer ordering within the layer.
    pub layer_sub: u8,
    /// Horizontal position in pixels.
    pub x: f64,
    /// Vertical position in pixels.
    pub y: f64,
    /// Rotation in 1/65536ths of a turn.
    pub rotation: u16,
    /// Mirrored horizontally.
    pub flip_x: bool,
    /// Mirrored vertically.
    pub flip_y: bool,
    /// Uniform scale factor.
    pub scale: f64,
    /// Catalog sprite set.
    pub prop_set: u8,
    /// Catalog group within the set.
    pub prop_group: u16,
    /// Catalog index within the group.
    pub prop_index: u16,
    /// Color variant.
    pub palette: u8,
}

impl Prop {
    /// Creates a prop with the given catalog selection at a position.
    #[must_use]
    pub fn new(x: f64, y: f64, prop_set: u8, prop_group: u16, prop_index: u16) -> Self {
        Self {
            layer: 12,
            layer_sub: 0,
            x,
            y,
            rotation: 0,
            flip_x: false,
            flip_y: false,
            scale: 1.0,
            prop_set,
            prop_group,
            prop_index,
            palette: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_prop_defaults() {
        let prop = Prop::new(480.0, 96.0, 2, 18, 3);
        assert_eq!(prop.layer, 12);
        assert!((prop.scale - 1.0).abs() < f64::EPSILON);
        assert_eq!((prop.prop_set, prop.prop_group, prop.prop_index), (2, 18, 3));
    }
}
