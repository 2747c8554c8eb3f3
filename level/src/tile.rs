//! Tile representation and shape geometry tables.
//!
//! A tile's position (layer, x, y) lives in the containing [`Level`]; the
//! tile itself stores its shape, sprite selection, and per-edge data. The
//! wire format packs edge data into a fixed 12-byte record, with a second
//! 12-byte record for filth (dust/spikes) on edges.
//!
//! [`Level`]: crate::Level

use crate::error::{LevelError, LevelResult};

/// One side of a tile, using the engine's own side indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TileSide {
    Top = 0,
    Bottom = 1,
    Left = 2,
    Right = 3,
}

impl TileSide {
    /// All sides in index order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    /// The side facing this one on a neighboring tile.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Grid offset of the neighbor across this side.
    #[must_use]
    pub const fn neighbor_offset(self) -> (i32, i32) {
        match self {
            Self::Top => (0, -1),
            Self::Bottom => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Tile shapes: the full block, eight big/small slant pairs, and four
/// half-tile slopes. The discriminants match the wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum TileShape {
    Full = 0,
    Big1 = 1,
    Small1 = 2,
    Big2 = 3,
    Small2 = 4,
    Big3 = 5,
    Small3 = 6,
    Big4 = 7,
    Small4 = 8,
    Big5 = 9,
    Small5 = 10,
    Big6 = 11,
    Small6 = 12,
    Big7 = 13,
    Small7 = 14,
    Big8 = 15,
    Small8 = 16,
    HalfA = 17,
    HalfB = 18,
    HalfC = 19,
    HalfD = 20,
}

impl TileShape {
    /// Number of distinct shapes.
    pub const COUNT: usize = 21;

    /// Converts a raw shape value, failing on out-of-range enumerants.
    pub const fn from_raw(raw: u8) -> LevelResult<Self> {
        Ok(match raw {
            0 => Self::Full,
            1 => Self::Big1,
            2 => Self::Small1,
            3 => Self::Big2,
            4 => Self::Small2,
            5 => Self::Big3,
            6 => Self::Small3,
            7 => Self::Big4,
            8 => Self::Small4,
            9 => Self::Big5,
            10 => Self::Small5,
            11 => Self::Big6,
            12 => Self::Small6,
            13 => Self::Big7,
            14 => Self::Small7,
            15 => Self::Big8,
            16 => Self::Small8,
            17 => Self::HalfA,
            18 => Self::HalfB,
            19 => Self::HalfC,
            20 => Self::HalfD,
            shape => return Err(LevelError::UnknownShape { shape }),
        })
    }

    /// The wire value of this shape.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }
}

/// Data stored on each tile edge. Paired attributes correspond to the two
/// corners of the edge, ordered clockwise around the tile (the tile is on
/// your right walking from the first corner to the second).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileEdgeData {
    /// Does this edge produce collisions.
    pub solid: bool,
    /// Is this edge drawn.
    pub visible: bool,
    /// Should an edge cap be drawn at each corner.
    pub caps: [bool; 2],
    /// Edge join angle at each corner, ignored when the cap flag is set.
    pub angles: [i8; 2],
    /// Sprite set of filth on this edge, 0 for none.
    pub filth_sprite_set: u8,
    /// Spikes rather than dust, meaningful only with a filth sprite set.
    pub filth_spike: bool,
    /// Filth cap flags per corner.
    pub filth_caps: [bool; 2],
    /// Filth join angles per corner.
    pub filth_angles: [i8; 2],
}

/// A single tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tile {
    /// The tile's shape.
    pub shape: TileShape,
    /// Raw 3-bit engine flag field. In practice always 0x4 (solid).
    pub tile_flags: u8,
    /// Edge data for all four sides, present regardless of shape.
    pub edge_data: [TileEdgeData; 4],
    /// Sprite set the tile art comes from.
    pub sprite_set: u8,
    /// Tile index within the sprite set.
    pub sprite_tile: u8,
    /// Color variant of the tile art.
    pub sprite_palette: u8,
}

impl Default for Tile {
    fn default() -> Self {
        Self::new(TileShape::Full)
    }
}

impl Tile {
    /// Creates a virtual tile of the given shape with zeroed edges and the
    /// default sprite.
    #[must_use]
    pub fn new(shape: TileShape) -> Self {
        Self {
            shape,
            tile_flags: 0x4,
            edge_data: [TileEdgeData::default(); 4],
            sprite_set: 5,
            sprite_tile: 1,
            sprite_palette: 0,
        }
    }

    /// Edge data for one side.
    #[must_use]
    pub const fn edge(&self, side: TileSide) -> &TileEdgeData {
        &self.edge_data[side as usize]
    }

    /// Mutable edge data for one side.
    pub fn edge_mut(&mut self, side: TileSide) -> &mut TileEdgeData {
        &mut self.edge_data[side as usize]
    }

    /// True if any edge carries filth.
    #[must_use]
    pub fn has_filth(&self) -> bool {
        self.edge_data.iter().any(|edge| edge.filth_sprite_set != 0)
    }

    /// True if the sprite selection is the dustblock tile of its sprite set.
    #[must_use]
    pub fn is_dustblock(&self) -> bool {
        usize::from(self.sprite_set) < DUSTBLOCK_TILES.len()
            && DUSTBLOCK_TILES[usize::from(self.sprite_set)] == Some(self.sprite_tile)
    }

    /// Packs edge flags, angles, and sprite selection into the 12-byte wire
    /// record.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn pack_tile_data(&self) -> [u8; 12] {
        let mut data = [0u8; 12];
        for (side, edge) in self.edge_data.iter().enumerate() {
            let flags = [edge.solid, edge.visible, edge.caps[0], edge.caps[1]];
            let mut offsets = [side, 4 + side, 8 + 2 * side, 9 + 2 * side];
            let mut angles = edge.angles;
            // Left and bottom edges store their corner pairs in reverse.
            if side == TileSide::Left as usize || side == TileSide::Bottom as usize {
                offsets.swap(2, 3);
                angles.swap(0, 1);
            }
            for (flag, off) in flags.into_iter().zip(offsets) {
                if flag {
                    data[off >> 3] |= 1 << (off & 7);
                }
            }
            data[2 + side * 2] = angles[0] as u8;
            data[3 + side * 2] = angles[1] as u8;
        }
        data[10] = (self.sprite_set & 0xF) | (self.sprite_palette << 4);
        data[11] = self.sprite_tile;
        data
    }

    /// Unpacks a 12-byte tile record into edge flags, angles, and sprite
    /// selection.
    #[allow(clippy::cast_possible_wrap)]
    pub fn unpack_tile_data(&mut self, data: &[u8; 12]) {
        let test = |off: usize| data[off >> 3] & (1 << (off & 7)) != 0;
        for (side, edge) in self.edge_data.iter_mut().enumerate() {
            edge.solid = test(side);
            edge.visible = test(4 + side);
            edge.caps = [test(8 + 2 * side), test(9 + 2 * side)];
            edge.angles = [data[2 + side * 2] as i8, data[3 + side * 2] as i8];
            if side == TileSide::Left as usize || side == TileSide::Bottom as usize {
                edge.caps.swap(0, 1);
                edge.angles.swap(0, 1);
            }
        }
        self.sprite_set = data[10] & 0xF;
        self.sprite_palette = data[10] >> 4;
        self.sprite_tile = data[11];
    }

    /// Packs per-edge filth data into the 12-byte dust wire record.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn pack_dust_data(&self) -> [u8; 12] {
        let mut data = [0u8; 12];
        for (side, edge) in self.edge_data.iter().enumerate() {
            let mut caps = edge.filth_caps;
            let mut angles = edge.filth_angles;
            if side == TileSide::Left as usize || side == TileSide::Bottom as usize {
                caps.swap(0, 1);
                angles.swap(0, 1);
            }

            let off = 4 * side;
            let nibble = (edge.filth_sprite_set & 0x7) | if edge.filth_spike { 0x8 } else { 0 };
            data[off >> 3] |= nibble << (off & 0x7);
            data[2 + side * 2] = angles[0] as u8;
            data[3 + side * 2] = angles[1] as u8;
            if caps[0] {
                data[10] |= 1 << (2 * side);
            }
            if caps[1] {
                data[10] |= 2 << (2 * side);
            }
        }
        data
    }

    /// Unpacks a 12-byte dust record into per-edge filth data.
    #[allow(clippy::cast_possible_wrap)]
    pub fn unpack_dust_data(&mut self, data: &[u8; 12]) {
        for (side, edge) in self.edge_data.iter_mut().enumerate() {
            let off = 4 * side;
            let nibble = data[off >> 3] >> (off & 0x7);
            edge.filth_sprite_set = nibble & 0x7;
            edge.filth_spike = nibble & 0x8 != 0;
            edge.filth_caps = [
                data[10] & (1 << (2 * side)) != 0,
                data[10] & (2 << (2 * side)) != 0,
            ];
            edge.filth_angles = [data[2 + side * 2] as i8, data[3 + side * 2] as i8];
            if side == TileSide::Left as usize || side == TileSide::Bottom as usize {
                edge.filth_caps.swap(0, 1);
                edge.filth_angles.swap(0, 1);
            }
        }
    }
}

/// Dustblock tile index per sprite set, `None` where the set has none.
pub const DUSTBLOCK_TILES: [Option<u8>; 8] = [
    None,     // none
    Some(21), // mansion
    Some(13), // forest
    Some(6),  // city
    Some(9),  // laboratory
    Some(2),  // tutorial
    None,     // nexus
    None,     // none
];

/// Sides of each shape in the order its polygon visits them.
///
/// For the full block this is clockwise from the top. For half tiles and
/// small slants the ordering starts on the diagonal edge. For big slants it
/// starts on the diagonal, then the opposite side, then the remaining flat
/// side.
pub const SHAPE_ORDERED_SIDES: [&[TileSide]; TileShape::COUNT] = {
    use TileSide::{Bottom, Left, Right, Top};
    [
        &[Top, Right, Bottom, Left],
        &[Top, Bottom, Left],
        &[Top, Bottom],
        &[Right, Left, Top],
        &[Right, Left],
        &[Bottom, Top, Right],
        &[Bottom, Top],
        &[Left, Right, Bottom],
        &[Left, Right],
        &[Top, Bottom, Right],
        &[Top, Bottom],
        &[Left, Right, Top],
        &[Left, Right],
        &[Bottom, Top, Left],
        &[Bottom, Top],
        &[Right, Left, Bottom],
        &[Right, Left],
        &[Top, Bottom, Left],
        &[Bottom, Left, Top],
        &[Bottom, Top, Right],
        &[Top, Right, Bottom],
    ]
};

/// Vertex coordinates of each shape in half-tile units, listed top-left,
/// top-right, bottom-right, bottom-left. Degenerate (repeated) vertexes make
/// the corresponding edge absent.
pub const SHAPE_VERTEXES: [[(i32, i32); 4]; TileShape::COUNT] = [
    [(0, 0), (2, 0), (2, 2), (0, 2)], // Full
    [(0, 0), (2, 1), (2, 2), (0, 2)], // Big1
    [(0, 1), (2, 2), (2, 2), (0, 2)], // Small1
    [(0, 0), (2, 0), (1, 2), (0, 2)], // Big2
    [(0, 0), (1, 0), (0, 2), (0, 2)], // Small2
    [(0, 0), (2, 0), (2, 2), (0, 1)], // Big3
    [(0, 0), (2, 0), (2, 1), (0, 0)], // Small3
    [(1, 0), (2, 0), (2, 2), (0, 2)], // Big4
    [(2, 0), (2, 0), (2, 2), (1, 2)], // Small4
    [(0, 1), (2, 0), (2, 2), (0, 2)], // Big5
    [(0, 2), (2, 1), (2, 2), (0, 2)], // Small5
    [(0, 0), (2, 0), (2, 2), (1, 2)], // Big6
    [(1, 0), (2, 0), (2, 2), (2, 2)], // Small6
    [(0, 0), (2, 0), (2, 1), (0, 2)], // Big7
    [(0, 0), (2, 0), (2, 0), (0, 1)], // Small7
    [(0, 0), (1, 0), (2, 2), (0, 2)], // Big8
    [(0, 0), (0, 0), (1, 2), (0, 2)], // Small8
    [(0, 0), (2, 2), (2, 2), (0, 2)], // HalfA
    [(0, 0), (2, 0), (2, 0), (0, 2)], // HalfB
    [(0, 0), (2, 0), (2, 2), (0, 0)], // HalfC
    [(0, 2), (2, 0), (2, 2), (0, 2)], // HalfD
];

/// Index of each side when the vertex list is walked clockwise. Used to pull
/// a side's two endpoints out of [`SHAPE_VERTEXES`].
pub const SIDE_CLOCKWISE_INDEX: [usize; 4] = [0, 2, 3, 1];

/// The two endpoints of a side of a shape in half-tile units, in clockwise
/// corner order. Equal endpoints mean the side is absent from the shape.
#[must_use]
pub const fn side_vertexes(shape: TileShape, side: TileSide) -> ((i32, i32), (i32, i32)) {
    let verts = SHAPE_VERTEXES[shape as usize];
    let ind = SIDE_CLOCKWISE_INDEX[side as usize];
    (verts[ind], verts[(ind + 1) % 4])
}
