//! Edge connectivity: derives per-edge solidity, visibility, and cap flags
//! from the tile grid.
//!
//! The computation is purely shape-driven. Which edges a tile has comes from
//! [`SHAPE_ORDERED_SIDES`]; where those edges sit comes from the vertex
//! table. Stored edge flags are never consulted, so the pass is idempotent
//! and safe to re-run after any batch of tile edits.
//!
//! Rules, per edge:
//!
//! - **solid**: the shape tracks an edge on that side.
//! - **visible**: solid, and not an interior edge. An edge is interior only
//!   when it spans a full cell boundary and the neighbor across that
//!   boundary has a facing edge spanning the same full boundary. Partial
//!   overlaps stay visible.
//! - **caps**: one flag per corner of a solid visible edge. A corner gets a
//!   cap unless some other solid visible edge on the layer continues the
//!   surface through that corner in the same direction.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::tile::{side_vertexes, Tile, TileSide, SHAPE_ORDERED_SIDES};

type TileKey = (u8, i32, i32);

/// A directed surface point: layer, global corner in half-tile units, and
/// the unit direction of travel along the edge.
type SurfacePoint = (u8, i64, i64, i32, i32);

/// Recomputes the derived edge flags for every tile in the grid.
pub fn compute_edges(tiles: &mut BTreeMap<TileKey, Tile>) {
    // Solidity and visibility depend only on shapes, so they are decided
    // first against an immutable grid, then applied.
    let mut flags: HashMap<TileKey, [(bool, bool); 4]> = HashMap::with_capacity(tiles.len());
    for (&(layer, x, y), tile) in tiles.iter() {
        let mut tile_flags = [(false, false); 4];
        for side in TileSide::ALL {
            let solid = has_edge(tile, side);
            let visible = solid && !is_interior(tiles, layer, x, y, tile, side);
            tile_flags[side as usize] = (solid, visible);
        }
        flags.insert((layer, x, y), tile_flags);
    }

    // Index every solid visible edge by its directed endpoints. An edge
    // running A -> B (clockwise corner order) continues a surface that ends
    // at A with the same direction, and is continued by one starting at B.
    let mut starts: HashSet<SurfacePoint> = HashSet::new();
    let mut ends: HashSet<SurfacePoint> = HashSet::new();
    for (&(layer, x, y), tile) in tiles.iter() {
        for side in TileSide::ALL {
            let (solid, visible) = flags[&(layer, x, y)][side as usize];
            if !solid || !visible {
                continue;
            }
            let (a, b, dir) = global_edge(x, y, tile, side);
            starts.insert((layer, a.0, a.1, dir.0, dir.1));
            ends.insert((layer, b.0, b.1, dir.0, dir.1));
        }
    }

    for (&(layer, x, y), tile) in tiles.iter_mut() {
        for side in TileSide::ALL {
            let (solid, visible) = flags[&(layer, x, y)][side as usize];
            let caps = if solid && visible {
                let (a, b, dir) = global_edge(x, y, tile, side);
                [
                    !ends.contains(&(layer, a.0, a.1, dir.0, dir.1)),
                    !starts.contains(&(layer, b.0, b.1, dir.0, dir.1)),
                ]
            } else {
                [false, false]
            };
            let edge = tile.edge_mut(side);
            edge.solid = solid;
            edge.visible = visible;
            edge.caps = caps;
        }
    }
}

/// Whether the shape tracks an edge on this side.
fn has_edge(tile: &Tile, side: TileSide) -> bool {
    SHAPE_ORDERED_SIDES[tile.shape as usize].contains(&side)
}

/// Whether an edge spans the full cell boundary on its side of the cell.
fn spans_boundary(tile: &Tile, side: TileSide) -> bool {
    let (a, b) = side_vertexes(tile.shape, side);
    match side {
        TileSide::Top => a.1 == 0 && b.1 == 0,
        TileSide::Bottom => a.1 == 2 && b.1 == 2,
        TileSide::Left => a.0 == 0 && b.0 == 0,
        TileSide::Right => a.0 == 2 && b.0 == 2,
    }
}

/// Whether this edge is shared with a geometrically complementary neighbor
/// edge and therefore hidden.
fn is_interior(
    tiles: &BTreeMap<TileKey, Tile>,
    layer: u8,
    x: i32,
    y: i32,
    tile: &Tile,
    side: TileSide,
) -> bool {
    if !spans_boundary(tile, side) {
        return false;
    }
    let (dx, dy) = side.neighbor_offset();
    let Some(neighbor) = tiles.get(&(layer, x + dx, y + dy)) else {
        return false;
    };
    let facing = side.opposite();
    has_edge(neighbor, facing) && spans_boundary(neighbor, facing)
}

/// An edge's two global corners (half-tile units) and its normalized
/// direction, in clockwise corner order.
fn global_edge(x: i32, y: i32, tile: &Tile, side: TileSide) -> ((i64, i64), (i64, i64), (i32, i32)) {
    let (a, b) = side_vertexes(tile.shape, side);
    let ga = (i64::from(x) * 2 + i64::from(a.0), i64::from(y) * 2 + i64::from(a.1));
    let gb = (i64::from(x) * 2 + i64::from(b.0), i64::from(y) * 2 + i64::from(b.1));
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let g = gcd(dx.unsigned_abs(), dy.unsigned_abs()).max(1) as i32;
    (ga, gb, (dx / g, dy / g))
}

const fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
