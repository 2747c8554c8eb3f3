//! Inspection and transform tools for the level codec.
//!
//! Everything here is built on the public core API: summaries walk the
//! decoded [`Level`] collections, and the upscale transform derives its
//! geometry from the shape vertex tables alone.
//!
//! # Design Principles
//!
//! - **Library first** - The binary is a thin argument parser; every
//!   operation lives here where it can be tested directly.
//! - **Core API only** - No private codec hooks. A transform is decode,
//!   mutate, `compute_edges`, encode.

use std::collections::BTreeMap;

use level::tile::{side_vertexes, SHAPE_ORDERED_SIDES, SHAPE_VERTEXES};
use level::{Level, Tile, TileShape};
use serde::Serialize;

/// Decoded level statistics for the `info` command.
#[derive(Debug, Clone, Serialize)]
pub struct LevelSummary {
    pub name: String,
    pub level_type: i32,
    pub virtual_character: bool,
    pub tiles: usize,
    pub tiles_by_layer: BTreeMap<u8, usize>,
    pub entities: usize,
    pub props: usize,
    pub variables: usize,
    pub thumbnail_bytes: usize,
    pub backdrop_tiles: usize,
    pub backdrop_props: usize,
}

/// Summarizes a decoded level.
#[must_use]
pub fn inspect(level: &Level) -> LevelSummary {
    let mut tiles_by_layer: BTreeMap<u8, usize> = BTreeMap::new();
    for &(layer, _, _) in level.tiles.keys() {
        *tiles_by_layer.entry(layer).or_default() += 1;
    }
    let backdrop = level.backdrop.as_deref();
    LevelSummary {
        name: String::from_utf8_lossy(level.name()).into_owned(),
        level_type: level.level_type(),
        virtual_character: level.virtual_character(),
        tiles: level.tiles.len(),
        tiles_by_layer,
        entities: level.entities.len(),
        props: level.props.len(),
        variables: level.variables.len(),
        thumbnail_bytes: level.sshot.len(),
        backdrop_tiles: backdrop.map_or(0, |b| b.tiles.len()),
        backdrop_props: backdrop.map_or(0, |b| b.props.len()),
    }
}

/// Moves a level by a pixel offset.
pub fn translate(level: &mut Level, dx: f64, dy: f64) {
    level.translate(dx, dy);
}

/// Scales a level up by an integer factor: every tile becomes a
/// `factor` x `factor` block of tiles and all positions scale with it.
/// Edge flags are recomputed for the new grid.
pub fn upscale(level: &mut Level, factor: u32) {
    if factor <= 1 {
        return;
    }
    upscale_content(level, factor);
    level.compute_edges();
}

#[allow(clippy::cast_possible_wrap)]
fn upscale_content(level: &mut Level, factor: u32) {
    let scale = f64::from(factor);
    let f = factor as i32;

    level.tiles = std::mem::take(&mut level.tiles)
        .iter()
        .flat_map(|(&(layer, x, y), tile)| {
            upscale_tile(tile, f)
                .into_iter()
                .map(move |(dx, dy, sub)| ((layer, x * f + dx, y * f + dy), sub))
        })
        .collect();

    for entity in level.entities.values_mut() {
        entity.x *= scale;
        entity.y *= scale;
    }
    for prop in level.props.values_mut() {
        prop.x *= scale;
        prop.y *= scale;
        prop.scale *= scale;
    }
    for player in 1..=4 {
        let (x, y) = level.start_position(player);
        if (x, y) != (0, 0) {
            level.set_start_position(player, x * f, y * f);
        }
    }
    if let Some(backdrop) = level.backdrop.as_deref_mut() {
        upscale_content(backdrop, factor);
    }
}

/// One directed slant edge in half-tile units, clockwise so the solid side
/// of the shape gives a positive cross product.
#[derive(Clone, Copy)]
struct SlantCut {
    a: (i32, i32),
    b: (i32, i32),
}

const fn cross(d: (i32, i32), p: (i32, i32)) -> i32 {
    d.0 * p.1 - d.1 * p.0
}

/// The non-axis-aligned edge of a shape, if it has one.
fn slant_cut(shape: TileShape) -> Option<SlantCut> {
    let verts = SHAPE_VERTEXES[shape.raw() as usize];
    for i in 0..4 {
        let a = verts[i];
        let b = verts[(i + 1) % 4];
        if a.0 != b.0 && a.1 != b.1 {
            return Some(SlantCut { a, b });
        }
    }
    None
}

/// The shape whose slant edge is exactly the directed segment `a -> b`.
/// Directed cuts identify shapes uniquely.
fn shape_for_cut(a: (i32, i32), b: (i32, i32)) -> Option<TileShape> {
    (1..TileShape::COUNT as u8)
        .filter_map(|raw| TileShape::from_raw(raw).ok())
        .find(|&shape| slant_cut(shape).is_some_and(|cut| cut.a == a && cut.b == b))
}

/// Expands one tile into its positions within a `factor` x `factor` block.
///
/// Cells fully inside the shape become full blocks, cells fully outside are
/// omitted, and cells crossed by the slant edge become the smaller shape
/// with the same slant. Edge data is carried onto sub-cell edges that lie
/// on the original tile's edges, with per-corner caps and angles kept only
/// at the outer corners of the scaled block.
#[must_use]
pub fn upscale_tile(tile: &Tile, factor: i32) -> Vec<(i32, i32, Tile)> {
    if factor <= 1 {
        return vec![(0, 0, tile.clone())];
    }

    let cut = slant_cut(tile.shape);
    let mut out = Vec::new();

    for dy in 0..factor {
        for dx in 0..factor {
            let shape = match cut {
                None => TileShape::Full,
                Some(cut) => {
                    let af = (cut.a.0 * factor, cut.a.1 * factor);
                    let d = (cut.b.0 - cut.a.0, cut.b.1 - cut.a.1);
                    let val = |p: (i32, i32)| cross(d, (p.0 - af.0, p.1 - af.1));
                    let corners = [
                        (2 * dx, 2 * dy),
                        (2 * dx + 2, 2 * dy),
                        (2 * dx + 2, 2 * dy + 2),
                        (2 * dx, 2 * dy + 2),
                    ];
                    let min = corners.iter().map(|&p| val(p)).min().unwrap_or(0);
                    let max = corners.iter().map(|&p| val(p)).max().unwrap_or(0);
                    if min >= 0 {
                        TileShape::Full
                    } else if max <= 0 {
                        continue;
                    } else {
                        let (lp, lq) = cell_crossing(af, d, dx, dy);
                        match shape_for_cut(lp, lq) {
                            Some(shape) => shape,
                            None => continue,
                        }
                    }
                }
            };

            let mut sub = Tile::new(shape);
            sub.tile_flags = tile.tile_flags;
            sub.sprite_set = tile.sprite_set;
            sub.sprite_tile = tile.sprite_tile;
            sub.sprite_palette = tile.sprite_palette;
            copy_boundary_edges(tile, &mut sub, factor, dx, dy);
            out.push((dx, dy, sub));
        }
    }
    out
}

/// Where the scaled slant line enters and exits the cell at `(dx, dy)`, in
/// cell-local half-tile units, ordered along the slant direction. Only
/// valid for cells the line actually crosses.
fn cell_crossing(af: (i32, i32), d: (i32, i32), dx: i32, dy: i32) -> ((i32, i32), (i32, i32)) {
    let local = |p: (i32, i32)| (p.0 - 2 * dx, p.1 - 2 * dy);
    if d.0.abs() == 2 {
        // Shallow or diagonal: the line crosses both vertical cell borders.
        let y_at = |x: i32| af.1 + (x - af.0) * d.1 / d.0;
        let p = (2 * dx, y_at(2 * dx));
        let q = (2 * dx + 2, y_at(2 * dx + 2));
        let (p, q) = if d.0 > 0 { (p, q) } else { (q, p) };
        (local(p), local(q))
    } else {
        // Steep: the line crosses both horizontal cell borders.
        let x_at = |y: i32| af.0 + (y - af.1) * d.0 / d.1;
        let p = (x_at(2 * dy), 2 * dy);
        let q = (x_at(2 * dy + 2), 2 * dy + 2);
        let (p, q) = if d.1 > 0 { (p, q) } else { (q, p) };
        (local(p), local(q))
    }
}

/// Copies tracked edges of the source tile onto sub-cell edges that lie on
/// them. Caps and angles belong to edge endpoints, so they survive only at
/// corners on the boundary of the scaled block.
fn copy_boundary_edges(tile: &Tile, sub: &mut Tile, factor: i32, dx: i32, dy: i32) {
    for &side in SHAPE_ORDERED_SIDES[tile.shape.raw() as usize] {
        let (pa, pb) = side_vertexes(tile.shape, side);
        let pa = (pa.0 * factor, pa.1 * factor);
        let pb = (pb.0 * factor, pb.1 * factor);

        let (sa, sb) = side_vertexes(sub.shape, side);
        if sa == sb {
            continue;
        }
        let ga = (sa.0 + 2 * dx, sa.1 + 2 * dy);
        let gb = (sb.0 + 2 * dx, sb.1 + 2 * dy);
        if !on_segment(pa, pb, ga) || !on_segment(pa, pb, gb) {
            continue;
        }

        let mut edge = *tile.edge(side);
        for (corner, point) in [ga, gb].into_iter().enumerate() {
            let on_outer_x = pa.0 != pb.0 && (point.0 == 0 || point.0 == 2 * factor);
            let on_outer_y = pa.1 != pb.1 && (point.1 == 0 || point.1 == 2 * factor);
            if !on_outer_x && !on_outer_y {
                edge.caps[corner] = false;
                edge.angles[corner] = 0;
                edge.filth_caps[corner] = false;
                edge.filth_angles[corner] = 0;
            }
        }
        sub.edge_data[side as usize] = edge;
    }
}

/// True if `p` lies on the segment from `a` to `b`.
fn on_segment(a: (i32, i32), b: (i32, i32), p: (i32, i32)) -> bool {
    let d = (b.0 - a.0, b.1 - a.1);
    let r = (p.0 - a.0, p.1 - a.1);
    if cross(d, r) != 0 {
        return false;
    }
    let dot = d.0 * r.0 + d.1 * r.1;
    dot >= 0 && dot <= d.0 * d.0 + d.1 * d.1
}
