//! Integration tests for edge connectivity over realistic tile arrangements.

use proptest::prelude::*;

use level::{Level, Tile, TileShape, TileSide};

/// A ground platform with a slope ramp on each end:
///
/// ```text
///   /########\
///  (A)      (B)   A = HalfA ramp, B = HalfB ramp, # = full blocks
/// ```
fn ramped_platform() -> Level {
    let mut level = Level::new();
    level.set_tile(19, 0, 0, Tile::new(TileShape::HalfA));
    for x in 1..=8 {
        level.set_tile(19, x, 0, Tile::new(TileShape::Full));
    }
    level.set_tile(19, 9, 0, Tile::new(TileShape::HalfB));
    level
}

#[test]
fn platform_top_surface_is_one_run() {
    let mut level = ramped_platform();
    level.compute_edges();

    // The ramp hypotenuse starts the surface with a cap on its low corner.
    let ramp = level.tile(19, 0, 0).unwrap();
    assert!(ramp.edge(TileSide::Top).visible);
    assert_eq!(ramp.edge(TileSide::Top).caps, [true, false]);

    // The flat tops are a continuation: no caps anywhere in the middle.
    // The surface direction changes where ramp meets flat, so the corner
    // where they join still caps on the flat side.
    let first_flat = level.tile(19, 1, 0).unwrap();
    assert!(first_flat.edge(TileSide::Top).visible);
    assert_eq!(first_flat.edge(TileSide::Top).caps, [true, false]);
    for x in 2..=7 {
        let tile = level.tile(19, x, 0).unwrap();
        assert_eq!(tile.edge(TileSide::Top).caps, [false, false], "x={x}");
    }

    // Interior vertical edges are all hidden.
    for x in 1..=7 {
        let tile = level.tile(19, x, 0).unwrap();
        assert!(!tile.edge(TileSide::Right).visible, "x={x}");
    }
}

#[test]
fn solid_column_hides_stacked_edges() {
    let mut level = Level::new();
    for y in 0..4 {
        level.set_tile(19, 0, y, Tile::new(TileShape::Full));
    }
    level.compute_edges();

    for y in 0..3 {
        assert!(!level.tile(19, 0, y).unwrap().edge(TileSide::Bottom).visible);
        assert!(!level.tile(19, 0, y + 1).unwrap().edge(TileSide::Top).visible);
    }
    // Side walls form two vertical runs with caps at the extremes.
    assert_eq!(
        level.tile(19, 0, 0).unwrap().edge(TileSide::Right).caps,
        [true, false]
    );
    assert_eq!(
        level.tile(19, 0, 3).unwrap().edge(TileSide::Right).caps,
        [false, true]
    );
}

#[test]
fn backdrop_edges_computed_independently() {
    let mut level = Level::new();
    level.set_tile(19, 0, 0, Tile::new(TileShape::Full));
    level
        .backdrop
        .as_deref_mut()
        .unwrap()
        .set_tile(19, 0, 0, Tile::new(TileShape::Full));
    level.compute_edges();

    let backdrop_tile = level.backdrop.as_deref().unwrap().tile(19, 0, 0).unwrap();
    assert!(backdrop_tile.edge(TileSide::Top).solid);
    assert_eq!(backdrop_tile.edge(TileSide::Top).caps, [true, true]);
}

fn shape_strategy() -> impl Strategy<Value = TileShape> {
    (0u8..21).prop_map(|raw| TileShape::from_raw(raw).unwrap())
}

proptest! {
    #[test]
    fn prop_compute_edges_idempotent(
        placements in prop::collection::vec(
            ((0i32..6, 0i32..6), shape_strategy()),
            1..24,
        )
    ) {
        let mut level = Level::new();
        for ((x, y), shape) in placements {
            level.set_tile(19, x, y, Tile::new(shape));
        }
        level.compute_edges();
        let once = level.clone();
        level.compute_edges();
        prop_assert_eq!(level, once);
    }

    #[test]
    fn prop_hidden_edges_are_mutual(
        placements in prop::collection::vec(
            ((0i32..5, 0i32..5), shape_strategy()),
            1..20,
        )
    ) {
        let mut level = Level::new();
        for ((x, y), shape) in placements {
            level.set_tile(19, x, y, Tile::new(shape));
        }
        level.compute_edges();

        // If an edge was suppressed, the facing neighbor edge must exist,
        // be solid, and also be suppressed.
        for (&(layer, x, y), tile) in &level.tiles {
            for side in TileSide::ALL {
                let edge = tile.edge(side);
                if !edge.solid || edge.visible {
                    continue;
                }
                let (dx, dy) = side.neighbor_offset();
                let neighbor = level.tile(layer, x + dx, y + dy)
                    .expect("hidden edge without neighbor");
                let facing = neighbor.edge(side.opposite());
                prop_assert!(facing.solid);
                prop_assert!(!facing.visible);
            }
        }
    }
}
