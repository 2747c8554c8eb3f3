//! End-to-end codec tests: encode/decode equality, byte-stable re-encoding,
//! and rejection of malformed or oversized inputs.

use std::io::Write;

use bitstream::BitWriter;
use codec::{decode_level, encode_level, CodecError, DecodeLimits};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use level::{Entity, Level, LevelError, Prop, Tile, TileShape, TileSide};
use proptest::prelude::*;
use variant::{StructMap, Variant};

/// A level exercising every wire feature: multi-segment and multi-region
/// tile layout, negative coordinates, filth, entities with variables, an
/// entity name outside the 6-bit charset, props, a backdrop, a thumbnail.
fn rich_level() -> Level {
    let mut level = Level::new();
    level.set_name(&b"integration"[..]);
    level.set_virtual_character(true);
    level.set_start_position(1, 96, -48);
    level.sshot = vec![0x89, b'P', b'N', b'G'];

    for x in 0..10 {
        level.set_tile(19, x, 2, Tile::new(TileShape::Full));
    }
    level.set_tile(19, 20, 20, Tile::new(TileShape::HalfA));
    level.set_tile(12, 3, 3, Tile::new(TileShape::Big2));
    level.set_tile(19, -1, -1, Tile::new(TileShape::Full));

    let mut filthy = Tile::new(TileShape::Full);
    filthy.edge_mut(TileSide::Top).filth_sprite_set = 2;
    filthy.edge_mut(TileSide::Top).filth_caps = [true, false];
    filthy.edge_mut(TileSide::Top).filth_angles = [10, -10];
    level.set_tile(19, 4, 1, filthy);

    let mut apple = Entity::new("hittable_apple", 120.5, 96.0);
    apple.variables.insert("persist", Variant::Bool(true));
    level.add_entity(apple, Some(100)).unwrap();

    let mut trigger = Entity::new("z_wind_generator", -300.0, 0.0);
    trigger.rotation = 0x1234;
    trigger.flip_x = true;
    level.add_entity(trigger, Some(101)).unwrap();

    let mut door = Prop::new(240.0, -96.0, 2, 5, 18);
    door.rotation = 4096;
    door.palette = 3;
    level.add_prop(door, Some(200)).unwrap();

    let backdrop = level.backdrop.as_deref_mut().unwrap();
    backdrop.set_tile(19, 1, 1, Tile::new(TileShape::Full));
    backdrop
        .add_prop(Prop::new(48.0, 48.0, 1, 2, 3), Some(300))
        .unwrap();

    level.compute_edges();
    level
}

#[test]
fn encode_decode_preserves_level() {
    let mut level = rich_level();
    let bytes = encode_level(&mut level).unwrap();
    let decoded = decode_level(&bytes, &DecodeLimits::default()).unwrap();
    assert_eq!(decoded, level);
}

#[test]
fn decode_encode_is_byte_identical() {
    let mut level = rich_level();
    let bytes = encode_level(&mut level).unwrap();
    let mut decoded = decode_level(&bytes, &DecodeLimits::default()).unwrap();
    assert_eq!(encode_level(&mut decoded).unwrap(), bytes);
}

#[test]
fn empty_level_roundtrips() {
    // No tiles, entities, or props means no regions at all; the file is
    // just headers, metadata, and an empty directory.
    let mut level = Level::new();
    level.set_name(&b"blank"[..]);

    let bytes = encode_level(&mut level).unwrap();
    let decoded = decode_level(&bytes, &DecodeLimits::default()).unwrap();
    assert_eq!(decoded, level);
    assert!(decoded.tiles.is_empty());
    assert_eq!(decoded.name(), b"blank");
}

#[test]
fn single_region_level_roundtrips() {
    let mut level = Level::new();
    level.set_tile(19, 0, 0, Tile::new(TileShape::Full));
    level.compute_edges();

    let bytes = encode_level(&mut level).unwrap();
    let decoded = decode_level(&bytes, &DecodeLimits::default()).unwrap();
    assert_eq!(decoded, level);
}

#[test]
fn extended_entity_names_roundtrip() {
    let mut level = rich_level();
    let bytes = encode_level(&mut level).unwrap();
    let decoded = decode_level(&bytes, &DecodeLimits::default()).unwrap();
    assert_eq!(decoded.entities[&101].kind, "z_wind_generator");
    assert_eq!(decoded.entities[&100].kind, "hittable_apple");
}

#[test]
fn thumbnail_survives_roundtrip() {
    let mut level = rich_level();
    let bytes = encode_level(&mut level).unwrap();
    let decoded = decode_level(&bytes, &DecodeLimits::default()).unwrap();
    assert_eq!(decoded.sshot, vec![0x89, b'P', b'N', b'G']);
    assert_eq!(decoded.name(), b"integration");
    assert_eq!(decoded.start_position(1), (96, -48));
}

#[test]
fn prop_scale_snaps_to_grid_and_stays_stable() {
    let mut level = Level::new();
    let mut prop = Prop::new(0.0, 0.0, 1, 1, 1);
    prop.scale = 2.0;
    level.add_prop(prop, Some(100)).unwrap();

    let bytes = encode_level(&mut level).unwrap();
    let decoded = decode_level(&bytes, &DecodeLimits::default()).unwrap();
    let scale = decoded.props[&100].scale;
    // Scales live on a 49-step exponential grid; 2.0 is not a grid point.
    assert!(scale > 1.8 && scale < 2.0, "scale {scale}");

    let mut decoded = decoded;
    assert_eq!(encode_level(&mut decoded).unwrap(), bytes);
}

#[test]
fn bad_magic_rejected() {
    let err = decode_level(b"NOT_LVL.........", &DecodeLimits::default()).unwrap_err();
    assert!(matches!(err, CodecError::BadMagic { expected: "DF_LVL", .. }));
}

#[test]
fn old_version_rejected() {
    let mut level = rich_level();
    let mut bytes = encode_level(&mut level).unwrap();
    bytes[6] = 42;
    bytes[7] = 0;
    let err = decode_level(&bytes, &DecodeLimits::default()).unwrap_err();
    assert_eq!(err, CodecError::UnsupportedVersion { version: 42 });
}

#[test]
fn truncated_input_always_fails() {
    let mut level = rich_level();
    let bytes = encode_level(&mut level).unwrap();
    for len in 0..bytes.len() {
        assert!(
            decode_level(&bytes[..len], &DecodeLimits::default()).is_err(),
            "prefix of {len} bytes decoded"
        );
    }
}

#[test]
fn region_count_limit_enforced() {
    let mut level = Level::new();
    for i in 0..17 {
        level.set_tile(19, i * 256, 0, Tile::new(TileShape::Full));
    }
    let bytes = encode_level(&mut level).unwrap();

    assert!(decode_level(&bytes, &DecodeLimits::default()).is_ok());
    let err = decode_level(&bytes, &DecodeLimits::for_testing()).unwrap_err();
    assert_eq!(
        err,
        CodecError::LimitExceeded {
            what: "region count",
            value: 17,
            max: 16,
        }
    );
}

#[test]
fn thumbnail_size_limit_enforced() {
    let mut level = Level::new();
    level.sshot = vec![0; 100_000];
    let bytes = encode_level(&mut level).unwrap();

    assert!(decode_level(&bytes, &DecodeLimits::default()).is_ok());
    let err = decode_level(&bytes, &DecodeLimits::for_testing()).unwrap_err();
    assert!(matches!(
        err,
        CodecError::LimitExceeded {
            what: "thumbnail size",
            ..
        }
    ));
}

#[test]
fn deep_entity_variables_hit_depth_limit() {
    let mut level = Level::new();
    let mut entity = Entity::new("camera", 0.0, 0.0);
    let mut tree = Variant::Struct(StructMap::new());
    for _ in 0..10 {
        let mut inner = StructMap::new();
        inner.insert("n", tree);
        tree = Variant::Struct(inner);
    }
    entity.variables.insert("tree", tree);
    level.add_entity(entity, Some(100)).unwrap();

    let bytes = encode_level(&mut level).unwrap();
    assert!(decode_level(&bytes, &DecodeLimits::default()).is_ok());
    let err = decode_level(&bytes, &DecodeLimits::for_testing()).unwrap_err();
    assert!(matches!(err, CodecError::Variant(_)));
}

/// Builds a file whose only tile carries shape code 27, which no shape
/// maps to.
fn file_with_bad_shape() -> Vec<u8> {
    let mut body = BitWriter::new();
    body.write_bits(0, 32).unwrap(); // segment size, never reached
    body.write_bits(8, 16).unwrap(); // segment version
    body.write_bits(0, 8).unwrap(); // segment x
    body.write_bits(0, 8).unwrap(); // segment y
    body.write_bits(16, 8).unwrap();
    body.write_bits(0, 32).unwrap();
    body.write_bits(0, 16).unwrap();
    body.write_bits(0, 16).unwrap();
    body.write_bits(0, 16).unwrap();
    body.write_bits(0, 16).unwrap();
    body.write_bits(1, 32).unwrap(); // flags: tiles present
    body.write_bits(1, 8).unwrap(); // one layer
    body.write_bits(19, 8).unwrap();
    body.write_bits(1, 10).unwrap(); // one tile
    body.write_bits(0, 5).unwrap();
    body.write_bits(0, 5).unwrap();
    body.write_bits(27, 5).unwrap(); // shape code out of range
    body.write_bits(4, 3).unwrap();
    body.write_bytes_packed(&[0u8; 12]).unwrap();
    body.align_to_byte();
    let raw = body.finish();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut file = BitWriter::new();
    file.write_bytes(b"DF_LVL").unwrap();
    file.write_bits(44, 16).unwrap();
    file.write_bits(0, 32).unwrap(); // filesize, unchecked
    file.write_bits(1, 32).unwrap(); // one region
    file.write_bytes(b"DF_MTD").unwrap();
    file.write_bits(4, 16).unwrap();
    for _ in 0..5 {
        file.write_bits(0, 32).unwrap();
    }
    file.write_bits(0, 32).unwrap(); // no thumbnail
    file.write_bits(0, 4).unwrap(); // empty variable map
    file.write_bits(0, 32).unwrap(); // region directory
    file.align_to_byte();
    file.write_bits(17 + compressed.len() as u64, 32).unwrap();
    file.write_bits(raw.len() as u64, 32).unwrap();
    file.write_signed(0, 16).unwrap();
    file.write_signed(0, 16).unwrap();
    file.write_bits(14, 16).unwrap();
    file.write_bits(1, 16).unwrap(); // one segment
    file.write_bits(0, 8).unwrap(); // no backdrop
    file.write_bytes(&compressed).unwrap();
    file.finish()
}

#[test]
fn unknown_tile_shape_rejected() {
    let err = decode_level(&file_with_bad_shape(), &DecodeLimits::default()).unwrap_err();
    assert_eq!(
        err,
        CodecError::Level(LevelError::UnknownShape { shape: 27 })
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_tile_grids_roundtrip(tiles in prop::collection::btree_map(
        ((1u8..21), (-40i32..40), (-40i32..40)),
        0u8..21,
        0..40,
    )) {
        let mut level = Level::new();
        for (&(layer, x, y), &raw) in &tiles {
            level.set_tile(layer, x, y, Tile::new(TileShape::from_raw(raw).unwrap()));
        }
        level.compute_edges();

        let bytes = encode_level(&mut level).unwrap();
        let decoded = decode_level(&bytes, &DecodeLimits::default()).unwrap();
        prop_assert_eq!(&decoded, &level);

        let mut decoded = decoded;
        prop_assert_eq!(encode_level(&mut decoded).unwrap(), bytes);
    }
}
