//! Level file encoding.
//!
//! Encoding partitions the level into regions of 256x256 tiles, each split
//! into segments of 16x16. Segment and level headers carry sizes that are
//! only known after their bodies are written, so both are reserved up front
//! and backpatched.

use std::collections::BTreeMap;
use std::io::Write;

use bitstream::BitWriter;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use level::{Entity, Level, Prop, Tile};
use variant::sixbit;

use crate::error::{CodecError, CodecResult};
use crate::format::{
    LAYER_COUNT, LEVEL_MAGIC, METADATA_BITS, METADATA_MAGIC, REGION_HEADER_BYTES, REGION_VERSION,
    SEGMENT_HEADER_BITS, SEGMENT_VERSION, SOLID_LAYER, TILE_PIXELS, WRITE_VERSION,
};

/// Everything that lands in one 16x16 segment.
#[derive(Default)]
struct SegmentData<'a> {
    /// Tiles per layer, in local segment coordinates.
    tiles: BTreeMap<u8, Vec<(u8, u8, &'a Tile)>>,
    entities: Vec<(u32, &'a Entity)>,
    props: Vec<(u32, &'a Prop)>,
}

impl SegmentData<'_> {
    fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.entities.is_empty() && self.props.is_empty()
    }
}

/// Everything that lands in one 256x256 region.
#[derive(Default)]
struct RegionData<'a> {
    segments: BTreeMap<(u8, u8), SegmentData<'a>>,
    backdrop: SegmentData<'a>,
}

/// The level partitioned into regions keyed by region coordinate.
#[derive(Default)]
struct RegionMap<'a> {
    regions: BTreeMap<(i32, i32), RegionData<'a>>,
}

impl<'a> RegionMap<'a> {
    fn segment(&mut self, x: i32, y: i32) -> &mut SegmentData<'a> {
        let region = self
            .regions
            .entry((x.div_euclid(256), y.div_euclid(256)))
            .or_default();
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let seg_key = (
            (x.div_euclid(16) & 0xF) as u8,
            (y.div_euclid(16) & 0xF) as u8,
        );
        region.segments.entry(seg_key).or_default()
    }

    fn backdrop_segment(&mut self, x: i32, y: i32) -> &mut SegmentData<'a> {
        &mut self
            .regions
            .entry((x.div_euclid(256), y.div_euclid(256)))
            .or_default()
            .backdrop
    }

    /// Region keys in file order: negative coordinates wrap to the top of
    /// the 16-bit range.
    fn sorted_keys(&self) -> Vec<(i32, i32)> {
        let mut keys: Vec<(i32, i32)> = self.regions.keys().copied().collect();
        let norm = |v: i32| if v < 0 { v + (1 << 16) } else { v };
        keys.sort_by_key(|&(x, y)| (norm(x), norm(y)));
        keys
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn compute_region_map(level: &Level) -> RegionMap<'_> {
    let mut rmap = RegionMap::default();

    for (&(layer, x, y), tile) in &level.tiles {
        if layer >= LAYER_COUNT {
            continue;
        }
        rmap.segment(x, y)
            .tiles
            .entry(layer)
            .or_default()
            .push(((x & 0xF) as u8, (y & 0xF) as u8, tile));
    }
    for (&id, entity) in &level.entities {
        rmap.segment(
            (entity.x / TILE_PIXELS) as i32,
            (entity.y / TILE_PIXELS) as i32,
        )
        .entities
        .push((id, entity));
    }
    for (&id, prop) in &level.props {
        rmap.segment((prop.x / TILE_PIXELS) as i32, (prop.y / TILE_PIXELS) as i32)
            .props
            .push((id, prop));
    }

    let Some(backdrop) = level.backdrop.as_deref() else {
        return rmap;
    };
    for (&(layer, x, y), tile) in &backdrop.tiles {
        if layer >= LAYER_COUNT {
            continue;
        }
        rmap.backdrop_segment(x * 16, y * 16)
            .tiles
            .entry(layer)
            .or_default()
            .push(((x & 0xF) as u8, (y & 0xF) as u8, tile));
    }
    for (&id, prop) in &backdrop.props {
        rmap.backdrop_segment(
            (prop.x / TILE_PIXELS) as i32,
            (prop.y / TILE_PIXELS) as i32,
        )
        .props
        .push((id, prop));
    }
    rmap
}

/// Encodes a level to its binary file form.
///
/// Encoding is deterministic: tiles, entities, and props are emitted in
/// coordinate/id order, so decode-then-encode reproduces this encoder's
/// output byte for byte.
#[allow(clippy::cast_possible_truncation)]
pub fn encode_level(level: &mut Level) -> CodecResult<Vec<u8>> {
    let mut writer = BitWriter::new();

    // Header fields depend on sizes known only after the body is written.
    let header_bits = 160 + METADATA_BITS + level.sshot.len() * 8;
    writer.reserve_bits(header_bits);

    variant::write_struct(&mut writer, &level.variables)?;

    let rmap = compute_region_map(level);
    let region_keys = rmap.sorted_keys();

    // Region directory, byte aligned region data after it.
    let dir_index = writer.bit_position();
    let data_index = (dir_index + 32 * region_keys.len() + 7) & !0x7;
    writer.reserve_bits(data_index - dir_index);

    let mut offsets = Vec::with_capacity(region_keys.len());
    for &(rx, ry) in &region_keys {
        writer.align_to_byte();
        offsets.push(((writer.bit_position() - data_index) / 8) as u64);
        write_region(&mut writer, rx, ry, &rmap.regions[&(rx, ry)])?;
    }
    let end_index = writer.bit_position();

    // The first offset is always zero and the reserved bits already are, so
    // only directories with a second entry need backpatching. With no
    // regions at all there is no directory to seek into.
    if region_keys.len() > 1 {
        writer.seek(dir_index + 32)?;
        for &offset in offsets.iter().skip(1) {
            writer.write_bits(offset, 32)?;
        }
    }

    writer.seek(0)?;
    writer.write_bytes(LEVEL_MAGIC.as_bytes())?;
    writer.write_bits(u64::from(WRITE_VERSION), 16)?;
    writer.write_bits((end_index / 8) as u64, 32)?;
    writer.write_bits(region_keys.len() as u64, 32)?;
    write_metadata(&mut writer, level)?;
    writer.write_bits(level.sshot.len() as u64, 32)?;
    writer.write_bytes(&level.sshot)?;
    writer.seek_to_end();

    Ok(writer.finish())
}

fn write_metadata(writer: &mut BitWriter, level: &mut Level) -> CodecResult<()> {
    writer.write_bytes(METADATA_MAGIC.as_bytes())?;
    writer.write_bits(4, 16)?;
    writer.write_bits(0, 32)?;
    writer.write_bits(u64::from(level.calculate_max_id(false)) + 1, 32)?;
    writer.write_bits(0, 32)?;
    writer.write_bits(0, 32)?;
    writer.write_bits(0, 32)?;
    Ok(())
}

fn write_region(
    writer: &mut BitWriter,
    rx: i32,
    ry: i32,
    region: &RegionData<'_>,
) -> CodecResult<()> {
    let mut body = BitWriter::new();
    for (&(sx, sy), segment) in &region.segments {
        write_segment(&mut body, sx, sy, segment)?;
    }
    let backdrop_present = !region.backdrop.is_empty();
    if backdrop_present {
        write_segment(&mut body, 0, 0, &region.backdrop)?;
    }
    let uncompressed = body.finish();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    let compressed = encoder
        .write_all(&uncompressed)
        .and_then(|()| encoder.finish())
        .map_err(|err| CodecError::Compression {
            detail: err.to_string(),
        })?;

    writer.write_bits(REGION_HEADER_BYTES + compressed.len() as u64, 32)?;
    writer.write_bits(uncompressed.len() as u64, 32)?;
    writer.write_signed(i64::from(rx), 16)?;
    writer.write_signed(i64::from(ry), 16)?;
    writer.write_bits(u64::from(REGION_VERSION), 16)?;
    writer.write_bits(region.segments.len() as u64, 16)?;
    writer.write_bits(u64::from(backdrop_present), 8)?;
    writer.write_bytes(&compressed)?;
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::too_many_lines)]
fn write_segment(
    writer: &mut BitWriter,
    seg_x: u8,
    seg_y: u8,
    segment: &SegmentData<'_>,
) -> CodecResult<()> {
    let start = writer.bit_position();
    writer.reserve_bits(SEGMENT_HEADER_BITS);

    let mut flags = 0u64;
    let mut dusts: Vec<(u8, u8, &Tile)> = Vec::new();
    let (mut dust_filth, mut tile_surface, mut dustblock_filth) = (0u64, 0u64, 0u64);

    if !segment.tiles.is_empty() {
        flags |= 1;
        writer.write_bits(segment.tiles.len() as u64, 8)?;
        for (&layer, layer_tiles) in &segment.tiles {
            writer.write_bits(u64::from(layer), 8)?;
            writer.write_bits(layer_tiles.len() as u64, 10)?;

            let mut ordered: Vec<&(u8, u8, &Tile)> = layer_tiles.iter().collect();
            ordered.sort_by_key(|&&(x, y, _)| (y, x));

            for &&(x, y, tile) in &ordered {
                if layer == SOLID_LAYER {
                    if tile.has_filth() {
                        dusts.push((x, y, tile));
                    }
                    if tile.is_dustblock() {
                        dustblock_filth += 1;
                    }
                    for edge in &tile.edge_data {
                        if edge.filth_spike {
                            continue;
                        }
                        if edge.filth_sprite_set != 0 {
                            dust_filth += 1;
                        }
                        if edge.solid && edge.visible {
                            tile_surface += 1;
                        }
                    }
                }

                writer.write_bits(u64::from(x), 5)?;
                writer.write_bits(u64::from(y), 5)?;
                writer.write_bits(u64::from(tile.shape.raw()), 5)?;
                writer.write_bits(u64::from(tile.tile_flags), 3)?;
                writer.write_bytes_packed(&tile.pack_tile_data())?;
            }
        }
    }

    if !dusts.is_empty() {
        flags |= 2;
        writer.write_bits(dusts.len() as u64, 10)?;
        for &(x, y, tile) in &dusts {
            writer.write_bits(u64::from(x), 5)?;
            writer.write_bits(u64::from(y), 5)?;
            writer.write_bytes_packed(&tile.pack_dust_data())?;
        }
    }

    if !segment.props.is_empty() {
        flags |= 8;
        writer.write_bits(segment.props.len() as u64, 16)?;
        for &(id, prop) in &segment.props {
            writer.write_bits(u64::from(id), 32)?;
            writer.write_bits(u64::from(prop.layer), 8)?;
            writer.write_bits(u64::from(prop.layer_sub), 8)?;

            let scale_lg = (prop.scale.ln() / 50f64.ln() * 24.0).round() as i64 + 32;
            let x_scale = ((scale_lg / 7) as u64) ^ 0x4;
            let y_scale = ((scale_lg % 7) as u64) ^ 0x4;
            writer.write_bit(prop.x < 0.0);
            writer.write_bits(prop.x.abs() as u64, 27)?;
            writer.write_bits(x_scale, 4)?;
            writer.write_bit(prop.y < 0.0);
            writer.write_bits(prop.y.abs() as u64, 27)?;
            writer.write_bits(y_scale, 4)?;

            writer.write_bits(u64::from(prop.rotation), 16)?;
            writer.write_bit(prop.flip_x);
            writer.write_bit(prop.flip_y);
            writer.write_bits(u64::from(prop.prop_set), 8)?;
            writer.write_bits(u64::from(prop.prop_group), 12)?;
            writer.write_bits(u64::from(prop.prop_index), 12)?;
            writer.write_bits(u64::from(prop.palette), 8)?;
        }
    }

    if !segment.entities.is_empty() {
        flags |= 4;
        let mut extra_names = BitWriter::new();
        writer.write_bits(segment.entities.len() as u64, 16)?;
        for &(id, entity) in &segment.entities {
            writer.write_bits(u64::from(id), 32)?;
            // Names outside the 6-bit charset go to the trailer behind the
            // "entity" placeholder.
            if entity.kind == "entity" || entity.kind.starts_with("z_") {
                sixbit::write_str(writer, "entity")?;
                sixbit::write_str(&mut extra_names, &entity.kind)?;
            } else {
                sixbit::write_str(writer, &entity.kind)?;
            }
            variant::float::write_float(writer, 32, 8, entity.x)?;
            variant::float::write_float(writer, 32, 8, entity.y)?;
            writer.write_bits(u64::from(entity.rotation), 16)?;
            writer.write_bits(u64::from(entity.layer), 8)?;
            writer.write_bit(!entity.flip_x);
            writer.write_bit(!entity.flip_y);
            writer.write_bit(entity.visible);
            variant::write_struct(writer, &entity.variables)?;
        }

        extra_names.align_to_byte();
        let names_pos = writer.bit_position();
        writer.write_bytes_packed(&extra_names.finish())?;
        writer.align_to_byte();
        writer.write_bits((writer.bit_position() - names_pos) as u64, 32)?;
    }

    writer.align_to_byte();
    let end = writer.bit_position();

    writer.seek(start)?;
    writer.write_bits(((end - start) / 8) as u64, 32)?;
    writer.write_bits(u64::from(SEGMENT_VERSION), 16)?;
    writer.write_bits(u64::from(seg_x), 8)?;
    writer.write_bits(u64::from(seg_y), 8)?;
    writer.write_bits(16, 8)?;
    writer.write_bits(0, 32)?;
    writer.write_bits(dust_filth, 16)?;
    writer.write_bits(0, 16)?;
    writer.write_bits(tile_surface, 16)?;
    writer.write_bits(dustblock_filth, 16)?;
    writer.write_bits(flags, 32)?;
    writer.seek_to_end();
    Ok(())
}
