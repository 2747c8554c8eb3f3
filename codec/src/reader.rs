//! Level file decoding.
//!
//! A level file is a byte-aligned header (magic, version, metadata,
//! thumbnail), a bit-packed variant map of level metadata, a region
//! directory, and a sequence of zlib-compressed regions. Each region holds
//! up to 256 segments of 16x16 tiles plus the entities and props whose
//! positions fall inside it.

use std::io::Read;

use bitstream::BitReader;
use flate2::read::ZlibDecoder;
use level::{Entity, Level, Prop, Tile, TileShape};
use variant::{float, sixbit};

use crate::error::{CodecError, CodecResult};
use crate::format::{LEVEL_MAGIC, METADATA_MAGIC, REGION_HEADER_BYTES, SOLID_LAYER};
use crate::limits::DecodeLimits;

/// Header metadata block contents.
struct Metadata {
    entity_uid: u32,
}

/// Decodes a complete level file.
///
/// All decode failures are terminal: no partial level is returned.
#[allow(clippy::cast_possible_truncation)]
pub fn decode_level(data: &[u8], limits: &DecodeLimits) -> CodecResult<Level> {
    let mut reader = BitReader::new(data);

    expect_magic(&mut reader, LEVEL_MAGIC)?;
    let version = read_u16(&mut reader)?;
    if version <= 42 {
        return Err(CodecError::UnsupportedVersion { version });
    }

    let _filesize = reader.read_bits(32)?;
    let num_regions = reader.read_bits(32)?;
    if num_regions > u64::from(limits.max_regions) {
        return Err(CodecError::LimitExceeded {
            what: "region count",
            value: num_regions,
            max: u64::from(limits.max_regions),
        });
    }
    let meta = read_metadata(&mut reader)?;

    let mut sshot = Vec::new();
    if version > 43 {
        let sshot_len = reader.read_bits(32)?;
        if sshot_len > limits.max_sshot_bytes {
            return Err(CodecError::LimitExceeded {
                what: "thumbnail size",
                value: sshot_len,
                max: limits.max_sshot_bytes,
            });
        }
        sshot = reader.read_bytes(sshot_len as usize)?.to_vec();
    }

    let mut level = Level::new();
    level.variables = variant::read_struct(&mut reader, &limits.variant)?;
    level.sshot = sshot;
    level.set_next_id(meta.entity_uid);

    // The directory offsets are redundant with sequential reading.
    for _ in 0..num_regions {
        reader.read_bits(32)?;
    }
    reader.align_to_byte()?;

    for _ in 0..num_regions {
        read_region(&mut reader, &mut level, limits)?;
    }
    Ok(level)
}

fn expect_magic(reader: &mut BitReader<'_>, expected: &'static str) -> CodecResult<()> {
    let found = reader.read_bytes(expected.len())?;
    if found != expected.as_bytes() {
        return Err(CodecError::BadMagic {
            expected,
            found: found.to_vec(),
        });
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn read_u16(reader: &mut BitReader<'_>) -> CodecResult<u16> {
    Ok(reader.read_bits(16)? as u16)
}

#[allow(clippy::cast_possible_truncation)]
fn read_u8(reader: &mut BitReader<'_>) -> CodecResult<u8> {
    Ok(reader.read_bits(8)? as u8)
}

#[allow(clippy::cast_possible_truncation)]
fn read_metadata(reader: &mut BitReader<'_>) -> CodecResult<Metadata> {
    expect_magic(reader, METADATA_MAGIC)?;
    let _version = read_u16(reader)?;
    let _region_offset = reader.read_bits(32)?;
    let entity_uid = reader.read_bits(32)? as u32;
    let _prop_uid = reader.read_bits(32)?;
    let _save_uid = reader.read_bits(32)?;
    let _region_uid = reader.read_bits(32)?;
    Ok(Metadata { entity_uid })
}

#[allow(clippy::cast_possible_truncation)]
fn read_region(
    reader: &mut BitReader<'_>,
    level: &mut Level,
    limits: &DecodeLimits,
) -> CodecResult<()> {
    let region_len = reader.read_bits(32)?;
    let uncompressed_len = reader.read_bits(32)?;
    if uncompressed_len > limits.max_region_bytes {
        return Err(CodecError::LimitExceeded {
            what: "region size",
            value: uncompressed_len,
            max: limits.max_region_bytes,
        });
    }
    let offx = reader.read_signed(16)? as i32;
    let offy = reader.read_signed(16)? as i32;
    let _version = read_u16(reader)?;
    let segments = reader.read_bits(16)?;
    let has_backdrop = reader.read_bits(8)? != 0;

    if region_len < REGION_HEADER_BYTES {
        return Err(CodecError::InvalidHeader {
            detail: "region length shorter than region header",
        });
    }
    let compressed = reader.read_bytes((region_len - REGION_HEADER_BYTES) as usize)?;
    let body = decompress(compressed, limits.max_region_bytes)?;

    let mut sub = BitReader::new(&body);
    for _ in 0..segments {
        sub.align_to_byte()?;
        read_segment(&mut sub, level, offx * 256, offy * 256, limits)?;
    }
    if has_backdrop {
        let backdrop = level
            .backdrop
            .as_deref_mut()
            .ok_or(level::LevelError::NoBackdrop)?;
        sub.align_to_byte()?;
        read_segment(&mut sub, backdrop, offx * 16, offy * 16, limits)?;
    }
    Ok(())
}

fn decompress(data: &[u8], max: u64) -> CodecResult<Vec<u8>> {
    let mut body = Vec::new();
    let mut decoder = ZlibDecoder::new(data).take(max.saturating_add(1));
    decoder
        .read_to_end(&mut body)
        .map_err(|err| CodecError::Compression {
            detail: err.to_string(),
        })?;
    if body.len() as u64 > max {
        return Err(CodecError::LimitExceeded {
            what: "region size",
            value: body.len() as u64,
            max,
        });
    }
    Ok(body)
}

fn read_12(reader: &mut BitReader<'_>) -> CodecResult<[u8; 12]> {
    let bytes = reader.read_bytes_packed(12)?;
    let mut buf = [0u8; 12];
    buf.copy_from_slice(&bytes);
    Ok(buf)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::too_many_lines)]
fn read_segment(
    reader: &mut BitReader<'_>,
    level: &mut Level,
    xoffset: i32,
    yoffset: i32,
    limits: &DecodeLimits,
) -> CodecResult<()> {
    let start = reader.bit_position();

    let segment_size = reader.read_bits(32)? as usize;
    let version = read_u16(reader)?;
    let xoffset = xoffset + i32::from(read_u8(reader)?) * 16;
    let yoffset = yoffset + i32::from(read_u8(reader)?) * 16;
    let _width = read_u8(reader)?;

    if version > 4 {
        let _level_uid = reader.read_bits(32)?;
        let _dust_filth = reader.read_bits(16)?;
        let _enemy_filth = reader.read_bits(16)?;
    }
    if version > 5 {
        let _tile_surface = reader.read_bits(16)?;
        let _dustblock_filth = reader.read_bits(16)?;
    }

    let flags = reader.read_bits(32)?;

    if flags & 1 != 0 {
        let layers = reader.read_bits(8)?;
        for _ in 0..layers {
            let layer = read_u8(reader)?;
            let count = reader.read_bits(10)?;
            for _ in 0..count {
                let tx = reader.read_bits(5)? as i32;
                let ty = reader.read_bits(5)? as i32;
                let raw_shape = reader.read_bits(5)? as u8;
                let tile_flags = reader.read_bits(3)? as u8;
                let data = read_12(reader)?;

                let mut tile = Tile::new(TileShape::from_raw(raw_shape)?);
                tile.tile_flags = tile_flags;
                tile.unpack_tile_data(&data);
                level.set_tile(layer, xoffset + tx, yoffset + ty, tile);
            }
        }
    }

    if flags & 2 != 0 {
        let dusts = reader.read_bits(10)?;
        for _ in 0..dusts {
            let tx = reader.read_bits(5)? as i32;
            let ty = reader.read_bits(5)? as i32;
            let data = read_12(reader)?;
            if let Some(tile) = level.tiles.get_mut(&(SOLID_LAYER, xoffset + tx, yoffset + ty)) {
                tile.unpack_dust_data(&data);
            }
        }
    }

    if flags & 8 != 0 {
        let props = reader.read_bits(16)?;
        for _ in 0..props {
            let id = reader.read_signed(32)?;
            if id < 0 {
                continue;
            }

            let layer = read_u8(reader)?;
            let layer_sub = read_u8(reader)?;

            let (x, y, scale) = if version > 6 {
                let x_sgn = reader.read_bit()?;
                let x_int = reader.read_bits(27)? as f64;
                let x_scale = (reader.read_bits(4)? as u32 & 0x7) ^ 0x4;
                let y_sgn = reader.read_bit()?;
                let y_int = reader.read_bits(27)? as f64;
                let y_scale = (reader.read_bits(4)? as u32 & 0x7) ^ 0x4;

                let scale_lg = f64::from(x_scale * 7 + y_scale);
                let scale = 50f64.powf((scale_lg - 32.0) / 24.0);
                (
                    if x_sgn { -x_int } else { x_int },
                    if y_sgn { -y_int } else { y_int },
                    scale,
                )
            } else {
                (
                    float::read_float(reader, 28, 4)?,
                    float::read_float(reader, 28, 4)?,
                    1.0,
                )
            };

            let prop = Prop {
                layer,
                layer_sub,
                x,
                y,
                rotation: read_u16(reader)?,
                flip_x: reader.read_bit()?,
                flip_y: reader.read_bit()?,
                scale,
                prop_set: read_u8(reader)?,
                prop_group: reader.read_bits(12)? as u16,
                prop_index: reader.read_bits(12)? as u16,
                palette: read_u8(reader)?,
            };

            // Repeated prop ids overwrite, matching the game engine.
            level.note_id(id as u32);
            level.props.insert(id as u32, prop);
        }
    }

    if flags & 4 != 0 {
        let num_entities = reader.read_bits(16)?;
        let mut pending: Vec<(u32, Entity)> = Vec::new();
        let mut has_extended_names = false;

        for _ in 0..num_entities {
            let id = reader.read_signed(32)?;
            if id < 0 {
                continue;
            }

            let kind = sixbit::read_str(reader)?;
            if kind == "entity" && version > 7 {
                has_extended_names = true;
            }
            let x = float::read_float(reader, 32, 8)?;
            let y = float::read_float(reader, 32, 8)?;
            let rotation = read_u16(reader)?;
            let layer = read_u8(reader)?;
            let face_x = reader.read_bit()?;
            let face_y = reader.read_bit()?;
            let visible = reader.read_bit()?;
            let variables = variant::read_struct(reader, &limits.variant)?;

            pending.push((
                id as u32,
                Entity {
                    kind,
                    x,
                    y,
                    rotation,
                    layer,
                    flip_x: !face_x,
                    flip_y: !face_y,
                    visible,
                    variables,
                },
            ));
        }

        // Names that do not fit the 6-bit charset live in a trailer at the
        // end of the segment, prefixed in-stream by the placeholder name
        // "entity". The final 32 bits of the segment give the trailer's
        // distance backwards from themselves.
        if has_extended_names {
            if segment_size < 4 {
                return Err(CodecError::InvalidHeader {
                    detail: "segment too short for extended names",
                });
            }
            reader.seek(start + (segment_size - 4) * 8)?;
            let trailer_bits = reader.read_bits(32)? as usize;
            let here = reader.bit_position();
            let trailer_start = here
                .checked_sub(trailer_bits + 32)
                .ok_or(CodecError::InvalidHeader {
                    detail: "extended names trailer out of range",
                })?;
            reader.seek(trailer_start)?;
        }

        for (id, mut entity) in pending {
            if has_extended_names && entity.kind == "entity" {
                entity.kind = sixbit::read_str(reader)?;
            }
            // Repeated entity ids overwrite, matching the game engine.
            level.note_id(id);
            level.entities.insert(id, entity);
        }
    }

    reader.seek(
        start
            .checked_add(segment_size.saturating_mul(8))
            .ok_or(CodecError::InvalidHeader {
                detail: "segment length overflow",
            })?,
    )?;
    Ok(())
}
