//! Wire codec for variant trees.
//!
//! Every value is announced by a 4-bit tag. Struct bodies are sequences of
//! `(tag, key, value)` entries terminated by tag 0; arrays declare one
//! element tag up front and pack the elements without per-element tags.
//!
//! Strings longer than [`STRING_CHUNK_MAX`] bytes are split into chunks.
//! Inside structs each continuation chunk repeats the string tag with a
//! `"ctn"` key; inside arrays continuation chunks count against the declared
//! element count. Decoding reassembles chunks into a single value, and a
//! chunk shorter than the maximum marks the end of the run.

use bitstream::{BitReader, BitWriter};

use crate::error::{VariantError, VariantResult};
use crate::limits::VariantLimits;
use crate::sixbit;
use crate::value::{StructMap, Variant, VariantKind};
use crate::float;

/// Maximum bytes per string chunk (the length field is 16 bits).
pub const STRING_CHUNK_MAX: usize = (1 << 16) - 1;

/// Key used for continuation chunks inside struct bodies.
const CONTINUATION_KEY: &str = "ctn";

/// Decodes a single value of a known kind.
///
/// Strings decode as a single chunk here; continuation reassembly happens in
/// the struct and array paths where the wire format defines it.
pub fn read_value(
    reader: &mut BitReader<'_>,
    kind: VariantKind,
    limits: &VariantLimits,
) -> VariantResult<Variant> {
    read_value_at(reader, kind, limits, 0)
}

/// Decodes a struct body (terminated by tag 0) into an ordered map.
pub fn read_struct(reader: &mut BitReader<'_>, limits: &VariantLimits) -> VariantResult<StructMap> {
    read_struct_at(reader, limits, 0)
}

#[allow(clippy::cast_possible_truncation)]
fn read_value_at(
    reader: &mut BitReader<'_>,
    kind: VariantKind,
    limits: &VariantLimits,
    depth: usize,
) -> VariantResult<Variant> {
    if depth > limits.max_depth {
        return Err(VariantError::NestingTooDeep {
            max_depth: limits.max_depth,
        });
    }
    match kind {
        VariantKind::Bool => Ok(Variant::Bool(reader.read_bit()?)),
        VariantKind::Int => Ok(Variant::Int(reader.read_signed(32)? as i32)),
        VariantKind::UInt => Ok(Variant::UInt(reader.read_bits(32)? as u32)),
        VariantKind::Float => Ok(Variant::Float(float::read_float(reader, 32, 32)?)),
        VariantKind::String => Ok(Variant::String(read_string_chunk(reader)?)),
        VariantKind::Vec2 => {
            let x = float::read_float(reader, 32, 32)?;
            let y = float::read_float(reader, 32, 32)?;
            Ok(Variant::Vec2(x, y))
        }
        VariantKind::Array => read_array_at(reader, limits, depth),
        VariantKind::Struct => Ok(Variant::Struct(read_struct_at(reader, limits, depth)?)),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn read_array_at(
    reader: &mut BitReader<'_>,
    limits: &VariantLimits,
    depth: usize,
) -> VariantResult<Variant> {
    let tag = reader.read_bits(4)? as u8;
    let kind = match VariantKind::from_raw(tag) {
        Some(kind) => kind,
        None if tag == 0 => return Err(VariantError::UnexpectedNull),
        None => return Err(VariantError::UnknownTag { tag }),
    };
    let len = reader.read_bits(16)? as usize;
    if len > limits.max_array_len {
        return Err(VariantError::ArrayTooLong {
            len,
            max: limits.max_array_len,
        });
    }

    let mut values = Vec::new();
    if kind == VariantKind::String {
        // The declared count includes continuation chunks.
        let mut remaining = len;
        while remaining > 0 {
            let mut bytes = Vec::new();
            while remaining > 0 {
                remaining -= 1;
                let chunk = read_string_chunk(reader)?;
                let last = chunk.len() < STRING_CHUNK_MAX;
                bytes.extend_from_slice(&chunk);
                if last {
                    break;
                }
            }
            values.push(Variant::String(bytes));
        }
    } else {
        values.reserve(len);
        for _ in 0..len {
            values.push(read_value_at(reader, kind, limits, depth + 1)?);
        }
    }
    Ok(Variant::Array(kind, values))
}

#[allow(clippy::cast_possible_truncation)]
fn read_struct_at(
    reader: &mut BitReader<'_>,
    limits: &VariantLimits,
    depth: usize,
) -> VariantResult<StructMap> {
    if depth > limits.max_depth {
        return Err(VariantError::NestingTooDeep {
            max_depth: limits.max_depth,
        });
    }
    let mut map = StructMap::new();
    loop {
        let tag = reader.read_bits(4)? as u8;
        if tag == 0 {
            break;
        }
        let kind = VariantKind::from_raw(tag).ok_or(VariantError::UnknownTag { tag })?;
        let key = sixbit::read_str(reader)?;

        if kind != VariantKind::String {
            let value = read_value_at(reader, kind, limits, depth + 1)?;
            map.insert(key, value);
            continue;
        }

        let mut bytes = Vec::new();
        loop {
            let chunk = read_string_chunk(reader)?;
            let last = chunk.len() < STRING_CHUNK_MAX;
            bytes.extend_from_slice(&chunk);
            if last {
                break;
            }
            // Continuation entries repeat the tag and carry a filler key.
            reader.read_bits(4)?;
            sixbit::read_str(reader)?;
        }
        map.insert(key, Variant::String(bytes));
    }
    Ok(map)
}

#[allow(clippy::cast_possible_truncation)]
fn read_string_chunk(reader: &mut BitReader<'_>) -> VariantResult<Vec<u8>> {
    let len = reader.read_bits(16)? as usize;
    Ok(reader.read_bytes_packed(len)?)
}

/// Encodes a single value without a leading tag.
///
/// Strings emit struct-style continuation markers when they exceed
/// [`STRING_CHUNK_MAX`]; callers encoding array elements use the array path
/// via [`write_struct`]/[`Variant::Array`] handling instead.
pub fn write_value(writer: &mut BitWriter, value: &Variant) -> VariantResult<()> {
    match value {
        Variant::Bool(v) => {
            writer.write_bit(*v);
            Ok(())
        }
        Variant::Int(v) => Ok(writer.write_signed(i64::from(*v), 32)?),
        Variant::UInt(v) => Ok(writer.write_bits(u64::from(*v), 32)?),
        Variant::Float(v) => float::write_float(writer, 32, 32, *v),
        Variant::String(bytes) => write_string_chunks(writer, bytes, true),
        Variant::Vec2(x, y) => {
            float::write_float(writer, 32, 32, *x)?;
            float::write_float(writer, 32, 32, *y)
        }
        Variant::Array(kind, values) => write_array(writer, *kind, values),
        Variant::Struct(map) => write_struct(writer, map),
    }
}

/// Encodes a struct body, terminated by tag 0.
pub fn write_struct(writer: &mut BitWriter, map: &StructMap) -> VariantResult<()> {
    for (key, value) in map.iter() {
        writer.write_bits(u64::from(value.kind().raw()), 4)?;
        sixbit::write_str(writer, key)?;
        write_value(writer, value)?;
    }
    writer.write_bits(0, 4)?;
    Ok(())
}

fn write_array(
    writer: &mut BitWriter,
    kind: VariantKind,
    values: &[Variant],
) -> VariantResult<()> {
    let mut count = values.len();
    for value in values {
        if value.kind() != kind {
            return Err(VariantError::ElementKindMismatch {
                expected: kind.raw(),
                found: value.kind().raw(),
            });
        }
        if let Variant::String(bytes) = value {
            count += bytes.len() / STRING_CHUNK_MAX;
        }
    }
    if count > 0xFFFF {
        return Err(VariantError::ArrayTooLong {
            len: count,
            max: 0xFFFF,
        });
    }

    writer.write_bits(u64::from(kind.raw()), 4)?;
    writer.write_bits(count as u64, 16)?;
    for value in values {
        if let Variant::String(bytes) = value {
            // Array continuations are bare chunks counted as extra elements.
            write_string_chunks(writer, bytes, false)?;
        } else {
            write_value(writer, value)?;
        }
    }
    Ok(())
}

fn write_string_chunks(
    writer: &mut BitWriter,
    bytes: &[u8],
    struct_markers: bool,
) -> VariantResult<()> {
    let chunks = bytes.len() / STRING_CHUNK_MAX + 1;
    for i in 0..chunks {
        if i > 0 && struct_markers {
            writer.write_bits(u64::from(VariantKind::String.raw()), 4)?;
            sixbit::write_str(writer, CONTINUATION_KEY)?;
        }
        let start = i * STRING_CHUNK_MAX;
        let end = ((i + 1) * STRING_CHUNK_MAX).min(bytes.len());
        writer.write_bits((end - start) as u64, 16)?;
        writer.write_bytes_packed(&bytes[start..end])?;
    }
    Ok(())
}
