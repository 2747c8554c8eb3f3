//! The 6-bit string codec.
//!
//! Short identifiers (struct keys, entity type names) are stored as a 6-bit
//! length followed by one 6-bit code per character. The alphabet covers
//! `0-9`, `A-Z`, `_`, `a-z` and `{`; any character outside it encodes as `{`,
//! matching the game's own lossy behavior.

use bitstream::{BitReader, BitWriter};

use crate::error::{VariantError, VariantResult};

/// Maximum length of a 6-bit string.
pub const MAX_LEN: usize = 63;

/// Encodes one character to its 6-bit code.
#[must_use]
const fn encode_char(ch: u8) -> u8 {
    match ch {
        b'0'..=b'9' => ch - b'0',
        b'A'..=b'Z' => ch - b'A' + 10,
        b'_' => 36,
        b'a'..=b'z' => ch - b'a' + 37,
        _ => 63,
    }
}

/// Decodes one 6-bit code to its character.
#[must_use]
const fn decode_char(code: u8) -> u8 {
    match code {
        0..=9 => b'0' + code,
        10..=35 => b'A' + code - 10,
        36 => b'_',
        37..=62 => b'a' + code - 37,
        _ => b'{',
    }
}

/// Reads a 6-bit string from the stream.
#[allow(clippy::cast_possible_truncation)]
pub fn read_str(reader: &mut BitReader<'_>) -> VariantResult<String> {
    let len = reader.read_bits(6)? as usize;
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        let code = reader.read_bits(6)? as u8;
        out.push(decode_char(code) as char);
    }
    Ok(out)
}

/// Writes a 6-bit string to the stream.
///
/// # Errors
///
/// Returns [`VariantError::KeyTooLong`] if `text` exceeds 63 characters.
pub fn write_str(writer: &mut BitWriter, text: &str) -> VariantResult<()> {
    let bytes = text.as_bytes();
    if bytes.len() > MAX_LEN {
        return Err(VariantError::KeyTooLong { len: bytes.len() });
    }
    writer.write_bits(bytes.len() as u64, 6)?;
    for &ch in bytes {
        writer.write_bits(u64::from(encode_char(ch)), 6)?;
    }
    Ok(())
}
