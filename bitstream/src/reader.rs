//! Bit-level reader with bounded operations.

use crate::error::{BitError, BitResult};

/// A bit-level reader for decoding packed binary data.
///
/// Bits are consumed in LSB-first order: the first bit of the stream is the
/// least significant bit of the first byte, and an n-bit field is assembled
/// with stream bit `i` becoming value bit `i`. This matches the level file
/// format and is consistent across the whole project.
///
/// All read operations are bounds-checked and return errors on failure.
/// The reader never panics on malformed input.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Returns the number of bits remaining to read.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.data
            .len()
            .saturating_mul(8)
            .saturating_sub(self.bit_pos)
    }

    /// Returns `true` if there are no more bits to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Returns the current bit position.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Returns `true` if the cursor sits on a byte boundary.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_pos % 8 == 0
    }

    /// Seeks to an absolute bit position.
    pub fn seek(&mut self, bit_pos: usize) -> BitResult<()> {
        let end = self.data.len() * 8;
        if bit_pos > end {
            return Err(BitError::SeekOutOfBounds {
                target: bit_pos,
                end,
            });
        }
        self.bit_pos = bit_pos;
        Ok(())
    }

    /// Skips `bits` bits forward.
    pub fn skip(&mut self, bits: usize) -> BitResult<()> {
        self.ensure_bits(bits)?;
        self.bit_pos += bits;
        Ok(())
    }

    /// Reads a single bit as a boolean.
    pub fn read_bit(&mut self) -> BitResult<bool> {
        if self.bits_remaining() == 0 {
            return Err(BitError::UnexpectedEof {
                requested: 1,
                available: 0,
            });
        }
        let byte_idx = self.bit_pos / 8;
        let bit_idx = self.bit_pos % 8;
        let bit = (self.data[byte_idx] >> bit_idx) & 1;
        self.bit_pos += 1;
        Ok(bit == 1)
    }

    /// Reads up to 64 bits as an unsigned integer.
    pub fn read_bits(&mut self, bits: u32) -> BitResult<u64> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits == 0 {
            return Ok(0);
        }
        self.ensure_bits(bits as usize)?;

        let mut value = 0u64;
        let mut got = 0u32;
        while got < bits {
            let byte = self.data[self.bit_pos / 8];
            let bit_idx = (self.bit_pos % 8) as u32;
            let take = (8 - bit_idx).min(bits - got);
            let chunk = u64::from(byte >> bit_idx) & ((1u64 << take) - 1);
            value |= chunk << got;
            got += take;
            self.bit_pos += take as usize;
        }
        Ok(value)
    }

    /// Reads up to 64 bits as a sign-extended two's-complement integer.
    #[allow(clippy::cast_possible_wrap)]
    pub fn read_signed(&mut self, bits: u32) -> BitResult<i64> {
        let raw = self.read_bits(bits)?;
        if bits == 0 || bits == 64 {
            return Ok(raw as i64);
        }
        let sign = 1u64 << (bits - 1);
        if raw & sign != 0 {
            Ok((raw | !(sign | (sign - 1))) as i64)
        } else {
            Ok(raw as i64)
        }
    }

    /// Aligns to the next byte boundary.
    pub fn align_to_byte(&mut self) -> BitResult<()> {
        let rem = self.bit_pos % 8;
        if rem == 0 {
            return Ok(());
        }
        let skip = 8 - rem;
        self.ensure_bits(skip)?;
        self.bit_pos += skip;
        Ok(())
    }

    /// Reads `n` raw bytes. The cursor must be byte-aligned.
    pub fn read_bytes(&mut self, n: usize) -> BitResult<&'a [u8]> {
        self.ensure_aligned()?;
        self.ensure_bits(n * 8)?;
        let idx = self.bit_pos / 8;
        let out = &self.data[idx..idx + n];
        self.bit_pos += n * 8;
        Ok(out)
    }

    /// Reads a byte-aligned `u8`.
    pub fn read_u8_aligned(&mut self) -> BitResult<u8> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    /// Reads `n` bytes at any bit alignment.
    ///
    /// Falls back to per-byte bit reads when the cursor is mid-byte; aligned
    /// reads borrow the underlying buffer via [`read_bytes`](Self::read_bytes)
    /// when a copy is not needed.
    #[allow(clippy::cast_possible_truncation)]
    pub fn read_bytes_packed(&mut self, n: usize) -> BitResult<Vec<u8>> {
        if self.is_aligned() {
            return Ok(self.read_bytes(n)?.to_vec());
        }
        self.ensure_bits(n * 8)?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.read_bits(8)? as u8);
        }
        Ok(out)
    }

    fn ensure_aligned(&self) -> BitResult<()> {
        if self.bit_pos % 8 != 0 {
            return Err(BitError::MisalignedAccess {
                bit_position: self.bit_pos,
            });
        }
        Ok(())
    }

    fn ensure_bits(&self, bits: usize) -> BitResult<()> {
        let available = self.bits_remaining();
        if bits > available {
            return Err(BitError::UnexpectedEof {
                requested: bits,
                available,
            });
        }
        Ok(())
    }
}
