//! Bit-level writer with backpatch support.

use crate::error::{BitError, BitResult};

/// A bit-level writer for encoding packed binary data.
///
/// Bits are emitted in LSB-first order to match [`BitReader`](crate::BitReader).
/// The writer owns a growable buffer. Writing at the end appends; after a
/// [`seek`](Self::seek) below the high-water mark, writes overwrite in place,
/// which is how length fields get backpatched. Seeks can never move past the
/// high-water mark, so a placeholder must be reserved before it is patched.
#[derive(Debug, Default)]
pub struct BitWriter {
    data: Vec<u8>,
    /// Current write cursor in bits.
    bit_pos: usize,
    /// High-water mark in bits.
    bit_len: usize,
}

impl BitWriter {
    /// Creates a new empty `BitWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `BitWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            bit_pos: 0,
            bit_len: 0,
        }
    }

    /// Returns the current cursor position in bits.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Returns the total number of bits written (the high-water mark).
    #[must_use]
    pub const fn bits_written(&self) -> usize {
        self.bit_len
    }

    /// Returns `true` if the cursor sits on a byte boundary.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_pos % 8 == 0
    }

    /// Seeks the cursor to an absolute bit position for backpatching.
    ///
    /// The target must lie within the already-written range; seeking can
    /// rewrite existing bits but never extend the stream.
    pub fn seek(&mut self, bit_pos: usize) -> BitResult<()> {
        if bit_pos > self.bit_len {
            return Err(BitError::SeekOutOfBounds {
                target: bit_pos,
                end: self.bit_len,
            });
        }
        self.bit_pos = bit_pos;
        Ok(())
    }

    /// Seeks the cursor back to the high-water mark.
    pub fn seek_to_end(&mut self) {
        self.bit_pos = self.bit_len;
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, value: bool) {
        let byte_idx = self.bit_pos / 8;
        if byte_idx == self.data.len() {
            self.data.push(0);
        }
        let mask = 1u8 << (self.bit_pos % 8);
        if value {
            self.data[byte_idx] |= mask;
        } else {
            self.data[byte_idx] &= !mask;
        }
        self.bit_pos += 1;
        if self.bit_pos > self.bit_len {
            self.bit_len = self.bit_pos;
        }
    }

    /// Writes up to 64 bits from an unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 64`.
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`;
    /// overflow is never silently truncated.
    pub fn write_bits(&mut self, value: u64, bits: u32) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits == 0 {
            return Ok(());
        }
        if bits < 64 && value >= (1u64 << bits) {
            return Err(BitError::ValueOutOfRange { value, bits });
        }

        let mut written = 0u32;
        while written < bits {
            let byte_idx = self.bit_pos / 8;
            if byte_idx == self.data.len() {
                self.data.push(0);
            }
            let bit_idx = (self.bit_pos % 8) as u32;
            let take = (8 - bit_idx).min(bits - written);
            let chunk_mask = ((1u16 << take) - 1) as u8;
            #[allow(clippy::cast_possible_truncation)]
            let chunk = ((value >> written) as u8) & chunk_mask;
            self.data[byte_idx] =
                (self.data[byte_idx] & !(chunk_mask << bit_idx)) | (chunk << bit_idx);
            written += take;
            self.bit_pos += take as usize;
        }
        if self.bit_pos > self.bit_len {
            self.bit_len = self.bit_pos;
        }
        Ok(())
    }

    /// Writes up to 64 bits from a signed integer in two's complement.
    #[allow(clippy::cast_sign_loss)]
    pub fn write_signed(&mut self, value: i64, bits: u32) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits == 0 {
            return Ok(());
        }
        if bits < 64 {
            let min = -(1i64 << (bits - 1));
            let max = (1i64 << (bits - 1)) - 1;
            if value < min || value > max {
                return Err(BitError::SignedOutOfRange { value, bits });
            }
        }
        let mask = if bits == 64 {
            u64::MAX
        } else {
            (1u64 << bits) - 1
        };
        self.write_bits((value as u64) & mask, bits)
    }

    /// Writes raw bytes. The cursor must be byte-aligned.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> BitResult<()> {
        if self.bit_pos % 8 != 0 {
            return Err(BitError::MisalignedAccess {
                bit_position: self.bit_pos,
            });
        }
        let byte_idx = self.bit_pos / 8;
        let end = byte_idx + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[byte_idx..end].copy_from_slice(bytes);
        self.bit_pos += bytes.len() * 8;
        if self.bit_pos > self.bit_len {
            self.bit_len = self.bit_pos;
        }
        Ok(())
    }

    /// Writes bytes at any bit alignment.
    ///
    /// Falls back to per-byte bit writes when the cursor is mid-byte.
    pub fn write_bytes_packed(&mut self, bytes: &[u8]) -> BitResult<()> {
        if self.is_aligned() {
            return self.write_bytes(bytes);
        }
        for byte in bytes {
            self.write_bits(u64::from(*byte), 8)?;
        }
        Ok(())
    }

    /// Pads with zero bits to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        while self.bit_pos % 8 != 0 {
            self.write_bit(false);
        }
    }

    /// Writes `bits` zero bits as a placeholder to be backpatched later.
    pub fn reserve_bits(&mut self, bits: usize) {
        let mut left = bits;
        while left > 0 {
            let chunk = left.min(64);
            #[allow(clippy::cast_possible_truncation)]
            let chunk_bits = chunk as u32;
            // Zero always fits, so this cannot fail.
            let _ = self.write_bits(0, chunk_bits);
            left -= chunk;
        }
    }

    /// Finishes writing and returns the byte buffer.
    ///
    /// Any trailing partial byte is already zero-padded on its unused high bits.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        debug_assert_eq!(self.data.len(), (self.bit_len + 7) / 8);
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_writer() {
        let writer = BitWriter::new();
        assert_eq!(writer.bits_written(), 0);
        let bytes = writer.finish();
        assert!(bytes.is_empty());
    }

    #[test]
    fn write_single_bit_true() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        assert_eq!(writer.bits_written(), 1);
        let bytes = writer.finish();
        // LSB-first: bit 0 of the first byte.
        assert_eq!(bytes, vec![0b0000_0001]);
    }

    #[test]
    fn write_full_byte() {
        let mut writer = BitWriter::new();
        for bit in [false, true, false, true, false, true, false, true] {
            writer.write_bit(bit);
        }
        assert_eq!(writer.bits_written(), 8);
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b1010_1010]);
    }

    #[test]
    fn write_bits_little_endian() {
        let mut writer = BitWriter::new();
        writer.write_bits(0x1234, 16).unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0x34, 0x12]);
    }

    #[test]
    fn write_bits_across_byte_boundary() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0xFF, 8).unwrap();
        let bytes = writer.finish();
        // 3 low bits then 8 more: 0b11111_101, 0b0000_0111.
        assert_eq!(bytes, vec![0b1111_1101, 0b0000_0111]);
    }

    #[test]
    fn write_bits_invalid_count() {
        let mut writer = BitWriter::new();
        let result = writer.write_bits(0, 65);
        assert!(matches!(
            result,
            Err(BitError::InvalidBitCount {
                bits: 65,
                max_bits: 64
            })
        ));
    }

    #[test]
    fn write_bits_value_out_of_range() {
        let mut writer = BitWriter::new();
        let result = writer.write_bits(256, 8);
        assert!(matches!(
            result,
            Err(BitError::ValueOutOfRange {
                value: 256,
                bits: 8
            })
        ));
    }

    #[test]
    fn write_signed_range_checks() {
        let mut writer = BitWriter::new();
        writer.write_signed(-128, 8).unwrap();
        writer.write_signed(127, 8).unwrap();
        assert!(matches!(
            writer.write_signed(128, 8),
            Err(BitError::SignedOutOfRange { .. })
        ));
        assert!(matches!(
            writer.write_signed(-129, 8),
            Err(BitError::SignedOutOfRange { .. })
        ));
    }

    #[test]
    fn write_bytes_aligned() {
        let mut writer = BitWriter::new();
        writer.write_bytes(&[0xAA, 0xBB]).unwrap();
        assert_eq!(writer.finish(), vec![0xAA, 0xBB]);
    }

    #[test]
    fn write_bytes_misaligned_fails() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        let err = writer.write_bytes(&[0x00]).unwrap_err();
        assert!(matches!(err, BitError::MisalignedAccess { .. }));
    }

    #[test]
    fn align_pads_with_zeros() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.align_to_byte();
        writer.write_bytes(&[0xFF]).unwrap();
        assert_eq!(writer.finish(), vec![0b0000_0001, 0xFF]);
    }

    #[test]
    fn backpatch_reserved_field() {
        let mut writer = BitWriter::new();
        writer.reserve_bits(32);
        writer.write_bits(0xAB, 8).unwrap();
        let end = writer.bit_position();
        writer.seek(0).unwrap();
        writer.write_bits(0xDEAD_BEEF, 32).unwrap();
        writer.seek(end).unwrap();
        writer.write_bits(0xCD, 8).unwrap();

        let bytes = writer.finish();
        assert_eq!(bytes, vec![0xEF, 0xBE, 0xAD, 0xDE, 0xAB, 0xCD]);
    }

    #[test]
    fn backpatch_does_not_disturb_neighbors() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b111, 3).unwrap();
        let patch_pos = writer.bit_position();
        writer.reserve_bits(5);
        writer.write_bits(0xFF, 8).unwrap();
        writer.seek(patch_pos).unwrap();
        writer.write_bits(0b10101, 5).unwrap();
        writer.seek_to_end();

        let bytes = writer.finish();
        assert_eq!(bytes, vec![0b1010_1111, 0xFF]);
    }

    #[test]
    fn seek_past_high_water_mark_fails() {
        let mut writer = BitWriter::new();
        writer.write_bits(0, 8).unwrap();
        let err = writer.seek(9).unwrap_err();
        assert!(matches!(err, BitError::SeekOutOfBounds { target: 9, end: 8 }));
    }

    #[test]
    fn overwrite_clears_old_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFF, 8).unwrap();
        writer.seek(0).unwrap();
        writer.write_bits(0x00, 8).unwrap();
        assert_eq!(writer.finish(), vec![0x00]);
    }

    #[test]
    fn with_capacity() {
        let writer = BitWriter::with_capacity(100);
        assert_eq!(writer.bits_written(), 0);
    }

    #[test]
    fn write_bits_64_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(u64::MAX, 64).unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0xFF; 8]);
    }
}
