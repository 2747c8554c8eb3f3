//! Fixed-point float codec.
//!
//! Floats are stored as a sign bit, an integer part, and a fractional part.
//! The integer part gets `ibits - 1` bits and the fraction `fbits` bits with
//! an implied divisor of `2^(fbits - 1)`. The sign applies to the integer
//! part only; the fraction is always added, so `-1.5` encodes as integer 2
//! (the absolute floor), sign set, fraction one half.

use bitstream::{BitReader, BitWriter};

use crate::error::{VariantError, VariantResult};

/// Reads a fixed-point float with `ibits` integer bits and `fbits` fraction bits.
#[allow(clippy::cast_precision_loss)]
pub fn read_float(reader: &mut BitReader<'_>, ibits: u32, fbits: u32) -> VariantResult<f64> {
    let sign = if reader.read_bit()? { -1.0 } else { 1.0 };
    let ipart = reader.read_bits(ibits - 1)? as f64;
    let fpart = reader.read_bits(fbits)? as f64;
    let divisor = (1u64 << (fbits - 1)) as f64;
    Ok(sign * ipart + fpart / divisor)
}

/// Writes a fixed-point float with `ibits` integer bits and `fbits` fraction bits.
///
/// # Errors
///
/// Returns [`VariantError::FloatOutOfRange`] for non-finite values or values
/// whose integer part does not fit the field.
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn write_float(
    writer: &mut BitWriter,
    ibits: u32,
    fbits: u32,
    value: f64,
) -> VariantResult<()> {
    if !value.is_finite() {
        return Err(VariantError::FloatOutOfRange { value });
    }
    let floor = value.floor();
    let ipart = floor.abs();
    let limit = (1u64 << (ibits - 1)) as f64;
    if ipart >= limit {
        return Err(VariantError::FloatOutOfRange { value });
    }
    let scale = (1u64 << (fbits - 1)) as f64;
    let fpart = ((value - floor) * scale) as u64;

    writer.write_bit(value < 0.0);
    writer.write_bits(ipart as u64, ibits - 1)?;
    writer.write_bits(fpart, fbits)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(ibits: u32, fbits: u32, value: f64) -> f64 {
        let mut writer = BitWriter::new();
        write_float(&mut writer, ibits, fbits, value).unwrap();
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        read_float(&mut reader, ibits, fbits).unwrap()
    }

    #[test]
    fn roundtrip_simple_values() {
        for value in [0.0, 1.0, 1.5, 42.25, 1000.125] {
            assert_eq!(roundtrip(32, 32, value), value);
        }
    }

    #[test]
    fn roundtrip_negative_values() {
        for value in [-1.0, -1.5, -0.25, -1000.125] {
            assert_eq!(roundtrip(32, 32, value), value);
        }
    }

    #[test]
    fn roundtrip_narrow_fraction() {
        // Entity positions use 32.8: fraction resolution is 1/128.
        assert_eq!(roundtrip(32, 8, 48.5), 48.5);
        assert_eq!(roundtrip(32, 8, -96.0), -96.0);
    }

    #[test]
    fn bit_cost_matches_field_widths() {
        let mut writer = BitWriter::new();
        write_float(&mut writer, 32, 8, 1.0).unwrap();
        assert_eq!(writer.bits_written(), 1 + 31 + 8);
    }

    #[test]
    fn non_finite_rejected() {
        let mut writer = BitWriter::new();
        assert!(matches!(
            write_float(&mut writer, 32, 32, f64::NAN),
            Err(VariantError::FloatOutOfRange { .. })
        ));
        assert!(matches!(
            write_float(&mut writer, 32, 32, f64::INFINITY),
            Err(VariantError::FloatOutOfRange { .. })
        ));
    }

    #[test]
    fn oversized_integer_part_rejected() {
        let mut writer = BitWriter::new();
        let err = write_float(&mut writer, 8, 8, 1000.0).unwrap_err();
        assert!(matches!(err, VariantError::FloatOutOfRange { .. }));
    }
}
