use bitstream::{BitError, BitReader, BitWriter};

#[test]
fn writer_reader_roundtrip_bits() {
    let mut writer = BitWriter::new();
    writer.write_bits(0b1010, 4).unwrap();
    writer.write_bits(0xAB, 8).unwrap();
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
    assert_eq!(reader.read_bits(8).unwrap(), 0xAB);
}

#[test]
fn roundtrip_mixed_with_alignment() {
    let mut writer = BitWriter::new();
    writer.write_bit(true);
    writer.write_bits(0b1010, 4).unwrap();
    writer.align_to_byte();
    writer.write_bytes(&[0xEF, 0xBE]).unwrap();
    writer.write_signed(-300, 16).unwrap();
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    assert!(reader.read_bit().unwrap());
    assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
    reader.align_to_byte().unwrap();
    assert_eq!(reader.read_bytes(2).unwrap(), &[0xEF, 0xBE]);
    assert_eq!(reader.read_signed(16).unwrap(), -300);
}

#[test]
fn backpatched_length_field_roundtrip() {
    // Same shape as a segment header: reserve a 32-bit size, write a body,
    // then come back and patch the real size.
    let mut writer = BitWriter::new();
    let patch_pos = writer.bit_position();
    writer.reserve_bits(32);
    writer.write_bits(0x1234, 16).unwrap();
    writer.write_bits(0x56, 8).unwrap();
    let end = writer.bit_position();

    writer.seek(patch_pos).unwrap();
    writer.write_bits(((end - patch_pos) / 8) as u64, 32).unwrap();
    writer.seek_to_end();
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    assert_eq!(reader.read_bits(32).unwrap(), 7);
    assert_eq!(reader.read_bits(16).unwrap(), 0x1234);
    assert_eq!(reader.read_bits(8).unwrap(), 0x56);
}

#[test]
fn truncated_prefix_never_panics() {
    let mut writer = BitWriter::new();
    writer.write_bits(0xDEAD_BEEF, 32).unwrap();
    writer.write_bits(0xCAFE, 16).unwrap();
    let bytes = writer.finish();

    for len in 0..bytes.len() {
        let mut reader = BitReader::new(&bytes[..len]);
        let first = reader.read_bits(32);
        if len < 4 {
            assert!(matches!(first, Err(BitError::UnexpectedEof { .. })));
            continue;
        }
        first.unwrap();
        assert!(matches!(
            reader.read_bits(16),
            Err(BitError::UnexpectedEof { .. })
        ));
    }
}

#[test]
fn reader_seek_supports_directory_style_access() {
    let mut writer = BitWriter::new();
    writer.write_bits(24, 32).unwrap(); // offset of payload in bits
    writer.write_bits(0, 16).unwrap(); // skipped field
    writer.write_bits(0x77, 8).unwrap(); // payload
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    let offset = reader.read_bits(32).unwrap() as usize;
    reader.seek(offset + 24).unwrap();
    assert_eq!(reader.read_bits(8).unwrap(), 0x77);
}
