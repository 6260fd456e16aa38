use crate::*;
use pretty_hex::PrettyHex;

#[test]
fn endianness_of_u32() {
    let mut w = Encoder::with_size(4);
    w.write_u32(0x12345678).unwrap();
    assert_eq!(w.get_ref(), [0x78, 0x56, 0x34, 0x12]);

    let mut w = Encoder::wrap_with_endian(vec![0u8; 4], Endian::Big);
    w.write_u32(0x12345678).unwrap();
    assert_eq!(w.get_ref(), [0x12, 0x34, 0x56, 0x78]);
}

#[test]
fn fixed_size_write_past_end() {
    let mut w = Encoder::with_size(3);
    w.write_u16(0xaa55).unwrap();
    assert_eq!(
        w.write_u16(0x1234),
        Err(Error::OutOfBounds {
            offset: 2,
            requested: 2,
            available: 1
        })
    );
    // Nothing was written, and the buffer did not grow.
    assert_eq!(w.get_ref(), [0x55, 0xaa, 0]);
    assert_eq!(w.offset(), 2);
}

#[test]
fn negative_offset_write_fails() {
    let mut w = Encoder::with_size(4).starting_at(-2);
    assert_eq!(w.write_u32(1).unwrap_err().kind(), ErrorKind::Bounds);
    assert_eq!(w.get_ref(), [0, 0, 0, 0]);
}

#[test]
fn offset_advancement() {
    let mut w = Encoder::with_size(64);
    let mut expected = 0;
    let mut check = |w: &Encoder, width: isize| {
        expected += width;
        assert_eq!(w.offset(), expected);
    };

    w.write_u8(1).unwrap();
    check(&w, 1);
    w.write_i8(-1).unwrap();
    check(&w, 1);
    w.write_u16(1).unwrap();
    check(&w, 2);
    w.write_i16(-1).unwrap();
    check(&w, 2);
    w.write_u32(1).unwrap();
    check(&w, 4);
    w.write_i32(-1).unwrap();
    check(&w, 4);
    w.write_u64(1).unwrap();
    check(&w, 8);
    w.write_i64(-1).unwrap();
    check(&w, 8);
    w.write_f32(1.0).unwrap();
    check(&w, 4);
    w.write_f64(1.0).unwrap();
    check(&w, 8);
    w.write_bool(true).unwrap();
    check(&w, 1);
    w.write_u8_masked(&[4, 4], &[1, 2]).unwrap();
    check(&w, 1);
    w.write_u16_masked(&[8, 8], &[1, 2]).unwrap();
    check(&w, 2);
    w.write_u32_masked(&[16, 16], &[1, 2]).unwrap();
    check(&w, 4);
    w.write_u64_masked(&[32, 32], &[1, 2]).unwrap();
    check(&w, 8);
}

#[test]
fn masked_writes() {
    let mut w = Encoder::with_size(3);
    w.write_u8_masked(&[1, 7], &[1, 100]).unwrap();
    w.set_endian(Endian::Big);
    w.write_u16_masked(&[4, 4, 8], &[0xa, 0x5, 0x3c]).unwrap();
    assert_eq!(w.get_ref(), [228, 0xa5, 0x3c]);
}

#[test]
fn masked_write_validates_first() {
    let mut w = Encoder::with_size(2);
    assert_eq!(
        w.write_u8_masked(&[3, 4], &[0, 0]),
        Err(Error::Mask(MaskError::WidthMismatch {
            expected: 8,
            actual: 7
        }))
    );
    assert_eq!(
        w.write_u8_masked(&[1, 7], &[2, 0]).unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert_eq!(w.offset(), 0);
    assert_eq!(w.get_ref(), [0, 0]);
}

#[test]
fn strings() {
    let mut w = Encoder::with_size(16);
    w.write_str("Hi").unwrap();
    w.write_string("AQID", Encoding::Base64).unwrap();
    w.write_string("beef", Encoding::Hex).unwrap();
    w.write_terminated_string("é", Encoding::Latin1).unwrap();
    w.write_terminated_str("ok").unwrap();
    assert_eq!(w.offset(), 12);
    assert_eq!(
        &w.get_ref()[..12],
        [b'H', b'i', 1, 2, 3, 0xbe, 0xef, 0xe9, 0, b'o', b'k', 0]
    );
}

#[test]
fn unencodable_strings() {
    let mut w = Encoder::with_size(16);
    assert_eq!(
        w.write_string("not base64!", Encoding::Base64),
        Err(Error::Unencodable {
            encoding: Encoding::Base64
        })
    );
    assert_eq!(
        w.write_string("€", Encoding::Latin1).unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert_eq!(w.offset(), 0);
}

#[test]
fn terminated_string_needs_room_for_terminator() {
    let mut w = Encoder::with_size(2);
    assert_eq!(
        w.write_terminated_str("ab").unwrap_err().kind(),
        ErrorKind::Bounds
    );
    assert_eq!(w.get_ref(), b"ab");
}

#[test]
fn fixed_storage_kinds() {
    let mut bytes = [0u8; 4];
    let mut w = Encoder::wrap(&mut bytes[..]);
    w.write_u16(0x0201).unwrap();
    assert_eq!(w.with_dynamic_size(16, |_| Ok(())), Err(Error::FixedStorage));
    drop(w);
    assert_eq!(bytes, [1, 2, 0, 0]);

    let mut w = Encoder::wrap([0u8; 2]);
    w.write_u16(0x0201).unwrap();
    assert!(w.write_u8(3).is_err());
    assert_eq!(w.into_inner(), [1, 2]);
}

#[test]
fn mixed() {
    let mut w = Encoder::with_size(32);
    w.write_u8(42).unwrap();
    w.write_u16(0x0102).unwrap();
    w.write_terminated_str("Hello, world!").unwrap();
    w.write_i32(-33).unwrap();
    w.write_f64(core::f64::consts::PI).unwrap();

    println!("{}", w.get_ref().hex_dump());

    let mut r = Decoder::new(w.get_ref());
    assert_eq!(r.read_u8(), Ok(42));
    assert_eq!(r.read_u16(), Ok(0x0102));
    assert_eq!(r.read_terminated_str(), Ok("Hello, world!"));
    assert_eq!(r.read_i32(), Ok(-33));
    assert_eq!(r.read_f64(), Ok(core::f64::consts::PI));
}

#[test]
fn interleaved_decoder() {
    let mut w = Encoder::with_size(8);
    w.write_u32(7).unwrap();
    w.write_u32(9).unwrap();
    w.seek(4);

    let mut r = w.decoder();
    assert_eq!(r.offset(), 4);
    assert_eq!(r.read_u32(), Ok(9));

    w.set_endian(Endian::Big);
    w.seek(0);
    assert_eq!(w.decoder().read_u32(), Ok(7 << 24));
}

#[test]
fn with_offset_backpatches_length() {
    let mut w = Encoder::with_size(8);
    w.skip(2);
    w.write_str("abc").unwrap();
    let len = w.offset() - 2;
    w.with_offset(0, |w| w.write_u16(len as u16)).unwrap();
    assert_eq!(w.offset(), 5);
    assert_eq!(&w.get_ref()[..5], [3, 0, b'a', b'b', b'c']);
}
