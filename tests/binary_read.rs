use bmff::binary::unpack_language;
use bmff::{BinaryRead, BmffString, BoxReader, ParseError};
use std::io::Cursor;

fn pack_language(s: &str) -> u16 {
    let b = s.as_bytes();
    ((b[0] as u16 & 0x1F) << 10) | ((b[1] as u16 & 0x1F) << 5) | (b[2] as u16 & 0x1F)
}

#[test]
fn eight_bit_reads() {
    let mut cur = Cursor::new(vec![0xFF, 0xFF, 0x7F]);
    assert_eq!(cur.get_int8().unwrap(), -1);
    assert_eq!(cur.get_uint8().unwrap(), 255);
    assert_eq!(cur.get_int8().unwrap(), 127);
}

#[test]
fn sixteen_bit_reads_are_big_endian() {
    let mut cur = Cursor::new(vec![0x01, 0x02, 0xFF, 0xFE, 0xFF, 0xFE]);
    assert_eq!(cur.get_uint16().unwrap(), 0x0102);
    assert_eq!(cur.get_uint16().unwrap(), 65534);
    assert_eq!(cur.get_int16().unwrap(), -2);
}

#[test]
fn uint24_composes_high_byte_and_low_word() {
    let mut cur = Cursor::new(vec![0x01, 0x00, 0x02]);
    assert_eq!(cur.get_uint24().unwrap(), 65538);
    assert_eq!(cur.position(), 3);

    let mut cur = Cursor::new(vec![0xFF, 0xFF, 0xFF]);
    assert_eq!(cur.get_uint24().unwrap(), 0x00FF_FFFF);
}

#[test]
fn thirty_two_bit_reads() {
    let mut cur = Cursor::new(vec![0x80, 0, 0, 1, 0x80, 0, 0, 1]);
    assert_eq!(cur.get_uint32().unwrap(), 2_147_483_649);
    assert_eq!(cur.get_int32().unwrap(), -2_147_483_647);
}

#[test]
fn sixty_four_bit_reads_compose_halves() {
    let mut cur = Cursor::new(vec![0, 0, 0, 1, 0, 0, 0, 2]);
    assert_eq!(cur.get_uint64().unwrap(), 4_294_967_298);

    let mut cur = Cursor::new(vec![0xFF; 16]);
    assert_eq!(cur.get_uint64().unwrap(), u64::MAX);
    assert_eq!(cur.get_int64().unwrap(), -1);

    let mut cur = Cursor::new(vec![0x80, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(cur.get_int64().unwrap(), i64::MIN);

    let mut cur = Cursor::new(vec![0xFF, 0xFF, 0xFF, 0xFE, 0x80, 0, 0, 0]);
    assert_eq!(cur.get_int64().unwrap(), i64::from_be_bytes([0xFF, 0xFF, 0xFF, 0xFE, 0x80, 0, 0, 0]));
}

#[test]
fn signed_and_unsigned_agree_on_bit_patterns() {
    for v in [0u16, 1, 0x7FFF, 0x8000, 0xABCD, u16::MAX] {
        let bytes = v.to_be_bytes().repeat(2);
        let mut cur = Cursor::new(bytes);
        let u = cur.get_uint16().unwrap();
        let i = cur.get_int16().unwrap();
        assert_eq!(u, v);
        assert_eq!(i as u16, u);
    }
    for v in [0u32, 1, 0x7FFF_FFFF, 0x8000_0000, 0xDEAD_BEEF, u32::MAX] {
        let bytes = v.to_be_bytes().repeat(2);
        let mut cur = Cursor::new(bytes);
        let u = cur.get_uint32().unwrap();
        let i = cur.get_int32().unwrap();
        assert_eq!(u, v);
        assert_eq!(i as u32, u);
    }
    for v in [0u64, 1, 0xFFFF_FFFF, 0x1_0000_0000, 0x8000_0000_0000_0000, u64::MAX] {
        let bytes = v.to_be_bytes().repeat(2);
        let mut cur = Cursor::new(bytes);
        let u = cur.get_uint64().unwrap();
        let i = cur.get_int64().unwrap();
        assert_eq!(u, v);
        assert_eq!(i as u64, u);
    }
}

#[test]
fn ascii_bytes_and_uuid() {
    let mut data = b"isom".to_vec();
    data.extend_from_slice(&[1, 2, 3]);
    data.extend(0u8..16);
    let mut cur = Cursor::new(data);

    assert_eq!(cur.get_ascii(4).unwrap(), BmffString::Utf8("isom".into()));
    assert_eq!(cur.get_bytes(3).unwrap(), vec![1, 2, 3]);
    let uuid = cur.get_uuid().unwrap();
    assert_eq!(uuid[0], 0);
    assert_eq!(uuid[15], 15);
}

#[test]
fn ascii_keeps_non_ascii_bytes() {
    let mut cur = Cursor::new(vec![b'a', 0xA9, b'x', b'y']);
    let s = cur.get_ascii(4).unwrap();
    assert_eq!(s, BmffString::Raw(vec![b'a', 0xA9, b'x', b'y']));
    assert_eq!(s.as_bytes(), &[97, 169, 120, 121]);
    assert_eq!(cur.position(), 4);
}

#[test]
fn language_code_unpacks_to_letters() {
    let code = pack_language("eng");
    assert_eq!(code, 0x15C7);

    let mut cur = Cursor::new(code.to_be_bytes().to_vec());
    assert_eq!(cur.get_iso639_2_language().unwrap(), "eng");
    assert_eq!(cur.position(), 2);

    for lang in ["jpn", "und", "fra", "zho"] {
        assert_eq!(unpack_language(pack_language(lang)), lang);
    }
}

#[test]
fn null_terminated_string_consumes_terminator() {
    let mut cur = Cursor::new(b"hello\0world".to_vec());
    let s = cur.get_null_terminated_string(None).unwrap();
    assert_eq!(s, BmffString::Utf8("hello".into()));
    assert_eq!(cur.position(), 6);
    assert_eq!(cur.get_ascii(5).unwrap().as_str(), Some("world"));
}

#[test]
fn null_terminated_string_stops_at_end_of_stream() {
    let mut cur = Cursor::new(b"abc".to_vec());
    let s = cur.get_null_terminated_string(None).unwrap();
    assert_eq!(s.as_str(), Some("abc"));
    assert_eq!(cur.position(), 3);

    let mut empty = Cursor::new(Vec::new());
    assert_eq!(
        empty.get_null_terminated_string(None).unwrap(),
        BmffString::Utf8(String::new())
    );
}

#[test]
fn null_terminated_string_respects_cap() {
    let mut cur = Cursor::new(b"abcdef".to_vec());
    assert_eq!(cur.get_null_terminated_string(Some(3)).unwrap().as_str(), Some("abc"));
    assert_eq!(cur.position(), 3);

    // the terminator counts towards the cap
    let mut cur = Cursor::new(b"ab\0cd".to_vec());
    assert_eq!(cur.get_null_terminated_string(Some(3)).unwrap().as_str(), Some("ab"));
    assert_eq!(cur.position(), 3);
}

#[test]
fn null_terminated_string_falls_back_to_shift_jis() {
    // "日本" in Shift_JIS, not valid UTF-8
    let mut cur = Cursor::new(vec![0x93, 0xFA, 0x96, 0x7B, 0x00]);
    let s = cur.get_null_terminated_string(None).unwrap();
    assert_eq!(s, BmffString::ShiftJis("日本".into()));
    assert_eq!(s.encoding_name(), "Shift_JIS");
    assert_eq!(cur.position(), 5);
}

#[test]
fn null_terminated_string_keeps_undecodable_bytes() {
    let mut cur = Cursor::new(vec![0x41, 0xFF, 0x00]);
    let s = cur.get_null_terminated_string(None).unwrap();
    assert_eq!(s, BmffString::Raw(vec![0x41, 0xFF]));
    assert_eq!(s.as_str(), None);
    assert_eq!(serde_json::to_value(&s).unwrap(), "41ff");
}

#[test]
fn utf8_wins_over_fallbacks() {
    let mut cur = Cursor::new("héllo\0".as_bytes().to_vec());
    let s = cur.get_null_terminated_string(None).unwrap();
    assert_eq!(s, BmffString::Utf8("héllo".into()));
}

#[test]
fn zero_length_reads_are_rejected() {
    let mut cur = Cursor::new(vec![1, 2, 3]);
    assert!(matches!(cur.get_bytes(0), Err(ParseError::InvalidReadLength(0))));
    assert!(matches!(cur.get_ascii(0), Err(ParseError::InvalidReadLength(0))));
    assert!(matches!(
        cur.get_null_terminated_string(Some(0)),
        Err(ParseError::InvalidReadLength(0))
    ));
    // nothing was consumed
    assert_eq!(cur.position(), 0);
}

#[test]
fn short_reads_are_end_of_stream() {
    let mut cur = Cursor::new(vec![1, 2]);
    let err = cur.get_uint32().unwrap_err();
    assert!(err.is_eof());
    assert!(!err.is_malformed());

    let mut cur = Cursor::new(vec![1, 2, 3]);
    assert!(cur.get_bytes(4).unwrap_err().is_eof());

    let mut cur = Cursor::new(Vec::new());
    assert!(cur.get_uint8().unwrap_err().is_eof());
    assert!(cur.get_uuid().unwrap_err().is_eof());
}

#[test]
fn box_reader_tracks_position_and_peeks_without_losing_bytes() {
    let mut src = Cursor::new(vec![0xAB, 0xCD, 0xEF]);
    let mut r = BoxReader::with_offset(&mut src, 100);

    assert_eq!(r.position(), 100);
    assert!(!r.is_eof().unwrap());
    assert_eq!(r.position(), 100);
    assert_eq!(r.get_uint16().unwrap(), 0xABCD);
    assert_eq!(r.position(), 102);
    assert!(!r.is_eof().unwrap());
    assert_eq!(r.get_uint8().unwrap(), 0xEF);
    assert!(r.is_eof().unwrap());
    assert_eq!(r.position(), 103);
}

#[test]
fn box_reader_skip() {
    let mut src = Cursor::new(vec![0u8; 10]);
    let mut r = BoxReader::new(&mut src);
    r.skip(4).unwrap();
    assert_eq!(r.position(), 4);
    assert!(r.skip(10).unwrap_err().is_eof());
}
