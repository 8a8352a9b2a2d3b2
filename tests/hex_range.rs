use bmff::api::hex_range;
use bmff::util::hex_dump;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(bytes).unwrap();
    path
}

#[test]
fn hex_range_reads_within_bounds() {
    let data = (0u8..64u8).collect::<Vec<_>>();
    let path = temp_file("bmff_hex_range_within.bin", &data);

    let dump = hex_range(&path, 16, 16).expect("hex_range failed");

    assert_eq!(dump.offset, 16);
    assert_eq!(dump.length, 16);
    assert!(dump.hex.starts_with("00000010  10 11 12"));
}

#[test]
fn hex_range_clamps_to_eof() {
    let data = (0u8..32u8).collect::<Vec<_>>();
    let path = temp_file("bmff_hex_range_clamp.bin", &data);

    let dump = hex_range(&path, 24, 32).expect("hex_range failed");
    assert_eq!(dump.offset, 24);
    assert_eq!(dump.length, 8);

    let past = hex_range(&path, 100, 8).expect("hex_range failed");
    assert_eq!(past.length, 0);
    assert!(past.hex.is_empty());
}

#[test]
fn hex_dump_shows_printable_ascii() {
    let out = hex_dump(b"moov\x00\x01", 0);
    assert!(out.starts_with("00000000  6d 6f 6f 76 00 01"));
    assert!(out.trim_end().ends_with("|moov..|"));
}
