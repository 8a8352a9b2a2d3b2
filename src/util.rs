use std::fmt::Write as _;
use std::io::{Read, Seek, SeekFrom};

/// Read `len` bytes at absolute `offset`.
pub fn read_slice<R: Read + Seek>(r: &mut R, offset: u64, len: u64) -> std::io::Result<Vec<u8>> {
    r.seek(SeekFrom::Start(offset))?;
    let mut v = Vec::new();
    r.take(len).read_to_end(&mut v)?;
    Ok(v)
}

/// Classic 16-bytes-per-row dump: offset, hex bytes, printable ASCII.
pub fn hex_dump(bytes: &[u8], start_offset: u64) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let offs = start_offset + (i as u64) * 16;
        let hexs = hex::encode(chunk);
        let spaced: Vec<&str> = (0..chunk.len()).map(|j| &hexs[j * 2..j * 2 + 2]).collect();
        let ascii: String = chunk
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect();
        let _ = writeln!(out, "{:08x}  {:<47}  |{}|", offs, spaced.join(" "), ascii);
    }
    out
}
