//! Big-endian primitive decoding on top of any [`Read`].
//!
//! Every ISO-BMFF field is stored in network byte order, so all multi-byte
//! reads go through `byteorder`'s [`BigEndian`] regardless of the host.

use crate::error::{ParseError, Result};
use byteorder::{BigEndian, ReadBytesExt};
use encoding_rs::SHIFT_JIS;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::{self, Read};

/// Text read by [`BinaryRead::get_null_terminated_string`], tagged with the
/// first encoding under which the bytes were valid.
///
/// Most producers write UTF-8, but some (Apple's media handler among them)
/// emit Shift_JIS names. Bytes valid in neither are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BmffString {
    Utf8(String),
    ShiftJis(String),
    Raw(Vec<u8>),
}

impl BmffString {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(s) => BmffString::Utf8(s),
            Err(e) => {
                let bytes = e.into_bytes();
                match SHIFT_JIS.decode_without_bom_handling_and_without_replacement(&bytes) {
                    Some(s) => BmffString::ShiftJis(s.into_owned()),
                    None => BmffString::Raw(bytes),
                }
            }
        }
    }

    /// Like [`from_bytes`](Self::from_bytes) but without the Shift_JIS step:
    /// anything that is not valid UTF-8 is kept byte for byte.
    pub fn from_ascii_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(s) => BmffString::Utf8(s),
            Err(e) => BmffString::Raw(e.into_bytes()),
        }
    }

    /// The decoded text, or `None` for raw bytes.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            BmffString::Utf8(s) | BmffString::ShiftJis(s) => Some(s),
            BmffString::Raw(_) => None,
        }
    }

    /// Underlying bytes for the UTF-8 and raw forms. Shift_JIS text is
    /// returned as its UTF-8 transcoding.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            BmffString::Utf8(s) | BmffString::ShiftJis(s) => s.as_bytes(),
            BmffString::Raw(b) => b,
        }
    }

    pub fn encoding_name(&self) -> &'static str {
        match self {
            BmffString::Utf8(_) => "UTF-8",
            BmffString::ShiftJis(_) => "Shift_JIS",
            BmffString::Raw(_) => "binary",
        }
    }
}

impl fmt::Display for BmffString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BmffString::Utf8(s) | BmffString::ShiftJis(s) => f.write_str(s),
            BmffString::Raw(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

impl Serialize for BmffString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            BmffString::Utf8(s) | BmffString::ShiftJis(s) => serializer.serialize_str(s),
            BmffString::Raw(b) => serializer.serialize_str(&hex::encode(b)),
        }
    }
}

/// Primitive decoders for box payloads.
///
/// Each call consumes a fixed number of bytes (except
/// [`get_null_terminated_string`](BinaryRead::get_null_terminated_string)) and
/// fails with [`ParseError::UnexpectedEof`] if the stream runs short.
pub trait BinaryRead: Read {
    fn get_int8(&mut self) -> Result<i8> {
        Ok(self.read_i8()?)
    }

    fn get_uint8(&mut self) -> Result<u8> {
        Ok(self.read_u8()?)
    }

    fn get_int16(&mut self) -> Result<i16> {
        Ok(self.read_i16::<BigEndian>()?)
    }

    fn get_uint16(&mut self) -> Result<u16> {
        Ok(self.read_u16::<BigEndian>()?)
    }

    fn get_uint24(&mut self) -> Result<u32> {
        let hi = self.get_uint8()? as u32;
        let lo = self.get_uint16()? as u32;
        Ok((hi << 16) | lo)
    }

    fn get_int32(&mut self) -> Result<i32> {
        Ok(self.read_i32::<BigEndian>()?)
    }

    fn get_uint32(&mut self) -> Result<u32> {
        Ok(self.read_u32::<BigEndian>()?)
    }

    fn get_int64(&mut self) -> Result<i64> {
        Ok(self.get_uint64()? as i64)
    }

    fn get_uint64(&mut self) -> Result<u64> {
        let hi = self.get_uint32()? as u64;
        let lo = self.get_uint32()? as u64;
        Ok((hi << 32) | lo)
    }

    /// `n` bytes, decoded as text when they form valid UTF-8 and kept raw otherwise.
    fn get_ascii(&mut self, n: usize) -> Result<BmffString> {
        let buf = self.get_bytes(n)?;
        Ok(BmffString::from_ascii_bytes(buf))
    }

    fn get_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        if n == 0 {
            return Err(ParseError::InvalidReadLength(n));
        }
        let mut buf = vec![0u8; n];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn get_uuid(&mut self) -> Result<[u8; 16]> {
        let mut u = [0u8; 16];
        self.read_exact(&mut u)?;
        Ok(u)
    }

    /// Read up to and including a zero byte, at most `max` bytes, or until the
    /// stream ends. The terminator is consumed but not returned, and it counts
    /// towards `max`. Running out of input is not an error here.
    fn get_null_terminated_string(&mut self, max: Option<usize>) -> Result<BmffString> {
        if max == Some(0) {
            return Err(ParseError::InvalidReadLength(0));
        }
        let mut buf = Vec::new();
        let mut consumed = 0usize;
        let mut b = [0u8; 1];
        loop {
            match self.read(&mut b) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
            consumed += 1;
            if b[0] == 0 {
                break;
            }
            buf.push(b[0]);
            if max.is_some_and(|m| consumed >= m) {
                break;
            }
        }
        Ok(BmffString::from_bytes(buf))
    }

    /// ISO 639-2/T code packed as three 5-bit letters offset from 0x60.
    fn get_iso639_2_language(&mut self) -> Result<String> {
        let code = self.get_uint16()?;
        Ok(unpack_language(code))
    }
}

impl<R: Read + ?Sized> BinaryRead for R {}

pub fn unpack_language(code: u16) -> String {
    let c1 = ((code >> 10) & 0x1F) as u8 | 0x60;
    let c2 = ((code >> 5) & 0x1F) as u8 | 0x60;
    let c3 = (code & 0x1F) as u8 | 0x60;
    [c1 as char, c2 as char, c3 as char].iter().collect()
}
