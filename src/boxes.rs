use crate::binary::BmffString;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// `None` unless `b` is exactly four bytes long.
    pub fn new(b: &[u8]) -> Option<Self> {
        <[u8; 4]>::try_from(b).ok().map(FourCC)
    }
    pub fn as_str_lossy(&self) -> String {
        self.0.iter().map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}
impl fmt::Debug for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }
impl fmt::Display for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }

impl Serialize for FourCC {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str_lossy())
    }
}

pub const HEADER_SIZE: u64 = 8;

#[derive(Debug, Clone, Serialize)]
pub struct BoxHeader {
    pub size: u64,          // declared total size including header
    pub typ: FourCC,
    pub header_size: u64,   // always 8: largesize and uuid headers are rejected
    pub start: u64,         // stream offset of header start
}

impl BoxHeader {
    pub fn end(&self) -> u64 {
        self.start + self.size
    }
    pub fn payload_offset(&self) -> u64 {
        self.start + self.header_size
    }
    pub fn payload_len(&self) -> u64 {
        self.size.saturating_sub(self.header_size)
    }
}

/// Decoded payload of a leaf box.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoxValue {
    FileType {
        major_brand: FourCC,
        minor_version: u32,
        compatible_brands: Vec<FourCC>,
    },
    MediaHeader {
        version: u8,
        flags: u32,
        creation_time: u64,
        modification_time: u64,
        timescale: u32,
        duration: u64,
        language: String,
    },
    Handler {
        version: u8,
        flags: u32,
        handler_type: FourCC,
        name: BmffString,
    },
    EditList {
        version: u8,
        flags: u32,
        entries: Vec<EditListEntry>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditListEntry {
    pub segment_duration: u64,
    pub media_time: i64,
    pub media_rate_integer: i16,
    pub media_rate_fraction: i16,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Container { children: Vec<BmffBox> },
    Leaf { data_offset: u64, data_len: u64, value: Option<BoxValue> },
    Unknown { data_offset: u64, data_len: u64 },
}

/// A parsed box and everything nested beneath it.
///
/// Ownership runs top-down only: a box owns its children and keeps no link to
/// its parent. Fields are final once the parser returns the box.
#[derive(Debug, Clone, Serialize)]
pub struct BmffBox {
    pub hdr: BoxHeader,
    /// Bytes actually consumed for this box, header and descendants included.
    pub actual_size: u64,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl BmffBox {
    pub fn typ(&self) -> FourCC {
        self.hdr.typ
    }

    pub fn declared_size(&self) -> u64 {
        self.hdr.size
    }

    pub fn actual_size(&self) -> u64 {
        self.actual_size
    }

    pub fn start_offset(&self) -> u64 {
        self.hdr.start
    }

    /// Whether the box's registered type is a container, even if it has no children.
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container { .. })
    }

    pub fn children(&self) -> &[BmffBox] {
        match &self.kind {
            NodeKind::Container { children } => children,
            _ => &[],
        }
    }

    pub fn value(&self) -> Option<&BoxValue> {
        match &self.kind {
            NodeKind::Leaf { value, .. } => value.as_ref(),
            _ => None,
        }
    }

    /// Follow a dotted path of type codes below this box, e.g. `"mdia.minf"`.
    /// Each step picks the first child with a matching type.
    pub fn find(&self, path: &str) -> Option<&BmffBox> {
        path.split('.')
            .filter(|s| !s.is_empty())
            .try_fold(self, |b, seg| {
                b.children().iter().find(|c| c.hdr.typ.as_str_lossy() == seg)
            })
    }

    /// Depth-first, pre-order walk yielding `(depth, box)` starting at `self` with depth 0.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![(0, self)] }
    }
}

pub struct Walk<'a> {
    stack: Vec<(usize, &'a BmffBox)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a BmffBox);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, b) = self.stack.pop()?;
        self.stack
            .extend(b.children().iter().rev().map(|c| (depth + 1, c)));
        Some((depth, b))
    }
}

/// Find the first top-level box along a dotted path, e.g. `"moov.trak.mdia"`.
pub fn find_path<'a>(boxes: &'a [BmffBox], path: &str) -> Option<&'a BmffBox> {
    let (first, rest) = match path.split_once('.') {
        Some((f, r)) => (f, r),
        None => (path, ""),
    };
    boxes
        .iter()
        .find(|b| b.hdr.typ.as_str_lossy() == first)
        .and_then(|b| b.find(rest))
}
