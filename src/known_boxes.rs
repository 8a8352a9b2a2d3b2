use crate::binary::{BinaryRead, BmffString};
use crate::boxes::{BoxHeader, BoxValue, EditListEntry, FourCC, NodeKind};
use crate::error::{ParseError, RegistryError, Result};
use crate::parser::{ParseContext, parse_children};
use crate::reader::BoxReader;
use crate::registry::{BoxType, Registry};

/// Container types: their payload is nothing but child boxes.
const CONTAINERS: &[(&[u8; 4], &str)] = &[
    (b"moov", "Movie Box"),
    (b"trak", "Track Box"),
    (b"mdia", "Media Box"),
    (b"minf", "Media Information Box"),
    (b"stbl", "Sample Table Box"),
    (b"edts", "Edit Box"),
    (b"dinf", "Data Information Box"),
    (b"udta", "User Data Box"),
    (b"mvex", "Movie Extends Box"),
    (b"moof", "Movie Fragment Box"),
    (b"traf", "Track Fragment Box"),
    (b"mfra", "Movie Fragment Random Access Box"),
    (b"sinf", "Protection Scheme Information Box"),
    (b"schi", "Scheme Information Box"),
    (b"tref", "Track Reference Box"),
    (b"iprp", "Item Properties Box"),
    (b"ipco", "Item Property Container Box"),
    (b"meco", "Additional Metadata Container Box"),
];

/// Leaves whose payload is skipped without interpretation.
const OPAQUE_LEAVES: &[(&[u8; 4], &str)] = &[
    (b"free", "Free Space Box"),
    (b"skip", "Free Space Box"),
    (b"mdat", "Media Data Box"),
];

pub struct ContainerBox {
    name: &'static str,
}

impl ContainerBox {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl BoxType for ContainerBox {
    fn full_name(&self) -> &str {
        self.name
    }

    fn is_container(&self) -> bool {
        true
    }

    fn parse_payload(
        &self,
        r: &mut BoxReader<'_>,
        hdr: &BoxHeader,
        ctx: &mut ParseContext<'_>,
    ) -> Result<NodeKind> {
        let children = parse_children(r, hdr, ctx)?;
        Ok(NodeKind::Container { children })
    }
}

pub struct OpaqueBox {
    name: &'static str,
}

impl OpaqueBox {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl BoxType for OpaqueBox {
    fn full_name(&self) -> &str {
        self.name
    }

    fn parse_payload(
        &self,
        _r: &mut BoxReader<'_>,
        hdr: &BoxHeader,
        _ctx: &mut ParseContext<'_>,
    ) -> Result<NodeKind> {
        Ok(leaf(hdr, None))
    }
}

// ---------- Helpers ----------

fn leaf(hdr: &BoxHeader, value: Option<BoxValue>) -> NodeKind {
    NodeKind::Leaf {
        data_offset: hdr.payload_offset(),
        data_len: hdr.payload_len(),
        value,
    }
}

/// Payload bytes left between the cursor and the end of `hdr`.
fn remaining(r: &BoxReader<'_>, hdr: &BoxHeader) -> u64 {
    hdr.end().saturating_sub(r.position())
}

/// version (8 bits) + flags (24 bits) prefix of a FullBox.
fn read_version_flags(r: &mut BoxReader<'_>) -> Result<(u8, u32)> {
    let version = r.get_uint8()?;
    let flags = r.get_uint24()?;
    Ok((version, flags))
}

fn read_fourcc(r: &mut BoxReader<'_>) -> Result<FourCC> {
    let mut b = [0u8; 4];
    std::io::Read::read_exact(r, &mut b)?;
    Ok(FourCC(b))
}

// ---------- Decoders ----------

// ftyp: major + minor + compatible brands
pub struct FtypBox;

impl BoxType for FtypBox {
    fn full_name(&self) -> &str {
        "File Type Box"
    }

    fn parse_payload(
        &self,
        r: &mut BoxReader<'_>,
        hdr: &BoxHeader,
        _ctx: &mut ParseContext<'_>,
    ) -> Result<NodeKind> {
        if hdr.payload_len() < 8 {
            return Ok(leaf(hdr, None));
        }
        let major_brand = read_fourcc(r)?;
        let minor_version = r.get_uint32()?;
        let mut compatible_brands = Vec::new();
        while remaining(r, hdr) >= 4 {
            compatible_brands.push(read_fourcc(r)?);
        }
        Ok(leaf(
            hdr,
            Some(BoxValue::FileType {
                major_brand,
                minor_version,
                compatible_brands,
            }),
        ))
    }
}

// mdhd: timescale, duration, language
pub struct MdhdBox;

impl BoxType for MdhdBox {
    fn full_name(&self) -> &str {
        "Media Header Box"
    }

    fn parse_payload(
        &self,
        r: &mut BoxReader<'_>,
        hdr: &BoxHeader,
        _ctx: &mut ParseContext<'_>,
    ) -> Result<NodeKind> {
        let (version, flags) = read_version_flags(r)?;
        let (creation_time, modification_time, timescale, duration) = if version == 1 {
            let c = r.get_uint64()?;
            let m = r.get_uint64()?;
            let ts = r.get_uint32()?;
            let d = r.get_uint64()?;
            (c, m, ts, d)
        } else {
            let c = r.get_uint32()? as u64;
            let m = r.get_uint32()? as u64;
            let ts = r.get_uint32()?;
            let d = r.get_uint32()? as u64;
            (c, m, ts, d)
        };
        let language = r.get_iso639_2_language()?;
        // pre_defined (16 bits) is left for the parser to skip

        Ok(leaf(
            hdr,
            Some(BoxValue::MediaHeader {
                version,
                flags,
                creation_time,
                modification_time,
                timescale,
                duration,
                language,
            }),
        ))
    }
}

// hdlr: handler type + name
pub struct HdlrBox;

impl BoxType for HdlrBox {
    fn full_name(&self) -> &str {
        "Handler Reference Box"
    }

    fn parse_payload(
        &self,
        r: &mut BoxReader<'_>,
        hdr: &BoxHeader,
        _ctx: &mut ParseContext<'_>,
    ) -> Result<NodeKind> {
        let (version, flags) = read_version_flags(r)?;
        let _pre_defined = r.get_uint32()?;
        let handler_type = read_fourcc(r)?;
        let _reserved = r.get_bytes(12)?;

        let name = match remaining(r, hdr) {
            0 => BmffString::Utf8(String::new()),
            n => r.get_null_terminated_string(Some(n as usize))?,
        };

        Ok(leaf(
            hdr,
            Some(BoxValue::Handler {
                version,
                flags,
                handler_type,
                name,
            }),
        ))
    }
}

// elst: edit list
pub struct ElstBox;

impl BoxType for ElstBox {
    fn full_name(&self) -> &str {
        "Edit List Box"
    }

    fn parse_payload(
        &self,
        r: &mut BoxReader<'_>,
        hdr: &BoxHeader,
        _ctx: &mut ParseContext<'_>,
    ) -> Result<NodeKind> {
        let (version, flags) = read_version_flags(r)?;
        let entry_count = r.get_uint32()? as u64;

        let entry_size: u64 = if version == 1 { 20 } else { 12 };
        let needed = entry_count * entry_size;
        if needed > remaining(r, hdr) {
            return Err(ParseError::SizeMismatch {
                typ: hdr.typ,
                offset: hdr.start,
                declared: hdr.size,
                actual: r.position() - hdr.start + needed,
            });
        }

        let mut entries = Vec::new();
        for _ in 0..entry_count {
            let (segment_duration, media_time) = if version == 1 {
                (r.get_uint64()?, r.get_int64()?)
            } else {
                (r.get_uint32()? as u64, r.get_int32()? as i64)
            };
            entries.push(EditListEntry {
                segment_duration,
                media_time,
                media_rate_integer: r.get_int16()?,
                media_rate_fraction: r.get_int16()?,
            });
        }

        Ok(leaf(
            hdr,
            Some(BoxValue::EditList {
                version,
                flags,
                entries,
            }),
        ))
    }
}

// ---------- Default registry ----------
pub fn default_registry() -> std::result::Result<Registry, RegistryError> {
    let mut reg = Registry::new();
    for &(code, name) in CONTAINERS {
        reg.register(code, Box::new(ContainerBox::new(name)))?;
    }
    for &(code, name) in OPAQUE_LEAVES {
        reg.register(code, Box::new(OpaqueBox::new(name)))?;
    }
    reg.with_box(b"ftyp", Box::new(FtypBox))?
        .with_box(b"mdhd", Box::new(MdhdBox))?
        .with_box(b"hdlr", Box::new(HdlrBox))?
        .with_box(b"elst", Box::new(ElstBox))
}
