use crate::{
    boxes::{BmffBox, BoxValue, NodeKind},
    known_boxes::default_registry,
    parser::{ParseContext, ParseOptions, parse_boxes},
    reader::BoxReader,
    registry::Registry,
    util::{hex_dump, read_slice},
};
use serde::Serialize;
use std::{fs::File, io::BufReader, path::Path};

/// A JSON-serializable view of a parsed box, enriched with the registry's
/// human-readable type name.
///
/// This is what `bmffdump --json` prints.
#[derive(Serialize)]
pub struct JsonBox {
    /// Absolute byte offset of the box header
    pub offset: u64,
    /// Size declared in the header
    pub size: u64,
    /// Bytes consumed while parsing, header included
    pub actual_size: u64,
    pub header_size: u64,
    /// Payload geometry (None for containers)
    pub payload_offset: Option<u64>,
    pub payload_size: Option<u64>,

    /// Four-character box type code (e.g. "ftyp", "moov")
    pub typ: String,
    /// "container", "leaf" or "unknown"
    pub kind: String,
    /// e.g. "File Type Box"
    pub full_name: String,
    pub value: Option<BoxValue>,
    pub children: Option<Vec<JsonBox>>,
}

/// Open, parse and close a file with the default registry.
///
/// # Example
/// ```no_run
/// use bmff::api::parse_file;
/// use bmff::ParseOptions;
///
/// let boxes = parse_file("video.mp4", ParseOptions::default())?;
/// for b in &boxes {
///     println!("{} {}", b.typ(), b.actual_size());
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn parse_file(path: impl AsRef<Path>, opts: ParseOptions) -> anyhow::Result<Vec<BmffBox>> {
    let reg = default_registry()?;
    parse_file_with(path, &reg, opts)
}

pub fn parse_file_with(
    path: impl AsRef<Path>,
    reg: &Registry,
    opts: ParseOptions,
) -> anyhow::Result<Vec<BmffBox>> {
    let mut f = BufReader::new(File::open(path)?);
    let mut r = BoxReader::new(&mut f);
    let mut ctx = ParseContext::with_options(reg, opts);
    Ok(parse_boxes(&mut r, &mut ctx)?)
}

pub fn to_json_boxes(boxes: &[BmffBox], reg: &Registry) -> Vec<JsonBox> {
    boxes.iter().map(|b| to_json_box(b, reg)).collect()
}

pub fn to_json_box(b: &BmffBox, reg: &Registry) -> JsonBox {
    let hdr = &b.hdr;
    let full_name = reg.resolve(&hdr.typ).full_name().to_string();

    let (kind, payload, value, children) = match &b.kind {
        NodeKind::Container { children } => (
            "container",
            None,
            None,
            Some(to_json_boxes(children, reg)),
        ),
        NodeKind::Leaf {
            data_offset,
            data_len,
            value,
        } => ("leaf", Some((*data_offset, *data_len)), value.clone(), None),
        NodeKind::Unknown {
            data_offset,
            data_len,
        } => ("unknown", Some((*data_offset, *data_len)), None, None),
    };

    JsonBox {
        offset: hdr.start,
        size: hdr.size,
        actual_size: b.actual_size,
        header_size: hdr.header_size,
        payload_offset: payload.map(|(o, _)| o),
        payload_size: payload.map(|(_, l)| l),
        typ: hdr.typ.to_string(),
        kind: kind.to_string(),
        full_name,
        value,
        children,
    }
}

/// Result of a hex dump operation containing the formatted hex output.
#[derive(Serialize)]
pub struct HexDump {
    /// Starting offset of the dumped data
    pub offset: u64,
    /// Actual number of bytes that were read and dumped
    pub length: u64,
    pub hex: String,
}

/// Hex-dump up to `max_len` bytes of a file starting at `offset`.
///
/// Never reads past EOF; the returned length may be smaller than `max_len`.
pub fn hex_range(path: impl AsRef<Path>, offset: u64, max_len: u64) -> anyhow::Result<HexDump> {
    let mut f = File::open(path)?;
    let size = f.metadata()?.len();

    let to_read = size.saturating_sub(offset).min(max_len);
    if to_read == 0 {
        return Ok(HexDump {
            offset,
            length: 0,
            hex: String::new(),
        });
    }

    let data = read_slice(&mut f, offset, to_read)?;
    Ok(HexDump {
        offset,
        length: data.len() as u64,
        hex: hex_dump(&data, offset),
    })
}
