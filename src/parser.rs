use crate::binary::BinaryRead;
use crate::boxes::{BmffBox, BoxHeader, FourCC, HEADER_SIZE, NodeKind};
use crate::error::{ParseError, Result};
use crate::reader::BoxReader;
use crate::registry::Registry;
use std::io::Read;

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Deepest nesting level accepted; top-level boxes are at depth 0.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// State shared by one parse call chain: the registry, options, and the
/// headers of the boxes currently being parsed above the cursor.
pub struct ParseContext<'r> {
    registry: &'r Registry,
    opts: ParseOptions,
    ancestors: Vec<BoxHeader>,
}

impl<'r> ParseContext<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_options(registry, ParseOptions::default())
    }

    pub fn with_options(registry: &'r Registry, opts: ParseOptions) -> Self {
        Self {
            registry,
            opts,
            ancestors: Vec::new(),
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn options(&self) -> ParseOptions {
        self.opts
    }

    /// Nesting level of the box whose payload is being parsed.
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Header of the enclosing container, `None` at top level.
    pub fn parent(&self) -> Option<&BoxHeader> {
        self.ancestors.last()
    }

    /// Outermost first.
    pub fn ancestors(&self) -> &[BoxHeader] {
        &self.ancestors
    }
}

pub fn read_box_header(r: &mut BoxReader<'_>) -> Result<BoxHeader> {
    let start = r.position();
    let size32 = r.get_uint32()?;
    let mut typ = [0u8; 4];
    r.read_exact(&mut typ)?;
    let typ = FourCC(typ);

    match size32 {
        0 | 1 => Err(ParseError::UnsupportedSize { typ, offset: start, size: size32 }),
        s if (s as u64) < HEADER_SIZE => Err(ParseError::InvalidSize { typ, offset: start, size: s as u64 }),
        s => Ok(BoxHeader { size: s as u64, typ, header_size: HEADER_SIZE, start }),
    }
}

/// Parse one box, including its whole subtree, starting at the cursor.
pub fn parse_box(r: &mut BoxReader<'_>, ctx: &mut ParseContext<'_>) -> Result<BmffBox> {
    let hdr = read_box_header(r)?;

    if let Some(parent) = ctx.parent() {
        if hdr.end() > parent.end() {
            return Err(ParseError::ChildOverrun {
                parent: parent.typ,
                child: hdr.typ,
                offset: hdr.start,
                parent_end: parent.end(),
            });
        }
    }
    if ctx.depth() > ctx.opts.max_depth {
        return Err(ParseError::TooDeep { typ: hdr.typ, offset: hdr.start, depth: ctx.depth() });
    }

    let registry = ctx.registry;
    let ty = registry.resolve(&hdr.typ);
    let kind = ty.parse_payload(r, &hdr, ctx)?;
    let built_container = matches!(kind, NodeKind::Container { .. });
    if built_container != ty.is_container() {
        return Err(ParseError::ContainerMismatch {
            typ: hdr.typ,
            offset: hdr.start,
            registered_container: ty.is_container(),
        });
    }

    // Leaf hooks may stop early; containers must account for every byte themselves.
    let consumed = r.position() - hdr.start;
    if consumed < hdr.size && !built_container {
        r.skip(hdr.size - consumed)?;
    }

    let actual_size = r.position() - hdr.start;
    if actual_size != hdr.size {
        return Err(ParseError::SizeMismatch {
            typ: hdr.typ,
            offset: hdr.start,
            declared: hdr.size,
            actual: actual_size,
        });
    }

    Ok(BmffBox { hdr, actual_size, kind })
}

/// Parse the child boxes of `hdr`, stopping at its declared end or at end of stream.
pub fn parse_children(
    r: &mut BoxReader<'_>,
    hdr: &BoxHeader,
    ctx: &mut ParseContext<'_>,
) -> Result<Vec<BmffBox>> {
    ctx.ancestors.push(hdr.clone());
    let kids = read_children(r, hdr.end(), ctx);
    ctx.ancestors.pop();
    kids
}

fn read_children(r: &mut BoxReader<'_>, end: u64, ctx: &mut ParseContext<'_>) -> Result<Vec<BmffBox>> {
    let mut kids = Vec::new();
    while r.position() < end && !r.is_eof()? {
        kids.push(parse_box(r, ctx)?);
    }
    Ok(kids)
}

/// Parse top-level boxes until the stream ends.
pub fn parse_boxes(r: &mut BoxReader<'_>, ctx: &mut ParseContext<'_>) -> Result<Vec<BmffBox>> {
    let mut boxes = Vec::new();
    while !r.is_eof()? {
        boxes.push(parse_box(r, ctx)?);
    }
    Ok(boxes)
}

/// Parse a whole stream with default options.
pub fn parse(reader: &mut dyn Read, registry: &Registry) -> Result<Vec<BmffBox>> {
    let mut r = BoxReader::new(reader);
    let mut ctx = ParseContext::new(registry);
    parse_boxes(&mut r, &mut ctx)
}
