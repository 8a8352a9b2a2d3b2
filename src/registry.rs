use crate::boxes::{BoxHeader, FourCC, NodeKind};
use crate::error::{RegistryError, Result};
use crate::parser::ParseContext;
use crate::reader::BoxReader;
use std::collections::HashMap;

/// Interpreter for one box type.
///
/// `parse_payload` is called with the reader positioned right after the 8-byte
/// header. A leaf type may read any prefix of the payload; the parser skips
/// whatever it leaves behind. Container types call
/// [`parse_children`](crate::parser::parse_children) to build their subtree.
pub trait BoxType: Send + Sync {
    /// Human-readable name, e.g. "Media Box".
    fn full_name(&self) -> &str;

    fn is_container(&self) -> bool {
        false
    }

    fn parse_payload(
        &self,
        r: &mut BoxReader<'_>,
        hdr: &BoxHeader,
        ctx: &mut ParseContext<'_>,
    ) -> Result<NodeKind>;
}

/// Fallback for type codes nobody registered. The payload is kept opaque so
/// size accounting of siblings and ancestors still works.
pub struct UnknownBox;

impl BoxType for UnknownBox {
    fn full_name(&self) -> &str {
        "Unknown Box"
    }

    fn parse_payload(
        &self,
        _r: &mut BoxReader<'_>,
        hdr: &BoxHeader,
        _ctx: &mut ParseContext<'_>,
    ) -> Result<NodeKind> {
        Ok(NodeKind::Unknown {
            data_offset: hdr.payload_offset(),
            data_len: hdr.payload_len(),
        })
    }
}

static UNKNOWN: UnknownBox = UnknownBox;

/// Box types keyed by four-character code.
///
/// Built once, before parsing, and only read afterwards. Registering the same
/// code twice is refused rather than overriding the first entry.
pub struct Registry {
    map: HashMap<FourCC, Box<dyn BoxType>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        code: impl AsRef<[u8]>,
        ty: Box<dyn BoxType>,
    ) -> std::result::Result<(), RegistryError> {
        let code = code.as_ref();
        let cc = FourCC::new(code).ok_or_else(|| RegistryError::InvalidCode(code.to_vec()))?;
        if self.map.contains_key(&cc) {
            return Err(RegistryError::Duplicate(cc));
        }
        self.map.insert(cc, ty);
        Ok(())
    }

    /// Return this registry with `ty` added under `code`.
    pub fn with_box(
        mut self,
        code: impl AsRef<[u8]>,
        ty: Box<dyn BoxType>,
    ) -> std::result::Result<Self, RegistryError> {
        self.register(code, ty)?;
        Ok(self)
    }

    /// The registered type for `typ`, or [`UnknownBox`] if there is none.
    pub fn resolve(&self, typ: &FourCC) -> &dyn BoxType {
        match self.map.get(typ) {
            Some(ty) => &**ty,
            None => &UNKNOWN,
        }
    }

    pub fn contains(&self, typ: &FourCC) -> bool {
        self.map.contains_key(typ)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Registered codes in sorted order.
    pub fn codes(&self) -> Vec<FourCC> {
        let mut v: Vec<FourCC> = self.map.keys().copied().collect();
        v.sort();
        v
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
