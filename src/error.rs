use crate::boxes::FourCC;
use std::io;

/// Errors produced while decoding primitives or building the box tree.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("io: {0}")]
    Io(io::Error),

    /// A read asked for more bytes than the stream had left.
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// A read of zero bytes was requested. This is a caller bug, not bad input.
    #[error("invalid read length {0}")]
    InvalidReadLength(usize),

    #[error("invalid box size {size} for '{typ}' at {offset:#x}")]
    InvalidSize { typ: FourCC, offset: u64, size: u64 },

    /// size == 0 (to end of file) and size == 1 (64-bit largesize) are rejected.
    #[error("unsupported box size {size} for '{typ}' at {offset:#x}")]
    UnsupportedSize { typ: FourCC, offset: u64, size: u32 },

    #[error("box '{typ}' at {offset:#x}: declared {declared} bytes, consumed {actual}")]
    SizeMismatch {
        typ: FourCC,
        offset: u64,
        declared: u64,
        actual: u64,
    },

    #[error("child '{child}' at {offset:#x} overruns parent '{parent}' ending at {parent_end:#x}")]
    ChildOverrun {
        parent: FourCC,
        child: FourCC,
        offset: u64,
        parent_end: u64,
    },

    #[error("box '{typ}' at {offset:#x} nested {depth} levels deep")]
    TooDeep { typ: FourCC, offset: u64, depth: usize },

    /// A registered type's payload hook disagreed with its own container flag.
    #[error("box '{typ}' at {offset:#x}: payload does not match registered container flag {registered_container}")]
    ContainerMismatch { typ: FourCC, offset: u64, registered_container: bool },
}

impl ParseError {
    pub fn is_eof(&self) -> bool {
        matches!(self, ParseError::UnexpectedEof)
    }

    /// True for structural problems in the input (as opposed to I/O or caller errors).
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ParseError::InvalidSize { .. }
                | ParseError::UnsupportedSize { .. }
                | ParseError::SizeMismatch { .. }
                | ParseError::ChildOverrun { .. }
                | ParseError::TooDeep { .. }
        )
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ParseError::UnexpectedEof
        } else {
            ParseError::Io(e)
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors raised while populating a [`Registry`](crate::registry::Registry).
///
/// These indicate programming mistakes in box registration, never bad input data.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("box type code must be exactly 4 bytes, got {0:?}")]
    InvalidCode(Vec<u8>),
    #[error("box type '{0}' is already registered")]
    Duplicate(FourCC),
}
