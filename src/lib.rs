pub mod api;
pub mod binary;
pub mod boxes;
pub mod error;
pub mod known_boxes;
pub mod parser;
pub mod reader;
pub mod registry;
pub mod util;

pub use binary::{BinaryRead, BmffString};
pub use boxes::{BmffBox, BoxHeader, BoxValue, FourCC, NodeKind, find_path};
pub use error::{ParseError, RegistryError, Result};
pub use known_boxes::default_registry;
pub use parser::{ParseContext, ParseOptions, parse, parse_box, parse_boxes, parse_children, read_box_header};
pub use reader::BoxReader;
pub use registry::{BoxType, Registry};
