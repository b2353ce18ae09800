pub mod boxes;
pub mod decoders;
pub mod error;
pub mod format;
pub mod iter;
pub mod json_api;
pub mod known_boxes;
mod layout;
pub mod node;
pub mod parser;
pub mod registry;
pub mod samples;
pub mod scanner;
pub mod source;
pub mod table;
pub mod util;
pub mod value;
pub mod window;

pub use boxes::{BoxFlags, BoxHeader, FourCC};
pub use decoders::{DecodeContext, DecoderRegistry, TypeDecoder};
pub use error::{ParseError, Result};
pub use format::Format;
pub use iter::{Phase, Selection, Siblings};
pub use json_api::{analyze_file, hex_range};
pub use known_boxes::KnownBox;
pub use node::BoxRef;
pub use parser::read_box_header;
pub use registry::{BoxRegistry, default_registry};
pub use scanner::{Scanner, ScannerBuilder};
pub use source::{ByteSource, SeekableSource, SequentialSource};
pub use table::Table;
pub use value::BoxValue;
pub use window::ByteWindow;
